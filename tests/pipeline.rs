//! End-to-end pipeline tests: crawl → reconcile → append/save → pages,
//! run against a real temp directory tree and a real ledger file.

use diagram_ledger::config::CatalogConfig;
use diagram_ledger::crawl::crawl;
use diagram_ledger::ledger::Ledger;
use diagram_ledger::pages::{PageOptions, build_pages};
use diagram_ledger::reconcile::reconcile;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADERS: &str = "fullPath\tTitle\trelatedProducts\textension\tfileSize\tcreatedDate\n";

struct Fixture {
    _tmp: TempDir,
    root: PathBuf,
    ledger_path: PathBuf,
}

fn setup() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("for-web");
    let ledger_path = tmp.path().join("data").join("assets.tsv");

    write_file(&root.join("RHEL").join("diagram_1.svg"), 500);
    write_file(&root.join("RHEL").join("notes.html"), 40);
    write_file(&root.join("_listing-page-assets").join("styles.css"), 10);
    fs::create_dir_all(ledger_path.parent().unwrap()).unwrap();
    fs::write(&ledger_path, HEADERS).unwrap();

    Fixture {
        _tmp: tmp,
        root,
        ledger_path,
    }
}

fn write_file(path: &Path, size: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![b'x'; size]).unwrap();
}

fn opts() -> PageOptions {
    PageOptions {
        page_title: "Documentation Diagram Library".to_string(),
        asset_prefix: "for-web".to_string(),
    }
}

fn run_build(fixture: &Fixture) -> Ledger {
    let config = CatalogConfig::default();
    let crawl = crawl(&fixture.root, &config).unwrap();
    let mut ledger = Ledger::load(&fixture.ledger_path).unwrap();
    let reconciled = reconcile(&crawl.records, &ledger, &|_| None);
    if !reconciled.rows.is_empty() {
        ledger.append(reconciled.rows);
        ledger.save(&fixture.ledger_path).unwrap();
    }
    build_pages(&ledger, &fixture.root, &opts()).unwrap();
    ledger
}

#[test]
fn single_asset_end_to_end() {
    let fixture = setup();
    let ledger = run_build(&fixture);

    // Exactly one row: the svg. The html file and the reserved assets
    // folder never reach the ledger.
    assert_eq!(ledger.rows.len(), 1);
    let row = &ledger.rows[0];
    assert_eq!(row[0], "for-web/RHEL/diagram_1.svg");
    assert_eq!(row[1], "diagram 1");
    assert_eq!(row[2], "RHEL");
    assert_eq!(row[3], "svg");
    assert_eq!(row[4], "500");
    assert_eq!(row[5], "");

    // Product page with one table row, previewing the svg.
    let product_page = fs::read_to_string(fixture.root.join("RHEL.html")).unwrap();
    assert_eq!(product_page.matches("preview-image js-lazy-load").count(), 1);
    assert!(product_page.contains("data-src=\"RHEL/diagram_1.svg\""));

    // Index links the product page.
    let index = fs::read_to_string(fixture.root.join("index.html")).unwrap();
    assert!(index.contains("href=\"RHEL.html\""));
}

#[test]
fn second_run_appends_nothing() {
    let fixture = setup();
    run_build(&fixture);
    let before = fs::read_to_string(&fixture.ledger_path).unwrap();

    let ledger = run_build(&fixture);

    assert_eq!(ledger.rows.len(), 1);
    let after = fs::read_to_string(&fixture.ledger_path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn full_paths_stay_unique_across_runs() {
    let fixture = setup();
    run_build(&fixture);
    write_file(&fixture.root.join("RHEL").join("diagram_2.svg"), 600);
    let ledger = run_build(&fixture);

    let mut paths: Vec<&str> = ledger.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(paths.len(), 2);
    paths.sort_unstable();
    paths.dedup();
    assert_eq!(paths.len(), 2);
}

#[test]
fn curated_cells_survive_rebuilds() {
    let fixture = setup();
    run_build(&fixture);

    // A curator hand-edits the relatedProducts cell.
    let content = fs::read_to_string(&fixture.ledger_path).unwrap();
    let edited = content.replace("\tRHEL\t", "\tRHEL, OpenShift\t");
    assert_ne!(content, edited);
    fs::write(&fixture.ledger_path, edited).unwrap();

    let ledger = run_build(&fixture);

    assert_eq!(ledger.rows.len(), 1);
    assert_eq!(ledger.rows[0][2], "RHEL, OpenShift");
    let page = fs::read_to_string(fixture.root.join("RHEL.html")).unwrap();
    assert!(page.contains("RHEL, OpenShift"));
}

#[test]
fn reordered_ledger_columns_still_reconcile() {
    let fixture = setup();

    // Swap extension and fileSize relative to the stock header order, and
    // add a curator column at the end.
    fs::write(
        &fixture.ledger_path,
        "fullPath\tTitle\trelatedProducts\tfileSize\textension\tcreatedDate\tnotes\n",
    )
    .unwrap();

    let ledger = run_build(&fixture);

    let row = &ledger.rows[0];
    assert_eq!(row[3], "500");
    assert_eq!(row[4], "svg");
    assert_eq!(row[6], "");

    // The reloaded file keeps the curator's header order.
    let reloaded = Ledger::load(&fixture.ledger_path).unwrap();
    assert_eq!(reloaded.headers.last().map(String::as_str), Some("notes"));
}

#[test]
fn missing_ledger_aborts_before_any_write() {
    let fixture = setup();
    fs::remove_file(&fixture.ledger_path).unwrap();

    assert!(Ledger::load(&fixture.ledger_path).is_err());
    // Nothing was generated either.
    assert!(!fixture.root.join("index.html").exists());
}

#[test]
fn new_product_gets_its_own_page_and_index_link() {
    let fixture = setup();
    run_build(&fixture);

    write_file(&fixture.root.join("Ansible").join("automation-mesh.svg"), 200);
    let ledger = run_build(&fixture);

    assert_eq!(ledger.rows.len(), 2);
    let ansible = fs::read_to_string(fixture.root.join("Ansible.html")).unwrap();
    assert!(ansible.contains("data-src=\"Ansible/automation-mesh.svg\""));
    // Switcher on the Ansible page links RHEL and marks itself active.
    assert!(ansible.contains("href=\"RHEL.html\""));
    assert!(ansible.contains("product-link product-link--active\">Ansible"));

    let index = fs::read_to_string(fixture.root.join("index.html")).unwrap();
    assert!(index.contains("href=\"Ansible.html\""));
    assert!(index.contains("href=\"RHEL.html\""));
}
