//! Compiled-directory crawling and metadata extraction.
//!
//! Stage 1 of the catalogue pipeline. Walks the compiled asset directory
//! (`for-web/` by default) and produces two views of its contents:
//!
//! - a per-folder file listing, covering every regular file seen, and
//! - one [`FileRecord`] per catalogue-worthy file, carrying the metadata
//!   that reconciliation later maps onto ledger columns.
//!
//! ## Path convention
//!
//! Every recorded path is `<root dir name>/<relative path>` with `/`
//! separators — `for-web/RHEL/diagram_1.svg` — regardless of where the root
//! actually lives on disk. The second path segment is by convention the
//! product name, and the page builder re-derives it from ledger paths with
//! the same rule, so the two stages can never disagree.
//!
//! ## Exclusions
//!
//! The reserved page-assets directory is pruned from the walk entirely.
//! Files whose extension is in the configured skip set (scripts, styles,
//! markup) are registered in the folder listing but produce no record, so
//! they never reach the ledger. A folder containing only skipped files is
//! still listed.
//!
//! Stat failures are fatal: a file vanishing between listing and stat would
//! leave the metadata set incomplete, so the error propagates and aborts
//! the run.

use crate::config::CatalogConfig;
use crate::title;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("compiled directory not found: {0}")]
    MissingRoot(PathBuf),
}

/// Metadata for one catalogue-worthy file, consumed by reconciliation and
/// then discarded. Only reconciled ledger rows are ever persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// `<root dir name>/<relative path>`, `/`-separated. Unique key.
    pub full_path: String,
    /// Second path segment, by folder naming convention.
    pub product_name: String,
    /// Text after the final `.` of the file name, case preserved.
    pub extension: String,
    pub file_name: String,
    pub file_size: u64,
    /// Display title derived by [`title::normalize`].
    pub title: String,
}

/// Result of a crawl pass.
#[derive(Debug, Serialize)]
pub struct Crawl {
    /// Folder path → file names, covering skipped-extension files too.
    pub files_by_folder: BTreeMap<String, Vec<String>>,
    /// Records in discovery order (walk is sorted by file name, so the
    /// order is stable between runs).
    pub records: Vec<FileRecord>,
}

/// Walk `root` and collect folder listings plus per-file metadata.
pub fn crawl(root: &Path, config: &CatalogConfig) -> Result<Crawl, CrawlError> {
    if !root.is_dir() {
        return Err(CrawlError::MissingRoot(root.to_path_buf()));
    }

    let root_label = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().into_owned());
    let skip_extensions = config.skip_extensions_lower();
    let reserved = config.reserved_dir.as_str();

    let mut files_by_folder: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut records = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name().to_string_lossy() != reserved);

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let rel = entry.path().strip_prefix(root).unwrap();
        let full_path = labeled_path(&root_label, rel);
        let folder = match full_path.rsplit_once('/') {
            Some((folder, _)) => folder.to_string(),
            None => root_label.clone(),
        };

        // Folders register on any file, skipped or not. A folder holding
        // only stylesheets still shows up in the listing.
        files_by_folder.entry(folder).or_default().push(file_name.clone());

        let extension = extension_of(&file_name);
        if skip_extensions.contains(&extension.to_lowercase()) {
            continue;
        }

        let file_size = entry.metadata()?.len();
        let product_name = full_path.split('/').nth(1).unwrap_or_default().to_string();
        let title = title::normalize(&file_name);

        records.push(FileRecord {
            full_path,
            product_name,
            extension,
            file_name,
            file_size,
            title,
        });
    }

    Ok(Crawl {
        files_by_folder,
        records,
    })
}

/// Join the root label and a relative path with `/` separators.
fn labeled_path(root_label: &str, rel: &Path) -> String {
    let mut path = root_label.to_string();
    for component in rel.components() {
        path.push('/');
        path.push_str(&component.as_os_str().to_string_lossy());
    }
    path
}

/// Text after the last `.`; the whole name when there is no dot.
fn extension_of(file_name: &str) -> String {
    file_name.rsplit('.').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_asset;
    use tempfile::TempDir;

    fn compiled_root(tmp: &TempDir) -> PathBuf {
        let root = tmp.path().join("for-web");
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn records_carry_derived_metadata() {
        let tmp = TempDir::new().unwrap();
        let root = compiled_root(&tmp);
        write_asset(&root, "RHEL/01_Network_Diagram-2023.svg", 500);

        let crawl = crawl(&root, &CatalogConfig::default()).unwrap();

        assert_eq!(crawl.records.len(), 1);
        let record = &crawl.records[0];
        assert_eq!(record.full_path, "for-web/RHEL/01_Network_Diagram-2023.svg");
        assert_eq!(record.product_name, "RHEL");
        assert_eq!(record.extension, "svg");
        assert_eq!(record.file_name, "01_Network_Diagram-2023.svg");
        assert_eq!(record.file_size, 500);
        assert_eq!(record.title, "Network Diagram");
    }

    #[test]
    fn skipped_extensions_excluded_from_records() {
        let tmp = TempDir::new().unwrap();
        let root = compiled_root(&tmp);
        write_asset(&root, "RHEL/diagram.svg", 10);
        write_asset(&root, "RHEL/notes.html", 10);
        write_asset(&root, "RHEL/style.CSS", 10);

        let crawl = crawl(&root, &CatalogConfig::default()).unwrap();

        let paths: Vec<&str> = crawl.records.iter().map(|r| r.full_path.as_str()).collect();
        assert_eq!(paths, vec!["for-web/RHEL/diagram.svg"]);
    }

    #[test]
    fn skipped_files_still_register_their_folder() {
        let tmp = TempDir::new().unwrap();
        let root = compiled_root(&tmp);
        write_asset(&root, "Docs/readme.html", 10);

        let crawl = crawl(&root, &CatalogConfig::default()).unwrap();

        assert!(crawl.records.is_empty());
        assert_eq!(
            crawl.files_by_folder.get("for-web/Docs"),
            Some(&vec!["readme.html".to_string()])
        );
    }

    #[test]
    fn reserved_dir_fully_excluded() {
        let tmp = TempDir::new().unwrap();
        let root = compiled_root(&tmp);
        write_asset(&root, "RHEL/diagram.svg", 10);
        write_asset(&root, "_listing-page-assets/styles.css", 10);
        write_asset(&root, "_listing-page-assets/logo.svg", 10);

        let crawl = crawl(&root, &CatalogConfig::default()).unwrap();

        assert_eq!(crawl.records.len(), 1);
        assert!(
            crawl
                .files_by_folder
                .keys()
                .all(|f| !f.contains("_listing-page-assets"))
        );
    }

    #[test]
    fn extension_case_preserved_for_display() {
        let tmp = TempDir::new().unwrap();
        let root = compiled_root(&tmp);
        write_asset(&root, "RHEL/diagram.SVG", 10);

        let crawl = crawl(&root, &CatalogConfig::default()).unwrap();
        assert_eq!(crawl.records[0].extension, "SVG");
    }

    #[test]
    fn discovery_order_is_sorted_and_stable() {
        let tmp = TempDir::new().unwrap();
        let root = compiled_root(&tmp);
        write_asset(&root, "RHEL/b.svg", 10);
        write_asset(&root, "RHEL/a.svg", 10);
        write_asset(&root, "Ansible/z.svg", 10);

        let crawl = crawl(&root, &CatalogConfig::default()).unwrap();
        let paths: Vec<&str> = crawl.records.iter().map(|r| r.full_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "for-web/Ansible/z.svg",
                "for-web/RHEL/a.svg",
                "for-web/RHEL/b.svg",
            ]
        );
    }

    #[test]
    fn root_level_file_uses_its_own_name_as_product() {
        // Matches the path-segment convention: segment 1 of
        // "for-web/loose.svg" is the file name itself.
        let tmp = TempDir::new().unwrap();
        let root = compiled_root(&tmp);
        write_asset(&root, "loose.svg", 10);

        let crawl = crawl(&root, &CatalogConfig::default()).unwrap();
        assert_eq!(crawl.records[0].product_name, "loose.svg");
        assert_eq!(crawl.files_by_folder.get("for-web").unwrap().len(), 1);
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result = crawl(&tmp.path().join("nope"), &CatalogConfig::default());
        assert!(matches!(result, Err(CrawlError::MissingRoot(_))));
    }

    #[test]
    fn no_dot_file_uses_whole_name_as_extension() {
        let tmp = TempDir::new().unwrap();
        let root = compiled_root(&tmp);
        write_asset(&root, "RHEL/LICENSE", 10);

        let crawl = crawl(&root, &CatalogConfig::default()).unwrap();
        assert_eq!(crawl.records[0].extension, "LICENSE");
    }
}
