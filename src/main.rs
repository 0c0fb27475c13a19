use clap::{Parser, Subcommand};
use diagram_ledger::{config, crawl, ledger, output, pages, reconcile};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "diagram-ledger")]
#[command(about = "Static catalogue generator for documentation diagram libraries")]
#[command(long_about = "\
Static catalogue generator for documentation diagram libraries

Your compiled asset directory is the data source. Per-product folders hold
diagram files, a tab-separated ledger records what the library knows about
each one, and the output is a set of cross-linked HTML listing pages.

Directory structure:

  for-web/
  ├── _listing-page-assets/        # Page styles/scripts (never crawled)
  ├── index.html                   # Generated product index
  ├── RHEL.html                    # Generated per-product listing page
  ├── RHEL/
  │   ├── 01_Network_Diagram-2023.svg
  │   └── notes.html               # Skipped extension: listed, not catalogued
  └── Ansible/
      └── automation-mesh.svg

  data/assets.tsv                  # The ledger. Header row is the schema;
                                   # curator edits always survive re-runs.

The ledger must exist with a header row (at least a fullPath column) before
the first build. Run 'diagram-ledger gen-config' for a documented
catalog.toml.")]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "catalog.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index the compiled directory and print the inventory
    Crawl {
        /// Also dump the crawl as pretty JSON to this path
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Dry run: report what a build would append, writing nothing
    Check,
    /// Run the full pipeline: crawl → reconcile ledger → listing pages
    Build,
    /// Print a stock catalog.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Crawl { manifest } => {
            let config = config::load_config(&cli.config)?;
            let crawl = crawl::crawl(Path::new(&config.compiled_dir), &config)?;
            output::print_crawl_output(&crawl);
            println!("Indexed {} files.", crawl.records.len());
            if let Some(manifest_path) = manifest {
                let json = serde_json::to_string_pretty(&crawl)?;
                std::fs::write(&manifest_path, json)?;
                println!("Crawl manifest written to {}", manifest_path.display());
            }
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            println!("==> Checking {}", config.compiled_dir);
            let crawl = crawl::crawl(Path::new(&config.compiled_dir), &config)?;
            let ledger = ledger::Ledger::load(Path::new(&config.ledger_path))?;
            // Dry run: no git lookups, nothing written.
            let reconciled = reconcile::reconcile(&crawl.records, &ledger, &|_| None);

            println!(
                "{} files indexed, {} already in the ledger.",
                crawl.records.len(),
                crawl.records.len() - reconciled.rows.len()
            );
            if reconciled.rows.is_empty() {
                println!("Ledger is up to date.");
            } else {
                println!("A build would append {} row(s):", reconciled.rows.len());
                let path_idx = ledger.column(ledger::FULL_PATH_COLUMN).unwrap_or(0);
                for row in &reconciled.rows {
                    println!("    {}", row[path_idx]);
                }
            }
            for warning in &reconciled.warnings {
                println!("warning: {warning}");
            }
        }
        Command::Build => {
            let config = config::load_config(&cli.config)?;
            let ledger_path = Path::new(&config.ledger_path).to_path_buf();
            let mut summary = output::RunSummary::default();

            println!("==> Stage 1: Indexing {}", config.compiled_dir);
            let crawl = crawl::crawl(Path::new(&config.compiled_dir), &config)?;
            summary.files_indexed = crawl.records.len();

            println!("==> Stage 2: Reconciling {}", config.ledger_path);
            let mut ledger = ledger::Ledger::load(&ledger_path)?;
            summary.repaired_rows = ledger.repaired;

            let timeout = Duration::from_secs(config.date_lookup_timeout_secs);
            let reconciled = reconcile::reconcile(&crawl.records, &ledger, &|path| {
                reconcile::git_created_date(path, timeout)
            });
            summary.rows_added = reconciled.rows.len();
            summary.warnings.extend(reconciled.warnings);

            if summary.rows_added > 0 {
                ledger.append(reconciled.rows);
                // Durable before any page reads from it.
                ledger.save(&ledger_path)?;
            }
            summary.ledger_rows = ledger.rows.len();

            println!("==> Stage 3: Building pages → {}", config.compiled_dir);
            // Preview paths are keyed by the root's own name, matching the
            // crawler's path labeling.
            let asset_prefix = Path::new(&config.compiled_dir)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| config.compiled_dir.clone());
            let opts = pages::PageOptions {
                page_title: config.page_title.clone(),
                asset_prefix,
            };
            let page_summary = pages::build_pages(&ledger, Path::new(&config.compiled_dir), &opts)?;
            summary.pages_written = page_summary.pages.len();
            summary.warnings.extend(page_summary.warnings);

            println!("==> Build complete");
            output::print_run_summary(&summary);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
