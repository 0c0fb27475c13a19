//! CLI output formatting for the catalogue pipeline.
//!
//! Each report has a pure `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.
//!
//! ## Crawl inventory
//!
//! ```text
//! for-web/Ansible (2 files)
//!     automation-mesh.svg
//!     notes.html
//! for-web/RHEL (1 file)
//!     01_Network_Diagram.svg
//! ```
//!
//! ## Run summary
//!
//! ```text
//! Indexed 3 files
//! Ledger: 41 rows (1 repaired)
//! Added 2 rows
//! Wrote 4 pages
//! Warnings:
//!     no ledger column named "fileName"; value dropped for for-web/RHEL/a.svg
//! ```

use crate::crawl::Crawl;

/// Totals and warnings accumulated across a full run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_indexed: usize,
    pub ledger_rows: usize,
    pub repaired_rows: usize,
    pub rows_added: usize,
    pub pages_written: usize,
    pub warnings: Vec<String>,
}

/// Format the per-folder crawl inventory.
pub fn format_crawl_output(crawl: &Crawl) -> Vec<String> {
    let mut lines = Vec::new();
    for (folder, files) in &crawl.files_by_folder {
        lines.push(format!("{} ({})", folder, count_noun(files.len(), "file")));
        for file in files {
            lines.push(format!("    {file}"));
        }
    }
    lines
}

/// Print the crawl inventory to stdout.
pub fn print_crawl_output(crawl: &Crawl) {
    for line in format_crawl_output(crawl) {
        println!("{line}");
    }
}

/// Format the end-of-run summary.
pub fn format_run_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Indexed {}", count_noun(summary.files_indexed, "file")));

    let repaired = if summary.repaired_rows > 0 {
        format!(" ({} repaired)", summary.repaired_rows)
    } else {
        String::new()
    };
    lines.push(format!(
        "Ledger: {}{repaired}",
        count_noun(summary.ledger_rows, "row")
    ));

    lines.push(format!("Added {}", count_noun(summary.rows_added, "row")));
    lines.push(format!("Wrote {}", count_noun(summary.pages_written, "page")));

    if !summary.warnings.is_empty() {
        lines.push("Warnings:".to_string());
        for warning in &summary.warnings {
            lines.push(format!("    {warning}"));
        }
    }
    lines
}

/// Print the run summary to stdout.
pub fn print_run_summary(summary: &RunSummary) {
    for line in format_run_summary(summary) {
        println!("{line}");
    }
}

fn count_noun(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
