//! Shared test utilities for the diagram-ledger test suite.
//!
//! Fixture builders for the two inputs every stage consumes: a compiled
//! asset tree on disk, and ledger text/structures in memory.

use crate::crawl::FileRecord;
use crate::ledger::Ledger;
use crate::title;
use std::path::Path;

/// Create a file of `size` bytes at `rel` under `root`, making parents.
pub fn write_asset(root: &Path, rel: &str, size: usize) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, vec![b'x'; size]).unwrap();
}

/// Build TSV ledger text from headers and rows.
pub fn ledger_text(headers: &[&str], rows: &[&[&str]]) -> String {
    let mut out = headers.join("\t");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

/// Build an in-memory ledger from headers and rows.
pub fn ledger_from(headers: &[&str], rows: &[&[&str]]) -> Ledger {
    Ledger::parse(&ledger_text(headers, rows), Path::new("test.tsv")).unwrap()
}

/// Build a `FileRecord` the way the crawler would for `full_path`.
pub fn record(full_path: &str, product: &str, extension: &str, size: u64) -> FileRecord {
    let file_name = full_path.rsplit('/').next().unwrap().to_string();
    FileRecord {
        title: title::normalize(&file_name),
        full_path: full_path.to_string(),
        product_name: product.to_string(),
        extension: extension.to_string(),
        file_name,
        file_size: size,
    }
}
