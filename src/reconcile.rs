//! Ledger reconciliation.
//!
//! Stage 2 of the catalogue pipeline. Compares the crawl's file records
//! against the paths already present in the ledger and builds one new row
//! per undiscovered file. Reconciliation is append-only and idempotent: a
//! second run over an unchanged tree produces zero new rows.
//!
//! Rows are built against the ledger's *current* header order. Curators
//! reorder and add columns between runs, so every metadata field is placed
//! by column-name lookup; a field with no matching column is dropped with a
//! warning rather than failing the run. The one renaming rule from the
//! folder convention: a record's `product_name` lands in the
//! `relatedProducts` column.
//!
//! ## Created dates
//!
//! New rows are optionally enriched with a source-control date: the first
//! ten bytes of `git log --format=%ad --date=iso -- <path>` when they look
//! like `YYYY-MM-DD`. The lookups are independent per row, so they run on
//! the rayon pool; results are reassembled in discovery order before any
//! row is built. A failed, malformed, or timed-out lookup leaves the cell
//! empty — it never aborts reconciliation.

use crate::crawl::FileRecord;
use crate::ledger::{FULL_PATH_COLUMN, Ledger};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Ledger column fed from `FileRecord::product_name`.
const RELATED_PRODUCTS_COLUMN: &str = "relatedProducts";
/// Ledger column fed from the source-control lookup.
const CREATED_DATE_COLUMN: &str = "createdDate";

/// Outcome of a reconciliation pass.
#[derive(Debug)]
pub struct Reconciled {
    /// Positional rows, ready to append, in discovery order.
    pub rows: Vec<Vec<String>>,
    pub warnings: Vec<String>,
}

/// A row under construction, keyed by column name. Positions are resolved
/// against the ledger header only at the end, so reordered or extended
/// headers cost nothing.
#[derive(Debug, Default)]
struct NewRow {
    values: BTreeMap<String, String>,
}

impl NewRow {
    fn set(&mut self, column: &str, value: String) {
        self.values.insert(column.to_string(), value);
    }

    /// Resolve to a positional row of exactly header length. Unmatched
    /// fields are dropped and reported.
    fn into_positional(self, ledger: &Ledger, key: &str, warnings: &mut Vec<String>) -> Vec<String> {
        let mut row = vec![String::new(); ledger.headers.len()];
        for (column, value) in self.values {
            match ledger.column(&column) {
                Some(i) => row[i] = value,
                None => warnings.push(format!(
                    "no ledger column named {column:?}; value dropped for {key}"
                )),
            }
        }
        row
    }
}

/// Build ledger rows for every crawled file not yet present in the ledger.
///
/// `lookup` maps a full path to a created date; pass
/// [`git_created_date`] in production or a stub in tests. Lookups run in
/// parallel but the returned rows keep the records' discovery order.
pub fn reconcile(
    records: &[FileRecord],
    ledger: &Ledger,
    lookup: &(dyn Fn(&str) -> Option<String> + Sync),
) -> Reconciled {
    let mut warnings = Vec::new();

    let (known, blank) = ledger.known_paths();
    if blank > 0 {
        warnings.push(format!(
            "{blank} ledger row(s) have a blank fullPath cell and were ignored for dedup"
        ));
    }

    let new_records: Vec<&FileRecord> = records
        .iter()
        .filter(|r| !known.contains(&r.full_path))
        .collect();

    // Independent per-row external calls; collect() keeps discovery order.
    let dates: Vec<Option<String>> = new_records
        .par_iter()
        .map(|r| lookup(&r.full_path))
        .collect();

    let mut rows = Vec::with_capacity(new_records.len());
    for (record, date) in new_records.into_iter().zip(dates) {
        let mut row = NewRow::default();
        row.set(FULL_PATH_COLUMN, record.full_path.clone());
        row.set(RELATED_PRODUCTS_COLUMN, record.product_name.clone());
        row.set("extension", record.extension.clone());
        row.set("fileName", record.file_name.clone());
        row.set("fileSize", record.file_size.to_string());
        row.set("Title", record.title.clone());
        if let Some(date) = date {
            row.set(CREATED_DATE_COLUMN, date);
        }
        rows.push(row.into_positional(ledger, &record.full_path, &mut warnings));
    }

    Reconciled { rows, warnings }
}

/// Look up a file's creation date from git history.
///
/// Runs `git log --format=%ad --date=iso -- <path>` with a hard deadline
/// and validates the first ten bytes of output as `YYYY-MM-DD`. Any
/// failure mode — git absent, non-zero exit, unexpected output, timeout —
/// yields `None`.
pub fn git_created_date(path: &str, timeout: Duration) -> Option<String> {
    let mut child = Command::new("git")
        .args(["log", "--format=%ad", "--date=iso", "--", path])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    // Drain stdout on a helper thread so a long history can't fill the
    // pipe and wedge the child past its deadline.
    let mut stdout = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = stdout.read_to_string(&mut buf);
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(_) => return None,
        }
    };

    let output = reader.join().ok()?;
    if !status.success() {
        return None;
    }

    let date = output.get(..10)?;
    is_iso_date(date).then(|| date.to_string())
}

/// `YYYY-MM-DD` shape check on exactly ten bytes.
fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
