//! Tab-separated ledger store.
//!
//! The ledger is the single source of truth for curator-maintained data:
//! people hand-edit cells (notably `relatedProducts`), reorder columns, and
//! add new columns in their spreadsheet tool of choice. The store therefore
//! treats the header row as the schema — columns are always located by
//! name, never by fixed position — and reconciliation only ever appends.
//! Existing rows are written back verbatim, in order.
//!
//! ## Durability
//!
//! `save` builds the full TSV in a temp file next to the target, fsyncs it,
//! and renames it into place. A crash mid-write leaves the previous ledger
//! intact; there is never a moment where the file on disk is truncated.
//!
//! ## Repair
//!
//! A data row whose cell count disagrees with the header is padded or
//! truncated rather than rejected — losing a curator's 500-row ledger to
//! one bad paste would be far worse than quietly squaring it off. Repairs
//! are counted and surfaced in the run summary.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

const DELIMITER: char = '\t';

/// Column that uniquely keys every row.
pub const FULL_PATH_COLUMN: &str = "fullPath";

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger not found at {0} - create it with at least a header row first")]
    Missing(PathBuf),
    #[error("ledger at {0} has no header row")]
    EmptyHeader(PathBuf),
    #[error("ledger at {0} has no {1:?} column")]
    MissingColumn(PathBuf, String),
}

/// In-memory ledger: ordered headers, ordered rows, and a precomputed
/// column-name index so lookups don't rescan the header list.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub headers: Vec<String>,
    /// Row length always equals header length; unset cells are `""`.
    pub rows: Vec<Vec<String>>,
    /// Rows padded or truncated during parsing.
    pub repaired: usize,
    column_index: HashMap<String, usize>,
}

impl Ledger {
    /// Load the ledger from disk. A missing file is a configuration error:
    /// there is no schema to reconcile new files against.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        if !path.exists() {
            return Err(LedgerError::Missing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Parse ledger text. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, LedgerError> {
        let mut lines = content.lines().map(|l| l.trim_end_matches('\r'));

        let header_line = lines
            .next()
            .ok_or_else(|| LedgerError::EmptyHeader(origin.to_path_buf()))?;
        if header_line.trim().is_empty() {
            return Err(LedgerError::EmptyHeader(origin.to_path_buf()));
        }

        let headers: Vec<String> = header_line.split(DELIMITER).map(str::to_string).collect();
        let column_index = build_column_index(&headers);
        if !column_index.contains_key(FULL_PATH_COLUMN) {
            return Err(LedgerError::MissingColumn(
                origin.to_path_buf(),
                FULL_PATH_COLUMN.to_string(),
            ));
        }

        let mut rows = Vec::new();
        let mut repaired = 0;
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let mut row: Vec<String> = line.split(DELIMITER).map(str::to_string).collect();
            if row.len() != headers.len() {
                row.resize(headers.len(), String::new());
                repaired += 1;
            }
            rows.push(row);
        }

        Ok(Self {
            headers,
            rows,
            repaired,
            column_index,
        })
    }

    /// Index of a column by name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Every non-blank `fullPath` cell, plus the count of rows whose
    /// `fullPath` was blank (those rows can't participate in dedup).
    pub fn known_paths(&self) -> (HashSet<String>, usize) {
        // Presence is guaranteed by parse().
        let idx = self.column_index[FULL_PATH_COLUMN];
        let mut paths = HashSet::new();
        let mut blank = 0;
        for row in &self.rows {
            let value = row[idx].trim();
            if value.is_empty() {
                blank += 1;
            } else {
                paths.insert(value.to_string());
            }
        }
        (paths, blank)
    }

    /// Append new rows. Existing rows are never reordered or mutated.
    pub fn append(&mut self, new_rows: Vec<Vec<String>>) {
        self.rows.extend(new_rows);
    }

    /// Serialize headers + rows as TSV text. Embedded delimiter and line
    /// characters in cells are flattened to spaces so the grid stays
    /// rectangular on the next load.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        write_line(&mut out, &self.headers);
        for row in &self.rows {
            write_line(&mut out, row);
        }
        out
    }

    /// Write the ledger back to `path` atomically: temp file in the same
    /// directory, full write, fsync, rename.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                NamedTempFile::new_in(dir)?
            }
            None => NamedTempFile::new_in(".")?,
        };
        tmp.write_all(self.to_tsv().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| LedgerError::Io(e.error))?;
        Ok(())
    }
}

fn build_column_index(headers: &[String]) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.clone(), i))
        .collect()
}

fn write_line(out: &mut String, cells: &[String]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        for c in cell.chars() {
            out.push(if c == DELIMITER || c == '\n' || c == '\r' { ' ' } else { c });
        }
    }
    out.push('\n');
}
