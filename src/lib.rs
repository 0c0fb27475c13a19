//! # Diagram Ledger
//!
//! A static catalogue generator for documentation diagram libraries. Your
//! compiled asset directory is the data source: per-product folders hold
//! diagram files, a tab-separated ledger records what the library knows
//! about each one, and the output is a set of cross-linked HTML listing
//! pages with sortable tables and lazy-loaded previews.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Crawl      for-web/   →  file records      (filesystem → metadata)
//! 2. Reconcile  records    →  data/assets.tsv   (append-only ledger merge)
//! 3. Pages      ledger     →  for-web/*.html    (per-product listing pages)
//! ```
//!
//! The stages run strictly in order: reconciliation starts only once the
//! crawl has fully completed, and page generation only once the ledger has
//! been durably written. The whole run is single-pass and offline — no
//! database, no server, no concurrent writers.
//!
//! # The Ledger Is the Source of Truth
//!
//! Crawled metadata only seeds *new* rows. Everything already in the
//! ledger — including hand-edited `relatedProducts` cells, reordered
//! columns, and curator-added columns — survives every re-run verbatim.
//! Reconciliation places values by column name, never by position, and an
//! unchanged tree reconciles to zero new rows.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`crawl`] | Stage 1 — walks the compiled directory, derives per-file metadata |
//! | [`reconcile`] | Stage 2 — diffs crawl vs ledger, builds appendable rows, git created-date enrichment |
//! | [`pages`] | Stage 3 — renders product listing pages and the index with Maud |
//! | [`ledger`] | TSV ledger load/append/atomic-save, name-keyed column access |
//! | [`title`] | Filename → display-title normalization heuristic |
//! | [`config`] | `catalog.toml` loading, validation, stock-config printing |
//! | [`output`] | CLI output formatting — crawl inventory and run summary |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): compile-time
//! checked, auto-escaped, no template files to ship. The page structure is
//! plain Rust, but the attribute vocabulary (`data-src`, `js-lazy-load`,
//! `preview-image`, `column--<name>`) is contractual — the shared
//! `_listing-page-assets/` script implements lazy loading and the
//! click-to-enlarge modal against exactly those names.
//!
//! ## Append-Only Reconciliation
//!
//! The ledger doubles as a curation surface that people edit by hand, so
//! the generator never rewrites, reorders, or deletes rows — it only
//! appends, and it writes the file atomically (full temp-file write, then
//! rename) so a crash can't eat the curators' work.

pub mod config;
pub mod crawl;
pub mod ledger;
pub mod output;
pub mod pages;
pub mod reconcile;
pub mod title;

#[cfg(test)]
pub(crate) mod test_helpers;
