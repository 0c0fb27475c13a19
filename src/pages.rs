//! Static listing-page generation.
//!
//! Stage 3 of the catalogue pipeline. Takes the reconciled ledger and
//! writes one listing page per product plus a global `index.html`, all into
//! the compiled asset directory so relative image paths resolve in place.
//!
//! ## Markup contract
//!
//! The generated pages are inert HTML; browser behavior is supplied by the
//! shared `_listing-page-assets/` stylesheet and script. Those collaborators
//! key off exact attribute names, so the following are contractual:
//!
//! - preview images carry `data-src` (not `src`) plus `js-lazy-load` — the
//!   script swaps `data-src` into `src` when the image scrolls into view,
//! - `preview-image` marks images that open in the click-to-enlarge modal,
//! - every cell carries `column--<fieldName>` for styling,
//! - the product switcher uses `product-link` / `product-link--active` and
//!   the `content-expander` / `content-expander__trigger` pair.
//!
//! Tables are wrapped in a `<sortable-table sortable="...">` custom element
//! whose attribute lists the 1-based sortable column indices.
//!
//! ## Grouping
//!
//! Products are re-derived from each row's `fullPath` second segment, the
//! same rule the crawler uses, rather than trusting any product column —
//! curators are free to rewrite `relatedProducts` without moving a row to a
//! different page.
//!
//! Rendering an empty ledger is not an error: the index page is produced
//! with no product links and no product pages are written.

use crate::ledger::{FULL_PATH_COLUMN, Ledger};
use maud::{DOCTYPE, Markup, html};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Columns that render as data cells get humanized headings; these two are
/// display-only synthetics/suppressions.
const SUPPRESSED_COLUMNS: &[&str] = &[FULL_PATH_COLUMN, "fileName"];
const PREVIEW_HEADING: &str = "Preview";

/// Columns offered to the sortable-table element, in attribute order.
const SORTABLE_COLUMNS: &[&str] = &["Title", "relatedProducts", "extension", "createdDate", "fileSize"];

/// File size thresholds, in kibibytes, strictly exceeded.
const SIZE_WARNING_KIB: u64 = 150;
const SIZE_ERROR_KIB: u64 = 300;

/// Rendering options threaded from config.
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Heading shown on every page.
    pub page_title: String,
    /// Compiled-dir name stripped from preview paths (pages live inside it).
    pub asset_prefix: String,
}

/// What got written, for the run summary.
#[derive(Debug, Default)]
pub struct PageSummary {
    /// Page file names, index first.
    pub pages: Vec<String>,
    pub warnings: Vec<String>,
}

/// Render and write the index page plus one page per product.
pub fn build_pages(ledger: &Ledger, out_dir: &Path, opts: &PageOptions) -> Result<PageSummary, PageError> {
    let mut summary = PageSummary::default();
    let groups = group_by_product(ledger, &mut summary.warnings);

    fs::create_dir_all(out_dir)?;

    let products: Vec<ProductLink> = groups.keys().map(|p| ProductLink::new(p)).collect();

    let index = render_index(&products, opts);
    fs::write(out_dir.join("index.html"), index.into_string())?;
    summary.pages.push("index.html".to_string());

    for (product, rows) in &groups {
        let link = ProductLink::new(product);
        let page = render_product_page(product, &link.file_name, rows, &products, ledger, opts);
        fs::write(out_dir.join(&link.file_name), page.into_string())?;
        summary.pages.push(link.file_name);
    }

    Ok(summary)
}

/// A product's page link: display name plus target file name.
#[derive(Debug, Clone)]
struct ProductLink {
    product: String,
    file_name: String,
}

impl ProductLink {
    fn new(product: &str) -> Self {
        Self {
            product: product.to_string(),
            file_name: format!("{}.html", product.replace(' ', "_")),
        }
    }
}

/// Group ledger rows by the second segment of their `fullPath`. Rows with
/// no usable path are reported and left off every page.
fn group_by_product<'a>(
    ledger: &'a Ledger,
    warnings: &mut Vec<String>,
) -> BTreeMap<String, Vec<&'a Vec<String>>> {
    let mut groups: BTreeMap<String, Vec<&Vec<String>>> = BTreeMap::new();
    // Presence is enforced at ledger load.
    let Some(path_idx) = ledger.column(FULL_PATH_COLUMN) else {
        warnings.push("ledger has no fullPath column; no pages can be grouped".to_string());
        return groups;
    };

    for row in &ledger.rows {
        let full_path = row[path_idx].trim();
        match full_path.split('/').nth(1) {
            Some(product) if !product.is_empty() => {
                groups.entry(product.to_string()).or_default().push(row);
            }
            _ => warnings.push(format!(
                "row with fullPath {full_path:?} has no product segment; left off all pages"
            )),
        }
    }
    groups
}

/// Shared document shell: head with the page-asset links, then the body.
fn base_document(opts: &PageOptions, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                title { (opts.page_title) }
                link media="all" rel="stylesheet" type="text/css" href="_listing-page-assets/styles.css";
                script src="_listing-page-assets/script.js" {}
            }
            body {
                div class="content-container" {
                    h1 { (opts.page_title) }
                    (content)
                }
            }
        }
    }
}

/// The global product index: one link per product page.
fn render_index(products: &[ProductLink], opts: &PageOptions) -> Markup {
    base_document(
        opts,
        html! {
            p class="product-list-description" {
                "Click a link to view the diagrams associated with that product."
            }
            div class="product-grid" {
                @for link in products {
                    a href=(link.file_name) class="product-link" { (link.product) }
                }
            }
        },
    )
}

/// A product's listing page: switcher to the other products, then the table.
fn render_product_page(
    product: &str,
    own_file: &str,
    rows: &[&Vec<String>],
    products: &[ProductLink],
    ledger: &Ledger,
    opts: &PageOptions,
) -> Markup {
    base_document(
        opts,
        html! {
            h2 class="product-heading" { (product) }
            a href="index.html" class="back-link" { "Back to product listing" }
            button class="content-expander__trigger" { "View other products" }
            div class="content-expander" {
                div class="product-grid" {
                    @for link in products {
                        // Active marking by substring match against this
                        // page's own file name.
                        @let active = link.file_name.contains(own_file);
                        a href=(link.file_name)
                            class=(if active { "product-link product-link--active" } else { "product-link" }) {
                            (link.product)
                        }
                    }
                }
            }
            (listing_table(ledger, rows, opts))
        },
    )
}

/// Render the listing table for a set of rows.
///
/// `fullPath` and `fileName` never display; a synthetic Preview column is
/// prepended instead, holding the lazy-loadable image reference.
pub fn listing_table(ledger: &Ledger, rows: &[&Vec<String>], opts: &PageOptions) -> Markup {
    let data_columns: Vec<&str> = ledger
        .headers
        .iter()
        .map(String::as_str)
        .filter(|h| !SUPPRESSED_COLUMNS.contains(h))
        .collect();

    let mut display_headers = vec![PREVIEW_HEADING];
    display_headers.extend(&data_columns);

    let sortable: Vec<String> = SORTABLE_COLUMNS
        .iter()
        .map(|name| {
            // 1-based display position; 0 when the column is absent.
            display_headers
                .iter()
                .position(|h| h == name)
                .map(|i| i + 1)
                .unwrap_or(0)
                .to_string()
        })
        .collect();

    let path_idx = ledger.column(FULL_PATH_COLUMN);
    let strip = format!("{}/", opts.asset_prefix);

    html! {
        sortable-table full-screen="false" sortable=(sortable.join(",")) {
            table {
                thead {
                    tr {
                        @for heading in &display_headers {
                            th { (humanize_heading(heading)) }
                        }
                    }
                }
                tbody {
                    @for row in rows.iter().copied() {
                        tr {
                            (preview_cell(row, path_idx, &strip))
                            @for column in &data_columns {
                                (data_cell(row, column, ledger))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// The synthetic first cell: a lazy-loaded preview image, or an empty cell
/// when the row has no usable path.
fn preview_cell(row: &[String], path_idx: Option<usize>, strip: &str) -> Markup {
    let full_path = path_idx.map(|i| row[i].trim()).unwrap_or_default();
    html! {
        td class="column--Preview" {
            @if !full_path.is_empty() {
                @let src = full_path.strip_prefix(strip).unwrap_or(full_path);
                img tabindex="0" data-src=(src) alt="" class="preview-image js-lazy-load";
            }
        }
    }
}

/// One data cell. `fileSize` converts bytes to rounded kibibytes and tags
/// oversized files; everything else renders verbatim (blank when unset).
fn data_cell(row: &[String], column: &str, ledger: &Ledger) -> Markup {
    let raw = ledger
        .column(column)
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or_default();

    let mut classes = format!("column--{column}");
    let content = if column == "fileSize" {
        match raw.trim().parse::<u64>() {
            Ok(bytes) => {
                let kib = (bytes + 512) / 1024;
                if kib > SIZE_ERROR_KIB {
                    classes.push_str(" error");
                } else if kib > SIZE_WARNING_KIB {
                    classes.push_str(" warning");
                }
                kib.to_string()
            }
            Err(_) => raw.to_string(),
        }
    } else {
        raw.to_string()
    };

    html! {
        td class=(classes) { (content) }
    }
}

/// Machine column names → table headings.
fn humanize_heading(name: &str) -> &str {
    match name {
        "relatedProducts" => "Related Products",
        "createdDate" => "Created Date",
        "fileSize" => "File Size (kb)",
        "extension" => "Extension",
        other => other,
    }
}
