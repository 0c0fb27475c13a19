//! Display-title derivation from asset file names.
//!
//! Diagram files arrive with machine-friendly names: separator characters,
//! manual ordering prefixes, and embedded 4-digit year markers. This module
//! turns them into something readable for the listing tables:
//!
//! - `01_Architecture_Diagram-2023.svg` → "Architecture Diagram"
//! - `Network-Flow.png` → "Network Flow"
//! - `2023_Overview.svg` → "Overview"
//! - `Foo-2022-Bar.svg` → "Foo - Bar" (year acts as a visual separator)
//!
//! The heuristic is lossy and approximate on purpose. It must stay
//! byte-stable across releases: titles already persisted in the ledger are
//! never recomputed, so any change here would make new rows disagree with
//! old ones for identically-named files.

/// Derive a display title from an asset file name.
///
/// Steps, in order:
/// 1. Every run of `_` or `-` becomes a single space.
/// 2. The extension (text after the *last* `.`) is split off; only the stem
///    is processed. No dot means the whole name is the stem.
/// 3. The stem is split into whitespace tokens.
/// 4. A first token that parses entirely as an integer is dropped — it is a
///    manual ordering prefix (`01 Diagram` → `Diagram`).
/// 5. Any remaining token of exactly four ASCII digits is deleted when it is
///    the last token, and replaced with a literal `-` otherwise.
/// 6. Surviving tokens are rejoined with single spaces.
///
/// An empty stem yields an empty title; that is not an error.
pub fn normalize(file_name: &str) -> String {
    let spaced: String = file_name
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();

    let stem = match spaced.rfind('.') {
        Some(dot) => &spaced[..dot],
        None => spaced.as_str(),
    };

    let mut tokens: Vec<&str> = stem.split_whitespace().collect();

    if let Some(first) = tokens.first()
        && first.parse::<i64>().is_ok()
    {
        tokens.remove(0);
    }

    let last = tokens.len().saturating_sub(1);
    let mut out: Vec<&str> = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        if is_year_marker(token) {
            if i != last {
                out.push("-");
            }
            // trailing year markers are dropped entirely
        } else {
            out.push(token);
        }
    }

    out.join(" ")
}

/// Exactly four ASCII digits — the shape of an embedded year/version token.
fn is_year_marker(token: &str) -> bool {
    token.len() == 4 && token.chars().all(|c| c.is_ascii_digit())
}
