use strsim::jaro_winkler;

use crate::error::{PlanError, Result};

/// Minimum Jaro-Winkler similarity for a fuzzy header match.
const FUZZY_THRESHOLD: f64 = 0.92;

/// Fold a header for comparison: strip BOM, trim, lowercase.
pub fn fold_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Resolve one column among `headers` given accepted synonyms.
///
/// Tries exact matches first, then case/BOM-folded matches, then a fuzzy
/// pass so vendor spellings like `Prices` still resolve.
pub fn resolve_column(headers: &[String], synonyms: &[&'static str]) -> Option<usize> {
    for syn in synonyms {
        if let Some(i) = headers.iter().position(|h| h == syn) {
            return Some(i);
        }
    }

    let folded: Vec<String> = headers.iter().map(|h| fold_header(h)).collect();
    for syn in synonyms {
        let syn = syn.to_lowercase();
        if let Some(i) = folded.iter().position(|h| *h == syn) {
            return Some(i);
        }
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, h) in folded.iter().enumerate() {
        for syn in synonyms {
            let score = jaro_winkler(h, &syn.to_lowercase());
            if score >= FUZZY_THRESHOLD && best.map_or(true, |(_, b)| score > b) {
                best = Some((i, score));
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Like [`resolve_column`] but fails with the headers actually present.
pub fn require_column(headers: &[String], synonyms: &[&'static str]) -> Result<usize> {
    resolve_column(headers, synonyms).ok_or_else(|| PlanError::MissingColumn {
        wanted: synonyms.to_vec(),
        found: headers.to_vec(),
    })
}

/// Parse a numeric cell, tolerating thousands separators and stray spaces.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
