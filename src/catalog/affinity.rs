use std::collections::HashMap;

use crate::catalog::builder::Catalog;
use crate::ingest::tables::AffinityRow;

const RESCALE_EPS: f64 = 1e-9;

/// Source weights already in [0, 1] pass through; anything above this (or
/// any negative weight) triggers a min-max rescale of the whole table.
const RESCALE_UPPER: f64 = 1.5;

/// Read-only pairwise-affinity lookup between candidate indices.
///
/// Keys are unordered pairs stored as `(lower, higher)`; only pairs whose
/// both members exist in the catalog are kept.
#[derive(Debug, Clone, Default)]
pub struct AffinityIndex {
    pairs: HashMap<(usize, usize), f64>,
}

impl AffinityIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(catalog: &Catalog, rows: &[AffinityRow]) -> Self {
        let mut weights: Vec<f64> = rows.iter().map(|r| r.weight).collect();

        if let (Some(min), Some(max)) = (
            weights.iter().copied().reduce(f64::min),
            weights.iter().copied().reduce(f64::max),
        ) {
            if max > RESCALE_UPPER || min < 0.0 {
                for w in &mut weights {
                    *w = (*w - min) / (max - min + RESCALE_EPS);
                }
            }
        }

        // Average duplicate unordered pairs by key before index mapping.
        let mut by_key_pair: HashMap<(&str, &str), (f64, usize)> = HashMap::new();
        for (row, w) in rows.iter().zip(&weights) {
            let pair = if row.a <= row.b {
                (row.a.as_str(), row.b.as_str())
            } else {
                (row.b.as_str(), row.a.as_str())
            };
            let entry = by_key_pair.entry(pair).or_insert((0.0, 0));
            entry.0 += w;
            entry.1 += 1;
        }

        let mut pairs = HashMap::new();
        for ((a_key, b_key), (sum, n)) in by_key_pair {
            let (Some(ia), Some(ib)) = (catalog.index_of(a_key), catalog.index_of(b_key)) else {
                continue;
            };
            let pair = (ia.min(ib), ia.max(ib));
            pairs.insert(pair, sum / n as f64);
        }
        Self { pairs }
    }

    /// Affinity between two candidate indices, in either order. 0 when the
    /// pair is unknown.
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.pairs
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
