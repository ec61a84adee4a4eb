use crate::catalog::Catalog;
use crate::models::{DayGenes, MICRO_COUNT};
use crate::optimizer::config::{PlannerConfig, EPS, PROTEIN_CAL_CAP};

/// Derived aggregates for one day's six slots. Ephemeral; recomputed on
/// demand because candidates can repeat across days.
#[derive(Debug, Clone, Default)]
pub struct DayMetrics {
    pub cost: f64,
    pub kcal: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    /// Calorie-basis macro shares (4 kcal/g for carb and protein, 9 for fat,
    /// over the day's total calories).
    pub carb_pct_cal: f64,
    pub protein_pct_cal: f64,
    pub fat_pct_cal: f64,
    pub micros: [f64; MICRO_COUNT],
    /// Mean over all micronutrients of `min(sum / scale, 1)`.
    pub micro_norm_mean: f64,
}

pub fn day_metrics(day: &DayGenes, catalog: &Catalog) -> DayMetrics {
    let mut m = DayMetrics::default();
    for idx in day.items() {
        let item = catalog.item(idx);
        m.cost += item.price;
        m.kcal += item.kcal;
        m.carb_g += item.carb_g;
        m.protein_g += item.protein_g;
        m.fat_g += item.fat_g;
        for i in 0..MICRO_COUNT {
            m.micros[i] += item.micros[i];
        }
    }

    let carb_kcal = m.carb_g * 4.0;
    let protein_kcal = m.protein_g * 4.0;
    let fat_kcal = m.fat_g * 9.0;
    // Fall back to the macro-calorie sum when the kcal column totals zero.
    let den = if m.kcal > 0.0 {
        m.kcal
    } else {
        carb_kcal + protein_kcal + fat_kcal
    }
    .max(EPS);
    m.carb_pct_cal = carb_kcal / den;
    m.protein_pct_cal = protein_kcal / den;
    m.fat_pct_cal = fat_kcal / den;

    let scales = catalog.micro_scales();
    let mut norm_sum = 0.0;
    for i in 0..MICRO_COUNT {
        norm_sum += (m.micros[i] / scales[i].max(EPS)).min(1.0);
    }
    m.micro_norm_mean = norm_sum / MICRO_COUNT as f64;

    m
}

/// Hard day-level feasibility: calorie band, gram-basis macro ratio bounds,
/// calorie-basis protein cap, and micronutrient minimums.
///
/// Note the two macro bases are intentionally different: bounds are checked
/// on gram ratios while the protein cap and soft scoring use calorie shares.
pub fn is_feasible_day(m: &DayMetrics, cfg: &PlannerConfig) -> bool {
    if m.kcal < cfg.kcal_lo() || m.kcal > cfg.kcal_hi() {
        return false;
    }

    let gram_sum = m.carb_g + m.protein_g + m.fat_g;
    if gram_sum <= 0.0 {
        return false;
    }
    if !cfg.carb_bounds.contains(m.carb_g / gram_sum)
        || !cfg.protein_bounds.contains(m.protein_g / gram_sum)
        || !cfg.fat_bounds.contains(m.fat_g / gram_sum)
    {
        return false;
    }

    if m.protein_pct_cal >= PROTEIN_CAL_CAP {
        return false;
    }

    for i in 0..MICRO_COUNT {
        if let Some(min) = cfg.micro_min[i] {
            if m.micros[i] < min {
                return false;
            }
        }
    }
    true
}
