use std::collections::HashMap;

use crate::catalog::{AffinityIndex, Catalog};
use crate::models::{Chromosome, DayGenes, MICRO_COUNT};
use crate::optimizer::config::{PlannerConfig, PROTEIN_CAL_CAP};
use crate::optimizer::metrics::{day_metrics, is_feasible_day};

/// Fitness returned when a hard constraint fails during scored evaluation.
pub const HARD_FAIL_FITNESS: f64 = -1e12;

/// True when any candidate exceeds the per-plan repetition cap, or reappears
/// within the repetition window of its last use. An absent snack is not a
/// candidate and never counts.
pub fn violates_repeat_limits(ch: &Chromosome, cfg: &PlannerConfig) -> bool {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for idx in ch.item_indices() {
        *counts.entry(idx).or_insert(0) += 1;
    }
    if counts.values().any(|&c| c > cfg.max_repeat) {
        return true;
    }

    if cfg.repeat_window > 1 {
        let mut last_seen: HashMap<usize, usize> = HashMap::new();
        for (d, day) in ch.days.iter().enumerate() {
            for idx in day.items() {
                if let Some(&prev) = last_seen.get(&idx) {
                    if d - prev < cfg.repeat_window {
                        return true;
                    }
                }
                last_seen.insert(idx, d);
            }
        }
    }
    false
}

pub fn plan_cost(ch: &Chromosome, catalog: &Catalog) -> f64 {
    ch.item_indices().map(|i| catalog.item(i).price).sum()
}

/// Full hard-constraint predicate: repetition rules, total budget, and every
/// day-level check.
pub fn is_feasible_plan(ch: &Chromosome, catalog: &Catalog, cfg: &PlannerConfig) -> bool {
    if violates_repeat_limits(ch, cfg) {
        return false;
    }
    if plan_cost(ch, catalog) > cfg.total_budget() {
        return false;
    }
    ch.days
        .iter()
        .all(|day| is_feasible_day(&day_metrics(day, catalog), cfg))
}

/// Sum of affinities over all distinct slot pairs of one day.
fn day_affinity(day: &DayGenes, affinity: &AffinityIndex) -> f64 {
    if affinity.is_empty() {
        return 0.0;
    }
    let items: Vec<usize> = day.items().collect();
    let mut sum = 0.0;
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            sum += affinity.get(items[i], items[j]);
        }
    }
    sum
}

/// Scalar fitness to maximize.
///
/// Hard cutoffs return [`HARD_FAIL_FITNESS`] (a sentinel, never an error):
/// total cost over budget under strict-budget mode, any day's calorie-basis
/// protein share at or above the cap, any day's calories outside the band.
/// Everything else is a weighted soft term accumulated per day, adjusted by
/// the month-level repetition, snack-rule, and budget-overshoot penalties.
pub fn fitness(
    ch: &Chromosome,
    catalog: &Catalog,
    affinity: &AffinityIndex,
    cfg: &PlannerConfig,
) -> f64 {
    let w = &cfg.weights;

    if cfg.strict_budget && plan_cost(ch, catalog) > cfg.total_budget() {
        return HARD_FAIL_FITNESS;
    }

    let mut score = 0.0;

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for idx in ch.item_indices() {
        *counts.entry(idx).or_insert(0) += 1;
    }
    let over_cap: usize = counts
        .values()
        .map(|&c| c.saturating_sub(cfg.max_repeat))
        .sum();
    score -= w.p_repeat * over_cap as f64;

    if cfg.repeat_window > 1 {
        let mut last_seen: HashMap<usize, usize> = HashMap::new();
        let mut window_repeats = 0usize;
        for (d, day) in ch.days.iter().enumerate() {
            for idx in day.items() {
                if let Some(&prev) = last_seen.get(&idx) {
                    if d - prev < cfg.repeat_window {
                        window_repeats += 1;
                    }
                }
                last_seen.insert(idx, d);
            }
        }
        score -= w.p_repeat * window_repeats as f64;
    }

    let kcal_lo = cfg.kcal_lo();
    let kcal_hi = cfg.kcal_hi();
    let mut month_cost = 0.0;
    let mut snack_violations = 0usize;

    for (d, day) in ch.days.iter().enumerate() {
        let m = day_metrics(day, catalog);
        month_cost += m.cost;

        if m.protein_pct_cal >= PROTEIN_CAL_CAP {
            return HARD_FAIL_FITNESS;
        }
        if m.kcal < kcal_lo || m.kcal > kcal_hi {
            return HARD_FAIL_FITNESS;
        }

        let kcal_dev = m.kcal - cfg.target_kcal;
        score -= w.p_kcal * kcal_dev * kcal_dev;
        score -= w.p_macro
            * ((m.carb_pct_cal - cfg.carb_target).abs()
                + (m.protein_pct_cal - cfg.protein_target).abs()
                + (m.fat_pct_cal - cfg.fat_target).abs());
        score += w.w_micro_sum * m.micro_norm_mean;

        let mut shortfall_sum = 0.0;
        let mut constrained = 0usize;
        for i in 0..MICRO_COUNT {
            if let Some(min) = cfg.micro_min[i] {
                shortfall_sum += ((min - m.micros[i]) / min).max(0.0);
                constrained += 1;
            }
        }
        if constrained > 0 {
            score -= w.p_micro_shortfall * shortfall_sum / constrained as f64;
        }

        score += w.w_cooc * day_affinity(day, affinity);
        score += w.w_pref
            * day
                .items()
                .map(|i| catalog.item(i).pref_weight)
                .sum::<f64>();

        if day.has_snack() != cfg.snack_allowed_day(d) {
            snack_violations += 1;
        }
    }

    score -= w.snack_lambda * snack_violations as f64;

    let total_budget = cfg.total_budget();
    let overshoot = (month_cost - total_budget).max(0.0);
    score -= w.p_budget_total * overshoot * overshoot / (total_budget * total_budget);

    score
}
