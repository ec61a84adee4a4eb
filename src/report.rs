use std::path::Path;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{MacroBoundsSnapshot, PlanDay, PlanReport, PlanSummary};
use crate::optimizer::metrics::day_metrics;
use crate::optimizer::{PlannerConfig, SearchOutcome};

/// Render a search outcome into the per-day plan table plus summary.
pub fn build_report(
    outcome: &SearchOutcome,
    catalog: &Catalog,
    cfg: &PlannerConfig,
) -> PlanReport {
    let name = |idx: usize| catalog.item(idx).name.clone();

    let mut days = Vec::with_capacity(outcome.plan.days.len());
    for (d, day) in outcome.plan.days.iter().enumerate() {
        let m = day_metrics(day, catalog);
        let pref_sum: f64 = day.items().map(|i| catalog.item(i).pref_weight).sum();
        days.push(PlanDay {
            day: d + 1,
            rice: name(day.staple),
            soup: name(day.soup),
            side1: name(day.sides[0]),
            side2: name(day.sides[1]),
            side3: name(day.sides[2]),
            snack: day.snack.map(name),
            day_cost: m.cost,
            day_kcal: m.kcal,
            carb_g: m.carb_g,
            protein_g: m.protein_g,
            fat_g: m.fat_g,
            carb_pct_cal: m.carb_pct_cal * 100.0,
            protein_pct_cal: m.protein_pct_cal * 100.0,
            fat_pct_cal: m.fat_pct_cal * 100.0,
            day_pref_sum: pref_sum,
        });
    }

    let total_cost: f64 = days.iter().map(|r| r.day_cost).sum();
    let avg_kcal = if days.is_empty() {
        0.0
    } else {
        days.iter().map(|r| r.day_kcal).sum::<f64>() / days.len() as f64
    };

    PlanReport {
        days,
        summary: PlanSummary {
            days: cfg.days,
            budget_per_day: cfg.budget_per_day,
            target_kcal: cfg.target_kcal,
            macro_bounds: MacroBoundsSnapshot {
                carb: [cfg.carb_bounds.lo, cfg.carb_bounds.hi],
                protein: [cfg.protein_bounds.lo, cfg.protein_bounds.hi],
                fat: [cfg.fat_bounds.lo, cfg.fat_bounds.hi],
            },
            total_cost,
            avg_kcal,
            feasible: outcome.feasible,
        },
    }
}

/// Write the per-day table as CSV. The summary record stays out of the CSV;
/// it is rendered separately (stdout or JSON).
pub fn write_plan_csv<P: AsRef<Path>>(path: P, report: &PlanReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in &report.days {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
