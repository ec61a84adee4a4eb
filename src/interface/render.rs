use crate::catalog::Catalog;
use crate::models::{Category, PlanReport};

/// Display the plan in a formatted two-line-per-day table.
pub fn display_plan(report: &PlanReport) {
    if report.days.is_empty() {
        println!("No plan produced.");
        return;
    }

    println!();
    println!("=== Menu Plan ({} days) ===", report.days.len());
    println!();

    for row in &report.days {
        println!(
            "Day {:>3} | {:>8.0} won | {:>5.0} kcal | C {:>4.1}% P {:>4.1}% F {:>4.1}% | pref {:.2}",
            row.day,
            row.day_cost,
            row.day_kcal,
            row.carb_pct_cal,
            row.protein_pct_cal,
            row.fat_pct_cal,
            row.day_pref_sum
        );
        println!(
            "        {} | {} | {}, {}, {} | {}",
            row.rice,
            row.soup,
            row.side1,
            row.side2,
            row.side3,
            row.snack.as_deref().unwrap_or("(no snack)")
        );
    }

    let s = &report.summary;
    println!();
    println!("--- Summary ---");
    println!(
        "Total cost: {:.0} won (budget {:.0})",
        s.total_cost,
        s.budget_per_day * s.days as f64
    );
    println!("Average kcal: {:.1} (target {:.0})", s.avg_kcal, s.target_kcal);
    println!(
        "Macro bounds (g-ratio): C {:.0}-{:.0}% P {:.0}-{:.0}% F {:.0}-{:.0}%",
        s.macro_bounds.carb[0] * 100.0,
        s.macro_bounds.carb[1] * 100.0,
        s.macro_bounds.protein[0] * 100.0,
        s.macro_bounds.protein[1] * 100.0,
        s.macro_bounds.fat[0] * 100.0,
        s.macro_bounds.fat[1] * 100.0
    );
    println!("Feasible: {}", s.feasible);
    if !s.feasible {
        println!(
            "Warning: no plan satisfied every hard constraint; showing the best approximation. \
             Consider relaxing constraints, raising the budget, or expanding the menu."
        );
    }
    println!();
}

/// Display catalog coverage diagnostics.
pub fn display_catalog_summary(catalog: &Catalog) {
    println!();
    println!("=== Catalog ({} items) ===", catalog.len());
    println!();

    let pools = catalog.pools();
    for category in [
        Category::Rice,
        Category::Soup,
        Category::Side,
        Category::Snack,
    ] {
        let pool = pools.for_category(category);
        println!("  {:<5} {:>4} items", category.as_str(), pool.len());
    }

    let with_pref = catalog
        .items()
        .iter()
        .filter(|c| c.pref_weight > 0.0)
        .count();
    println!();
    println!("  {} items carry a preference weight", with_pref);
    println!();
}
