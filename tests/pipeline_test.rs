use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use lunchplan_rs::catalog::{build_catalog, AffinityIndex, Catalog};
use lunchplan_rs::ingest::{
    read_category_table, read_cost_table, read_nutrition_table, read_preference_table,
};
use lunchplan_rs::optimizer::{run_search, PlannerConfig};
use lunchplan_rs::report::{build_report, write_plan_csv};

/// Write a catalog of 5 rices, 5 soups, 15 sides, and 3 snacks as the three
/// vendor CSVs. Any rice + soup + three sides day sums to 899 kcal with
/// gram ratios inside the default macro bounds.
fn write_tables(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let mut names: Vec<(String, &str)> = Vec::new();
    for i in 0..5 {
        names.push((format!("rice {i}"), "rice"));
        names.push((format!("soup {i}"), "soup"));
    }
    for i in 0..15 {
        names.push((format!("side {i}"), "side"));
    }
    for i in 0..3 {
        names.push((format!("snack {i}"), "snack"));
    }

    let mut cost = String::from("menu,price\n");
    let mut nutrition =
        String::from("menu,kcal,carbo,protein,fat,vitaA,thiamin,ribo,niacin,vitaC,vitaD,ca,fe\n");
    let mut category = String::from("menu,category\n");
    for (name, label) in &names {
        cost.push_str(&format!("{name},1050\n"));
        let (carb, protein, fat) = if *label == "snack" {
            (10.0, 1.0, 1.0)
        } else {
            (20.6, 5.0, 8.6)
        };
        let kcal = 4.0 * carb + 4.0 * protein + 9.0 * fat;
        nutrition.push_str(&format!(
            "{name},{kcal},{carb},{protein},{fat},80,0.2,0.2,1.0,10,1.0,80,1.5\n"
        ));
        category.push_str(&format!("{name},{label}\n"));
    }

    let cost_path = dir.join("cost.csv");
    let nutrition_path = dir.join("nutrition.csv");
    let category_path = dir.join("category.csv");
    fs::write(&cost_path, cost).unwrap();
    fs::write(&nutrition_path, nutrition).unwrap();
    fs::write(&category_path, category).unwrap();
    (cost_path, nutrition_path, category_path)
}

fn load(dir: &Path) -> Catalog {
    let (cost_path, nutrition_path, category_path) = write_tables(dir);
    let cost = read_cost_table(cost_path).unwrap();
    let nutrition = read_nutrition_table(nutrition_path).unwrap();
    let categories = read_category_table(category_path).unwrap();
    build_catalog(&cost, &nutrition, &categories).unwrap()
}

fn quick_cfg(days: usize) -> PlannerConfig {
    let mut cfg = PlannerConfig {
        days,
        ..Default::default()
    };
    cfg.ga.population = 40;
    cfg.ga.generations = 30;
    cfg
}

#[test]
fn test_end_to_end_five_day_plan() {
    let dir = TempDir::new().unwrap();
    let catalog = load(dir.path());
    assert_eq!(catalog.len(), 28);

    let cfg = quick_cfg(5);
    let outcome = run_search(&catalog, &AffinityIndex::empty(), &cfg).unwrap();
    let report = build_report(&outcome, &catalog, &cfg);

    assert_eq!(report.days.len(), 5);
    for (i, row) in report.days.iter().enumerate() {
        assert_eq!(row.day, i + 1);
        assert!(!row.rice.is_empty());
        assert!(!row.soup.is_empty());
        assert!(row.day_cost > 0.0);
        assert!(row.day_kcal > 0.0);
    }

    let sum: f64 = report.days.iter().map(|r| r.day_cost).sum();
    assert!((report.summary.total_cost - sum).abs() < 1e-9);
    if report.summary.feasible {
        assert!(report.summary.total_cost <= 5.0 * 5370.0 + 1e-6);
    }
}

#[test]
fn test_empty_preference_table_defaults_to_zero() {
    let dir = TempDir::new().unwrap();
    let mut catalog = load(dir.path());

    let pref_path = dir.path().join("pref.csv");
    fs::write(&pref_path, "menu,preference\n").unwrap();
    let rows = read_preference_table(pref_path).unwrap();
    catalog.attach_preferences(&rows);

    assert!(catalog.items().iter().all(|c| c.pref_weight == 0.0));

    let cfg = quick_cfg(5);
    let outcome = run_search(&catalog, &AffinityIndex::empty(), &cfg).unwrap();
    let report = build_report(&outcome, &catalog, &cfg);
    assert!(report.days.iter().all(|r| r.day_pref_sum == 0.0));
}

#[test]
fn test_snack_rows_follow_the_weekday_rule() {
    let dir = TempDir::new().unwrap();
    let catalog = load(dir.path());

    let cfg = quick_cfg(10);
    let outcome = run_search(&catalog, &AffinityIndex::empty(), &cfg).unwrap();
    let report = build_report(&outcome, &catalog, &cfg);

    // Only the Wednesdays (rows 3 and 8) may carry a snack.
    for row in &report.days {
        if row.snack.is_some() {
            assert!(row.day == 3 || row.day == 8);
        }
    }
}

#[test]
fn test_plan_csv_row_count_matches_days() {
    let dir = TempDir::new().unwrap();
    let catalog = load(dir.path());

    let cfg = quick_cfg(5);
    let outcome = run_search(&catalog, &AffinityIndex::empty(), &cfg).unwrap();
    let report = build_report(&outcome, &catalog, &cfg);

    let out = dir.path().join("plan.csv");
    write_plan_csv(&out, &report).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert!(headers.contains(&"rice".to_string()));
    assert!(headers.contains(&"day_cost".to_string()));
    assert_eq!(reader.records().count(), 5);
}
