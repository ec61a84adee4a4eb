use clap::Parser;

use lunchplan_rs::catalog::{build_catalog, AffinityIndex, Catalog};
use lunchplan_rs::cli::{parse_percent_range, Cli, Command, PlanArgs, TableArgs};
use lunchplan_rs::error::Result;
use lunchplan_rs::ingest::{
    read_affinity_table, read_category_table, read_cost_table, read_nutrition_table,
    read_preference_table,
};
use lunchplan_rs::interface::{display_catalog_summary, display_plan};
use lunchplan_rs::optimizer::{run_search, PlannerConfig};
use lunchplan_rs::report::{build_report, write_plan_csv};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(args) => cmd_plan(&args),
        Command::Catalog(args) => cmd_catalog(&args),
    }
}

/// Build the catalog and affinity index from the input tables.
fn load_catalog(tables: &TableArgs) -> Result<(Catalog, AffinityIndex)> {
    let cost = read_cost_table(&tables.cost)?;
    let nutrition = read_nutrition_table(&tables.nutrition)?;
    let categories = match &tables.category {
        Some(path) => read_category_table(path)?,
        None => Vec::new(),
    };

    let mut catalog = build_catalog(&cost, &nutrition, &categories)?;

    if let Some(path) = &tables.preference {
        let rows = read_preference_table(path)?;
        catalog.attach_preferences(&rows);
    }

    let affinity = match &tables.affinity {
        Some(path) => {
            let rows = read_affinity_table(path)?;
            AffinityIndex::build(&catalog, &rows)
        }
        None => AffinityIndex::empty(),
    };

    Ok((catalog, affinity))
}

fn config_from_args(args: &PlanArgs) -> Result<PlannerConfig> {
    let mut cfg = PlannerConfig {
        days: args.days,
        budget_per_day: args.budget,
        target_kcal: args.target_kcal,
        strict_budget: !args.no_strict_budget,
        ..Default::default()
    };

    if let Some(raw) = &args.carb_range {
        let (lo, hi) = parse_percent_range(raw)?;
        cfg.set_carb_range_pct(lo, hi);
    }
    if let Some(raw) = &args.protein_range {
        let (lo, hi) = parse_percent_range(raw)?;
        cfg.set_protein_range_pct(lo, hi);
    }
    if let Some(raw) = &args.fat_range {
        let (lo, hi) = parse_percent_range(raw)?;
        cfg.set_fat_range_pct(lo, hi);
    }

    cfg.ga.seed = args.seed;
    cfg.ga.generations = args.generations;
    cfg.ga.population = args.population;

    let w = &mut cfg.weights;
    if let Some(v) = args.w_pref {
        w.w_pref = v;
    }
    if let Some(v) = args.w_cooc {
        w.w_cooc = v;
    }
    if let Some(v) = args.w_micro_sum {
        w.w_micro_sum = v;
    }
    if let Some(v) = args.p_micro_shortfall {
        w.p_micro_shortfall = v;
    }
    if let Some(v) = args.p_kcal {
        w.p_kcal = v;
    }
    if let Some(v) = args.p_macro {
        w.p_macro = v;
    }
    if let Some(v) = args.p_repeat {
        w.p_repeat = v;
    }
    if let Some(v) = args.p_budget {
        w.p_budget_total = v;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Run the full pipeline: tables in, optimized plan out.
fn cmd_plan(args: &PlanArgs) -> Result<()> {
    let (catalog, affinity) = load_catalog(&args.tables)?;
    let cfg = config_from_args(args)?;

    println!(
        "Searching a {}-day plan over {} candidates (population {}, {} generations)...",
        cfg.days,
        catalog.len(),
        cfg.ga.population,
        cfg.ga.generations
    );

    let outcome = run_search(&catalog, &affinity, &cfg)?;
    let report = build_report(&outcome, &catalog, &cfg);

    display_plan(&report);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    }

    if let Some(path) = &args.out {
        write_plan_csv(path, &report)?;
        println!("Plan written to {}", path.display());
    }

    Ok(())
}

/// Load the tables and report catalog coverage without searching.
fn cmd_catalog(args: &TableArgs) -> Result<()> {
    let (catalog, _affinity) = load_catalog(args)?;
    display_catalog_summary(&catalog);
    Ok(())
}
