use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::{PlanError, Result};

/// lunchplan — searches multi-day school lunch menus under budget,
/// repetition, and nutrition constraints.
#[derive(Parser, Debug)]
#[command(name = "lunchplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a multi-day menu plan from the input tables.
    Plan(PlanArgs),

    /// Load the input tables and print catalog coverage diagnostics.
    Catalog(TableArgs),
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Item cost CSV (item name + price per person).
    #[arg(long)]
    pub cost: PathBuf,

    /// Item nutrition CSV (kcal, macros, optional micronutrients).
    #[arg(long)]
    pub nutrition: PathBuf,

    /// Optional item category CSV (item name + category label).
    #[arg(long)]
    pub category: Option<PathBuf>,

    /// Optional student preference CSV (item name + intake ratio).
    #[arg(long)]
    pub preference: Option<PathBuf>,

    /// Optional pairwise affinity CSV (two item columns + weight).
    #[arg(long)]
    pub affinity: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub tables: TableArgs,

    /// Number of days to plan (1-365).
    #[arg(long, default_value_t = 20)]
    pub days: usize,

    /// Budget per person per day.
    #[arg(long, default_value_t = 5370.0)]
    pub budget: f64,

    /// Daily calorie target.
    #[arg(long, default_value_t = 900.0)]
    pub target_kcal: f64,

    /// Carbohydrate gram-ratio bounds as LO:HI percent (e.g. 55:65).
    #[arg(long)]
    pub carb_range: Option<String>,

    /// Protein gram-ratio bounds as LO:HI percent.
    #[arg(long)]
    pub protein_range: Option<String>,

    /// Fat gram-ratio bounds as LO:HI percent.
    #[arg(long)]
    pub fat_range: Option<String>,

    /// Disable the strict over-budget hard cut during scoring.
    #[arg(long)]
    pub no_strict_budget: bool,

    /// RNG seed for a reproducible search.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 300)]
    pub generations: usize,

    #[arg(long, default_value_t = 200)]
    pub population: usize,

    /// Student preference bonus weight.
    #[arg(long)]
    pub w_pref: Option<f64>,

    /// Pairwise affinity bonus weight.
    #[arg(long)]
    pub w_cooc: Option<f64>,

    /// Normalized micronutrient bonus weight.
    #[arg(long)]
    pub w_micro_sum: Option<f64>,

    /// Micronutrient shortfall penalty weight.
    #[arg(long)]
    pub p_micro_shortfall: Option<f64>,

    /// Squared kcal deviation penalty weight.
    #[arg(long)]
    pub p_kcal: Option<f64>,

    /// Macro share deviation penalty weight.
    #[arg(long)]
    pub p_macro: Option<f64>,

    /// Repetition penalty weight.
    #[arg(long)]
    pub p_repeat: Option<f64>,

    /// Budget overshoot penalty weight.
    #[arg(long)]
    pub p_budget: Option<f64>,

    /// Write the per-day plan table to this CSV file.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print the summary as JSON instead of the table footer.
    #[arg(long)]
    pub json: bool,
}

/// Parse a `LO:HI` percent pair.
pub fn parse_percent_range(raw: &str) -> Result<(f64, f64)> {
    let invalid = || {
        PlanError::InvalidParameter(format!(
            "expected a LO:HI percent pair like 55:65, got {raw:?}"
        ))
    };
    let (lo, hi) = raw.split_once(':').ok_or_else(invalid)?;
    let lo: f64 = lo.trim().parse().map_err(|_| invalid())?;
    let hi: f64 = hi.trim().parse().map_err(|_| invalid())?;
    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percent_range() {
        assert_eq!(parse_percent_range("55:65").unwrap(), (55.0, 65.0));
        assert_eq!(parse_percent_range(" 7 : 20 ").unwrap(), (7.0, 20.0));
        assert!(parse_percent_range("55-65").is_err());
        assert!(parse_percent_range("a:b").is_err());
    }
}
