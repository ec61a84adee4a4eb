use crate::error::{PlanError, Result};
use crate::models::{Micro, MICRO_COUNT};

/// Epsilon used in place of zero denominators throughout scoring.
pub const EPS: f64 = 1e-9;

/// Calorie-based protein share must stay strictly below this.
pub const PROTEIN_CAL_CAP: f64 = 0.20;

/// Days per scheduling week (Monday through Friday).
pub const WEEK_DAYS: usize = 5;

/// Inclusive fraction range for one macronutrient.
#[derive(Debug, Clone, Copy)]
pub struct MacroRange {
    pub lo: f64,
    pub hi: f64,
}

impl MacroRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    #[inline]
    pub fn contains(self, x: f64) -> bool {
        self.lo <= x && x <= self.hi
    }

    pub fn midpoint(self) -> f64 {
        (self.lo + self.hi) / 2.0
    }
}

/// Soft-scoring weights and penalties. Defaults are the tuned production
/// values; all externally overridable.
#[derive(Debug, Clone)]
pub struct Weights {
    /// Bonus per unit of student preference weight served.
    pub w_pref: f64,
    /// Bonus per unit of pairwise affinity within a day.
    pub w_cooc: f64,
    /// Bonus per unit of normalized micronutrient mean.
    pub w_micro_sum: f64,
    /// Penalty per unit of mean micronutrient shortfall.
    pub p_micro_shortfall: f64,
    /// Penalty per squared kcal deviation from target.
    pub p_kcal: f64,
    /// Penalty per unit of absolute macro-share deviation.
    pub p_macro: f64,
    /// Penalty per over-cap or within-window repetition.
    pub p_repeat: f64,
    /// Penalty weight on the squared relative budget overshoot.
    pub p_budget_total: f64,
    /// Fixed penalty per day violating the snack day-of-week rule.
    pub snack_lambda: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            w_pref: 0.5,
            w_cooc: 0.5,
            w_micro_sum: 0.5,
            p_micro_shortfall: 0.5,
            p_kcal: 10.0,
            p_macro: 1.0,
            p_repeat: 0.5,
            p_budget_total: 10.0,
            snack_lambda: 1e6,
        }
    }
}

/// Genetic-search knobs.
#[derive(Debug, Clone)]
pub struct GaParams {
    pub population: usize,
    pub generations: usize,
    /// Probability that a selected pair undergoes day-aligned crossover.
    pub cx_rate: f64,
    /// Per-slot mutation probability.
    pub mut_rate: f64,
    pub tournament: usize,
    pub seed: u64,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population: 200,
            generations: 300,
            cx_rate: 0.10,
            mut_rate: 0.10,
            tournament: 3,
            seed: 42,
        }
    }
}

/// Immutable parameter bundle for one optimization run. Constructed once,
/// validated, then passed by reference into every component.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub days: usize,
    pub budget_per_day: f64,
    pub target_kcal: f64,
    /// Half-width of the allowed calorie band, as a fraction of target.
    pub kcal_band_frac: f64,
    /// Gram-basis macro ratio bounds.
    pub carb_bounds: MacroRange,
    pub protein_bounds: MacroRange,
    pub fat_bounds: MacroRange,
    /// Calorie-basis macro share targets for soft scoring.
    pub carb_target: f64,
    pub protein_target: f64,
    pub fat_target: f64,
    /// Maximum occurrences of one candidate across the whole plan.
    pub max_repeat: usize,
    /// A candidate may not reappear within this many days of its last use.
    pub repeat_window: usize,
    /// Per-day micronutrient minimums; `None` means unconstrained.
    pub micro_min: [Option<f64>; MICRO_COUNT],
    /// Short-circuit scoring to the hard-fail sentinel when the plan cost
    /// exceeds the total budget.
    pub strict_budget: bool,
    pub weights: Weights,
    pub ga: GaParams,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let mut micro_min = [None; MICRO_COUNT];
        micro_min[Micro::VitA.index()] = Some(284.0);
        micro_min[Micro::Thiamin.index()] = Some(0.44);
        micro_min[Micro::Riboflavin.index()] = Some(0.57);
        micro_min[Micro::VitC.index()] = Some(33.4);
        micro_min[Micro::Calcium.index()] = Some(300.0);
        micro_min[Micro::Iron.index()] = Some(4.7);

        Self {
            days: 20,
            budget_per_day: 5370.0,
            target_kcal: 900.0,
            kcal_band_frac: 0.10,
            carb_bounds: MacroRange::new(0.55, 0.65),
            protein_bounds: MacroRange::new(0.07, 0.20),
            fat_bounds: MacroRange::new(0.15, 0.30),
            carb_target: 0.60,
            protein_target: 0.15,
            fat_target: 0.25,
            max_repeat: 2,
            repeat_window: 5,
            micro_min,
            strict_budget: true,
            weights: Weights::default(),
            ga: GaParams::default(),
        }
    }
}

impl PlannerConfig {
    pub fn kcal_lo(&self) -> f64 {
        self.target_kcal * (1.0 - self.kcal_band_frac)
    }

    pub fn kcal_hi(&self) -> f64 {
        self.target_kcal * (1.0 + self.kcal_band_frac)
    }

    pub fn total_budget(&self) -> f64 {
        self.budget_per_day * self.days as f64
    }

    /// Snack day-of-week rule: only the Wednesday of each of the first four
    /// full five-day weeks permits a real snack.
    pub fn snack_allowed_day(&self, day: usize) -> bool {
        let week = day / WEEK_DAYS;
        day % WEEK_DAYS == 2 && week < 4.min(self.days / WEEK_DAYS)
    }

    /// Override one macro's gram-ratio bounds from a percent pair; the
    /// calorie-share scoring target moves to the range midpoint.
    pub fn set_carb_range_pct(&mut self, lo: f64, hi: f64) {
        self.carb_bounds = MacroRange::new(lo / 100.0, hi / 100.0);
        self.carb_target = self.carb_bounds.midpoint();
    }

    pub fn set_protein_range_pct(&mut self, lo: f64, hi: f64) {
        self.protein_bounds = MacroRange::new(lo / 100.0, hi / 100.0);
        self.protein_target = self.protein_bounds.midpoint();
    }

    pub fn set_fat_range_pct(&mut self, lo: f64, hi: f64) {
        self.fat_bounds = MacroRange::new(lo / 100.0, hi / 100.0);
        self.fat_target = self.fat_bounds.midpoint();
    }

    pub fn validate(&self) -> Result<()> {
        if self.days == 0 || self.days > 365 {
            return Err(PlanError::InvalidParameter(format!(
                "days must be 1-365, got {}",
                self.days
            )));
        }
        if !(self.budget_per_day > 0.0) || !self.budget_per_day.is_finite() {
            return Err(PlanError::InvalidParameter(format!(
                "budget_per_day must be positive, got {}",
                self.budget_per_day
            )));
        }
        if !(self.target_kcal > 0.0) || !self.target_kcal.is_finite() {
            return Err(PlanError::InvalidParameter(format!(
                "target_kcal must be positive, got {}",
                self.target_kcal
            )));
        }
        for (name, range) in [
            ("carb", self.carb_bounds),
            ("protein", self.protein_bounds),
            ("fat", self.fat_bounds),
        ] {
            if !(0.0 <= range.lo && range.lo < range.hi && range.hi <= 1.0) {
                return Err(PlanError::InvalidParameter(format!(
                    "{name} bounds must satisfy 0 <= lo < hi <= 100%, got {:.1}%-{:.1}%",
                    range.lo * 100.0,
                    range.hi * 100.0
                )));
            }
        }
        if self.ga.population < 2 {
            return Err(PlanError::InvalidParameter(
                "population must be at least 2".to_string(),
            ));
        }
        if self.ga.tournament == 0 {
            return Err(PlanError::InvalidParameter(
                "tournament size must be at least 1".to_string(),
            ));
        }
        for (name, rate) in [("cx_rate", self.ga.cx_rate), ("mut_rate", self.ga.mut_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PlanError::InvalidParameter(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        Ok(())
    }
}
