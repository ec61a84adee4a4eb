use serde::Serialize;

use crate::models::item::Category;

/// Daily slots: staple, soup, three sides, snack.
pub const SLOTS_PER_DAY: usize = 6;

/// Required category per daily slot, in slot order.
pub const DAY_SLOT_CATEGORIES: [Category; SLOTS_PER_DAY] = [
    Category::Rice,
    Category::Soup,
    Category::Side,
    Category::Side,
    Category::Side,
    Category::Snack,
];

/// Gene group for one day. Each field holds a candidate index whose category
/// matches the slot; the snack slot is `None` on days where no snack is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGenes {
    pub staple: usize,
    pub soup: usize,
    pub sides: [usize; 3],
    pub snack: Option<usize>,
}

impl DayGenes {
    /// Candidate indices served this day. An absent snack contributes nothing.
    pub fn items(&self) -> impl Iterator<Item = usize> {
        [
            self.staple,
            self.soup,
            self.sides[0],
            self.sides[1],
            self.sides[2],
        ]
        .into_iter()
        .chain(self.snack)
    }

    pub fn has_snack(&self) -> bool {
        self.snack.is_some()
    }
}

/// A full multi-day plan: one gene group per day.
///
/// Owned by the population and mutated in place by the genetic operators;
/// the elite carry-over is always a deep clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chromosome {
    pub days: Vec<DayGenes>,
}

impl Chromosome {
    /// All candidate indices in the plan, day by day.
    pub fn item_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.days.iter().flat_map(|d| d.items())
    }
}

/// One rendered row of the final plan table.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDay {
    /// 1-based day index.
    pub day: usize,
    pub rice: String,
    pub soup: String,
    pub side1: String,
    pub side2: String,
    pub side3: String,
    /// `None` when no snack is served that day.
    pub snack: Option<String>,
    pub day_cost: f64,
    pub day_kcal: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    /// Calorie-based macro shares, in percent.
    pub carb_pct_cal: f64,
    pub protein_pct_cal: f64,
    pub fat_pct_cal: f64,
    pub day_pref_sum: f64,
}

/// Macro gram-ratio bounds snapshot, as `[low, high]` fractions.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MacroBoundsSnapshot {
    pub carb: [f64; 2],
    pub protein: [f64; 2],
    pub fat: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub days: usize,
    pub budget_per_day: f64,
    pub target_kcal: f64,
    pub macro_bounds: MacroBoundsSnapshot,
    pub total_cost: f64,
    pub avg_kcal: f64,
    /// False means no plan satisfied every hard constraint and the best
    /// approximation is reported instead. Never an error.
    pub feasible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub days: Vec<PlanDay>,
    pub summary: PlanSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_items_skips_absent_snack() {
        let day = DayGenes {
            staple: 0,
            soup: 1,
            sides: [2, 3, 4],
            snack: None,
        };
        assert_eq!(day.items().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert!(!day.has_snack());
    }

    #[test]
    fn test_day_items_includes_snack() {
        let day = DayGenes {
            staple: 0,
            soup: 1,
            sides: [2, 3, 4],
            snack: Some(9),
        };
        assert_eq!(day.items().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 9]);
    }

    #[test]
    fn test_slot_schema_shape() {
        assert_eq!(DAY_SLOT_CATEGORIES.len(), SLOTS_PER_DAY);
        assert_eq!(
            DAY_SLOT_CATEGORIES
                .iter()
                .filter(|c| **c == Category::Side)
                .count(),
            3
        );
    }
}
