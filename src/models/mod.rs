pub mod item;
pub mod plan;

pub use item::{normalize_key, Candidate, Category, Micro, MICRO_COUNT};
pub use plan::{
    Chromosome, DayGenes, MacroBoundsSnapshot, PlanDay, PlanReport, PlanSummary,
    DAY_SLOT_CATEGORIES, SLOTS_PER_DAY,
};
