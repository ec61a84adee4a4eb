pub mod columns;
pub mod tables;

pub use columns::{parse_number, require_column, resolve_column};
pub use tables::{
    read_affinity_table, read_category_table, read_cost_table, read_nutrition_table,
    read_preference_table, AffinityRow, CategoryRow, CostRow, NutritionRow, PreferenceRow,
};
