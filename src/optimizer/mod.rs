pub mod config;
pub mod fitness;
pub mod init;
pub mod metrics;
pub mod search;

pub use config::{GaParams, MacroRange, PlannerConfig, Weights};
pub use fitness::{fitness, is_feasible_plan, plan_cost, violates_repeat_limits, HARD_FAIL_FITNESS};
pub use init::init_population;
pub use metrics::{day_metrics, is_feasible_day, DayMetrics};
pub use search::{crossover_days, mutate, run_search, SearchOutcome};
