pub mod render;

pub use render::{display_catalog_summary, display_plan};
