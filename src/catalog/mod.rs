pub mod affinity;
pub mod builder;

pub use affinity::AffinityIndex;
pub use builder::{build_catalog, Catalog, CategoryPools};
