pub mod catalog;
pub mod cli;
pub mod error;
pub mod ingest;
pub mod interface;
pub mod models;
pub mod optimizer;
pub mod report;

pub use error::{PlanError, Result};
pub use models::{Candidate, Category, Chromosome, DayGenes, PlanReport};
