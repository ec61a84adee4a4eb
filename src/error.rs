use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no column matching {wanted:?} among headers {found:?}")]
    MissingColumn {
        wanted: Vec<&'static str>,
        found: Vec<String>,
    },

    #[error("no candidates in required categories: {0:?}")]
    MissingCategories(Vec<String>),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("catalog is empty after merging input tables")]
    EmptyCatalog,
}

pub type Result<T> = std::result::Result<T, PlanError>;
