use thiserror::Error;

/// Domain failures raised while turning a table and a chart configuration
/// into statistics and a chart. I/O failures stay `anyhow` errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EdaError {
    #[error("column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("column '{0}' is not categorical")]
    NotCategorical(String),

    #[error("column '{0}' has no non-missing values")]
    NoValues(String),

    #[error("column '{0}' contains infinite values; its range cannot be binned")]
    NonFinite(String),

    #[error("bar mode needs a numeric column for the bar height; enable Countplot instead")]
    NoYColumn,

    #[error("bin count {0} is outside 5..=100")]
    InvalidBins(usize),

    #[error("failed to render chart: {0}")]
    Render(String),
}
