/// Failure to obtain or decode the corridor dataset.
///
/// Cloneable so one in-flight load can report the same outcome to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to fetch corridor data: {0}")]
    Fetch(String),
    #[error("corridor data is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("malformed corridor row {row}: {reason}")]
    Malformed { row: usize, reason: String },
    #[error("corridor data is not valid JSON: {0}")]
    Json(String),
    #[error("corridor data contains no rows")]
    Empty,
}
