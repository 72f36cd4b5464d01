use thiserror::Error;

/// Structural failures that abort a whole call. Data quirks inside a single
/// column never surface here; they degrade that column's statistics instead.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Date pattern '{label}' has an invalid regular expression")]
    InvalidDatePattern {
        label: String,
        #[source]
        source: regex::Error,
    },
    #[error("Info for column '{column}' does not match any info shape")]
    InvalidInfo {
        column: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ProfileResult<T> = Result<T, ProfileError>;
