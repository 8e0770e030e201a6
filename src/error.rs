//! Error types for the cytofreq library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum FreqError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input shape error: {0}")]
    InputShape(String),

    #[error("Missing required column '{logical}' (accepted names: {aliases})")]
    MissingColumn { logical: String, aliases: String },

    #[error("Sample '{sample}' is missing populations: {missing}")]
    MissingPopulation { sample: String, missing: String },

    #[error("Unknown population '{0}'")]
    UnknownPopulation(String),

    #[error("No metadata for sample '{0}'")]
    UnknownSample(String),

    #[error("Duplicate count record for sample '{sample}', population '{population}'")]
    DuplicateRecord { sample: String, population: String },

    #[error("Subject '{subject}' has conflicting values for '{attribute}'")]
    InconsistentSubject { subject: String, attribute: String },

    #[error("Unknown cohort attribute '{0}'")]
    UnknownAttribute(String),

    #[error("Invalid count value '{value}' at row {row}, column '{column}'")]
    InvalidCount {
        value: String,
        row: usize,
        column: String,
    },

    #[error("Total count of sample '{sample}' exceeds the supported range")]
    CountOverflow { sample: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FreqError {
    /// Whether this error means the upstream row set does not have the
    /// expected shape (missing columns, populations, or samples).
    pub fn is_input_shape(&self) -> bool {
        matches!(
            self,
            FreqError::InputShape(_)
                | FreqError::MissingColumn { .. }
                | FreqError::MissingPopulation { .. }
                | FreqError::UnknownPopulation(_)
                | FreqError::UnknownSample(_)
                | FreqError::DuplicateRecord { .. }
                | FreqError::InconsistentSubject { .. }
                | FreqError::UnknownAttribute(_)
        )
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, FreqError>;
