use thiserror::Error;

pub type IngestResult<T> = Result<T, IngestError>;
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Fatal outcomes of one stock-sheet ingestion run.
///
/// Row indices are 0-based sheet positions; messages report the 1-based
/// sheet row a person would see in a spreadsheet application.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("Failed to open or parse workbook: {0}")]
    Load(String),

    #[error("Missing party name before row {} (index {row})", .row + 1)]
    MissingParty { row: usize },

    #[error("Missing '{field}' at row {} (index {row})", .row + 1)]
    RowValidation { row: usize, field: &'static str },

    #[error("No valid stock records found in the file")]
    EmptyResult,
}

impl IngestError {
    /// Sheet row index the error refers to, if any.
    pub fn row(&self) -> Option<usize> {
        match self {
            IngestError::MissingParty { row } | IngestError::RowValidation { row, .. } => {
                Some(*row)
            }
            IngestError::Load(_) | IngestError::EmptyResult => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<rust_xlsxwriter::XlsxError> for LedgerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        LedgerError::Export(err.to_string())
    }
}
