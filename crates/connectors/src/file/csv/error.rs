use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Malformed record at line {line}: {reason} (content: '{content}')")]
    MalformedRecord {
        line: u64,
        content: String,
        reason: String,
    },
}
