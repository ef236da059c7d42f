use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WalkDir Error: {0}")]
    WalkDir(String),

    #[error("Glob Pattern Error: {0}")]
    Glob(String),

    #[error("Chunking Error: {0}")]
    Chunking(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}

impl From<glob::PatternError> for AppError {
    fn from(err: glob::PatternError) -> Self {
        AppError::Glob(format!("Pattern error at {}: {}", err.pos, err.msg))
    }
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::WalkDir(err.to_string())
    }
}

impl AppError {
    /// Process exit code for this error, grouped by failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 1,
            AppError::Io(_)
            | AppError::FileRead { .. }
            | AppError::FileWrite { .. }
            | AppError::WalkDir(_)
            | AppError::Glob(_) => 2,
            AppError::Chunking(_) => 3,
            AppError::InvalidArgument(_) => 5,
        }
    }
}
