use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Error when parsing command line arguments
    #[error("Failed to parse command line arguments: {0}")]
    ArgParseError(#[from] clap::Error),

    /// The model path cannot name a MAT-file
    #[error("File path error: {0}")]
    FilePathError(String),

    /// Error when required argument is missing or blank
    #[error("Missing required argument: {0}")]
    MissingArgument(String),
}

impl CliError {
    pub fn file_path_error(path: impl Into<String>) -> Self {
        Self::FilePathError(path.into())
    }

    pub fn missing_argument(arg: impl Into<String>) -> Self {
        Self::MissingArgument(arg.into())
    }
}
