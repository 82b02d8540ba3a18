use std::path::Path;

use clap::Parser;

use super::error::CliError;
use crate::model::DEFAULT_MODEL_PATH;

/// Command-line interface configuration for the matsvm inspector
#[derive(Debug, Parser)]
#[command(name = "matsvm")]
#[command(about = "Extract polynomial SVM parameters from a MATLAB MAT-file", long_about = None)]
pub struct CliConfig {
    /// Path to the MAT-file written by saveLearnerForCoder
    #[arg(value_name = "MAT_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub mat_path: String,

    /// Print the variable listing (name, shape, class) before extracting
    #[arg(long)]
    pub manifest: bool,

    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format (text, json, none)
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Predictor names and their element type (default)
    Text,
    /// Every extracted parameter as JSON
    Json,
    /// Nothing on stdout
    None,
}

impl CliConfig {
    /// Parse `args` (program name first) and validate the result.
    pub fn from_args<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Self::try_parse_from(args)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the model path can be a file before anything is opened.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.mat_path.trim().is_empty() {
            return Err(CliError::missing_argument("MAT_PATH"));
        }
        if Path::new(&self.mat_path).is_dir() {
            return Err(CliError::file_path_error(format!("{} is a directory", self.mat_path)));
        }
        Ok(())
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
