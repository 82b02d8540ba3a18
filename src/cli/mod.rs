//! Command-line parsing and configuration for the matsvm binary

pub mod config;
pub mod error;

pub use config::{CliConfig, OutputFormat};
pub use error::CliError;
