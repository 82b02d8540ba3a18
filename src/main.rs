use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use matsvm::{
    cli::{CliConfig, CliError, OutputFormat},
    model::{PolySvmParams, load_model},
};

fn main() -> Result<()> {
    let config = match CliConfig::from_args(std::env::args_os()) {
        Ok(config) => config,
        // --help and --version
        Err(CliError::ArgParseError(e)) if !e.use_stderr() => e.exit(),
        Err(e) => return Err(e.into()),
    };

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let model = load_model(&config.mat_path).with_context(|| format!("failed to load model from {}", config.mat_path))?;

    if config.manifest {
        for variable in &model.manifest {
            println!("{variable}");
        }
    }

    let parameters = model.parameters()?;
    let params = PolySvmParams::extract(parameters).context("failed to extract SVM parameters")?;
    if let Err(e) = params.validate() {
        tracing::warn!("model parameters are inconsistent: {e}");
    }

    match config.output_format {
        OutputFormat::Text => {
            println!("{}", params.predictor_names);
            println!("{}", params.predictor_names.element_type());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        OutputFormat::None => {}
    }

    Ok(())
}
