use super::*;

#[test]
fn test_cli_config_defaults() {
    let config = CliConfig::try_parse_from(["matsvm"]).unwrap();
    assert_eq!(config.mat_path, DEFAULT_MODEL_PATH);
    assert!(!config.manifest);
    assert_eq!(config.verbose, 0);
    assert_eq!(config.output_format, OutputFormat::Text);
    assert_eq!(config.default_log_level(), "warn");
}

#[test]
fn test_cli_config_custom_arguments() {
    let config = CliConfig::try_parse_from(["matsvm", "model.mat", "--manifest", "-vv", "--output-format", "json"]).unwrap();
    assert_eq!(config.mat_path, "model.mat");
    assert!(config.manifest);
    assert_eq!(config.default_log_level(), "debug");
    assert_eq!(config.output_format, OutputFormat::Json);
}

#[test]
fn test_cli_config_rejects_unknown_format() {
    let err = CliConfig::try_parse_from(["matsvm", "--output-format", "tui"]).unwrap_err();
    let err = CliError::from(err);
    assert!(matches!(err, CliError::ArgParseError(_)));
}

#[test]
fn test_cli_config_from_args_reports_parse_errors() {
    let err = CliConfig::from_args(["matsvm", "--output-format", "tui"]).unwrap_err();
    assert!(matches!(err, CliError::ArgParseError(_)));
    assert!(err.to_string().starts_with("Failed to parse command line arguments"));

    let err = CliConfig::from_args(["matsvm", "--help"]).unwrap_err();
    assert!(matches!(&err, CliError::ArgParseError(e) if !e.use_stderr()));
}

#[test]
fn test_cli_config_from_args_validates() {
    assert!(matches!(CliConfig::from_args(["matsvm", "  "]), Err(CliError::MissingArgument(_))));
    let config = CliConfig::from_args(["matsvm", "model.mat", "-v"]).unwrap();
    assert_eq!(config.default_log_level(), "info");
}

#[test]
fn test_cli_config_validate_rejects_blank_path() {
    let config = CliConfig::try_parse_from(["matsvm", "  "]).unwrap();
    assert!(matches!(config.validate(), Err(CliError::MissingArgument(_))));
}

#[test]
fn test_cli_config_validate_rejects_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = CliConfig::try_parse_from(["matsvm", dir.path().to_str().unwrap()]).unwrap();
    assert!(matches!(config.validate(), Err(CliError::FilePathError(_))));
}

#[test]
fn test_cli_config_validate_accepts_missing_file() {
    // Existence is checked when the model is loaded.
    let config = CliConfig::try_parse_from(["matsvm", "/nonexistent/model.mat"]).unwrap();
    assert!(config.validate().is_ok());
}
