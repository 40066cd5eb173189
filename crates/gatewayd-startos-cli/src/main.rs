// crates/gatewayd-startos-cli/src/main.rs
// ============================================================================
// Module: Gatewayd StartOS CLI Entry Point
// Description: Procedure dispatcher invoked by the platform once per operation.
// Purpose: Run get-config and set-config against the service volume.
// Dependencies: clap, gatewayd-startos-config, serde, serde_json, serde_yaml, thiserror, tokio
// ============================================================================

//! ## Overview
//! Each invocation loads settings, installs stderr logging, and runs one
//! command. Procedure results are written to stdout as a
//! `{"result": ...}` / `{"error": ...}` envelope; diagnostics go to stderr.
//!
//! Exit codes: `0` success, `1` procedure or validation failure, `2` settings
//! or usage failure (clap also exits `2` on bad arguments).
//!
//! Security posture: submitted values are untrusted. Inputs are size-capped and
//! masked values are redacted from every report this binary prints.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use gatewayd_startos_cli::effects::VolumeEffects;
use gatewayd_startos_cli::logging;
use gatewayd_startos_cli::logging::LoggingError;
use gatewayd_startos_cli::settings::CliSettings;
use gatewayd_startos_cli::settings::SettingsError;
use gatewayd_startos_config::ConfigSnapshot;
use gatewayd_startos_config::ConfigSpec;
use gatewayd_startos_config::ProcedureOutcome;
use gatewayd_startos_config::SchemaError;
use gatewayd_startos_config::build;
use gatewayd_startos_config::get_config;
use gatewayd_startos_config::json_schema;
use gatewayd_startos_config::set_config;
use gatewayd_startos_config::validate;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use tracing::info;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of submitted or checked configuration input.
const MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Exit code for settings and usage failures.
const EXIT_USAGE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "gatewayd-startos", version, about = "StartOS procedures for the Fedimint gateway")]
struct Cli {
    /// Settings file; overrides `GATEWAYD_STARTOS_SETTINGS`.
    #[arg(long, value_name = "PATH", global = true)]
    settings: Option<PathBuf>,
    /// Command to run.
    #[command(subcommand)]
    command: Commands,
}

/// Supported commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the configuration form and the saved values.
    GetConfig,
    /// Save submitted values and declare dependencies.
    SetConfig(SetConfigCommand),
    /// Print the configuration form.
    Spec,
    /// Print the JSON Schema for saved configurations.
    JsonSchema,
    /// Validate a configuration file against the form.
    Check(CheckCommand),
}

/// Arguments for `set-config`.
#[derive(Args, Debug)]
struct SetConfigCommand {
    /// JSON file with submitted values; stdin when omitted.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Configuration to validate (`.yaml`/`.yml` as YAML, otherwise JSON).
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
}

/// Input encodings accepted by `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl InputFormat {
    /// Picks the format from a file extension.
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failures surfaced on stderr.
#[derive(Debug, Error)]
enum CliError {
    /// Settings could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Logging could not be initialised.
    #[error(transparent)]
    Logging(#[from] LoggingError),
    /// The built-in form is invalid.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),
    /// Input could not be read or decoded.
    #[error("{0}")]
    Input(String),
    /// Output could not be encoded.
    #[error("failed to encode output: {0}")]
    Encode(String),
    /// Writing to an output stream failed.
    #[error("failed to write {stream}: {source}")]
    Output {
        /// Stream name.
        stream: &'static str,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl CliError {
    /// Exit code reported for this failure.
    const fn exit_code(&self) -> u8 {
        match self {
            Self::Settings(_) | Self::Logging(_) => EXIT_USAGE,
            Self::Schema(_) | Self::Input(_) | Self::Encode(_) | Self::Output { .. } => 1,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Bounded read failures.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// I/O failure while reading.
    #[error("{0}")]
    Io(#[from] io::Error),
    /// Input exceeds the limit.
    #[error("input is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Observed size.
        size: u64,
        /// Configured limit.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err),
    }
}

/// Executes the command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let settings = CliSettings::load(cli.settings.as_deref())?;
    logging::init(&settings.logging.filter)?;
    let effects = VolumeEffects::new(settings.volume.root);

    match cli.command {
        Commands::GetConfig => command_get_config(&effects).await,
        Commands::SetConfig(command) => command_set_config(&effects, &command).await,
        Commands::Spec => command_spec(),
        Commands::JsonSchema => command_json_schema(),
        Commands::Check(command) => command_check(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs `get-config`.
async fn command_get_config(effects: &VolumeEffects) -> CliResult<ExitCode> {
    finish_procedure("get-config", get_config(effects).await)
}

/// Runs `set-config`.
async fn command_set_config(
    effects: &VolumeEffects,
    command: &SetConfigCommand,
) -> CliResult<ExitCode> {
    let bytes = match &command.input {
        Some(path) => read_bytes_with_limit(path, MAX_INPUT_BYTES),
        None => read_stdin_with_limit(MAX_INPUT_BYTES),
    }
    .map_err(|err| CliError::Input(format!("failed to read submitted values: {err}")))?;
    let values = parse_snapshot(&bytes, InputFormat::Json)?;
    finish_procedure("set-config", set_config(effects, values).await)
}

/// Runs `spec`.
fn command_spec() -> CliResult<ExitCode> {
    write_json(&build()?)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs `json-schema`.
fn command_json_schema() -> CliResult<ExitCode> {
    write_json(&json_schema(&build()?))?;
    Ok(ExitCode::SUCCESS)
}

/// Runs `check`.
fn command_check(command: &CheckCommand) -> CliResult<ExitCode> {
    let spec = build()?;
    let bytes = read_bytes_with_limit(&command.input, MAX_INPUT_BYTES).map_err(|err| {
        CliError::Input(format!("failed to read {}: {err}", command.input.display()))
    })?;
    let snapshot = parse_snapshot(&bytes, InputFormat::from_path(&command.input))?;
    let report = check_report(&spec, &snapshot);
    let valid = report.get("valid").and_then(Value::as_bool).unwrap_or(false);
    write_json(&report)?;
    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes a procedure envelope and maps the outcome to an exit code.
fn finish_procedure<T: Serialize, E: std::error::Error>(
    procedure: &str,
    result: Result<T, E>,
) -> CliResult<ExitCode> {
    let code = match &result {
        Ok(_) => {
            info!(procedure, "procedure succeeded");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(procedure, error = %err, "procedure failed");
            ExitCode::FAILURE
        }
    };
    write_json(&ProcedureOutcome::from(result))?;
    Ok(code)
}

/// Builds the redacted validation report printed by `check`.
fn check_report(spec: &ConfigSpec, snapshot: &ConfigSnapshot) -> Value {
    let issues = match validate(spec, snapshot) {
        Ok(()) => Vec::new(),
        Err(report) => report.issues,
    };
    json!({
        "valid": issues.is_empty(),
        "issues": issues,
        "config": snapshot.redacted(spec),
    })
}

/// Decodes a snapshot from JSON or YAML bytes.
fn parse_snapshot(bytes: &[u8], format: InputFormat) -> CliResult<ConfigSnapshot> {
    let value: Value = match format {
        InputFormat::Json => serde_json::from_slice(bytes)
            .map_err(|err| CliError::Input(format!("input is not valid json: {err}")))?,
        InputFormat::Yaml => serde_yaml::from_slice(bytes)
            .map_err(|err| CliError::Input(format!("input is not valid yaml: {err}")))?,
    };
    if !value.is_object() {
        return Err(CliError::Input("configuration must be an object".to_string()));
    }
    Ok(ConfigSnapshot::new(value))
}

/// Reads a file, failing closed above `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_limited(file, max_bytes)
}

/// Reads stdin, failing closed above `max_bytes`.
fn read_stdin_with_limit(max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    read_limited(io::stdin().lock(), max_bytes)
}

/// Reads at most `max_bytes + 1` bytes and rejects the overflow.
fn read_limited(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Writes a JSON value followed by a newline to stdout.
fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec(value).map_err(|err| CliError::Encode(err.to_string()))?;
    bytes.push(b'\n');
    let mut stdout = io::stdout().lock();
    stdout.write_all(&bytes).and_then(|()| stdout.flush()).map_err(|source| CliError::Output {
        stream: "stdout",
        source,
    })
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> io::Result<()> {
    let mut stderr = io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns its exit code.
fn emit_error(err: &CliError) -> ExitCode {
    let _ = write_stderr_line(&err.to_string());
    ExitCode::from(err.exit_code())
}
