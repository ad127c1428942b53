/*!
 * medex CLI - export media asset manifests to CSV
 */

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use medex::{
    auth::TokenProvider,
    config::{ErrorPolicy, ExportConfig, LogLevel, ManifestMode},
    error::{Result, EXIT_SUCCESS},
    export::run_export,
    logging, CatalogClient,
};

#[derive(Parser)]
#[command(name = "medex")]
#[command(version, about = "Export media asset metadata and published streaming manifests to CSV", long_about = None)]
struct Cli {
    /// Output CSV path
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to config file (default: medex.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-asset failure handling
    #[arg(long = "mode", value_enum)]
    mode: Option<ErrorPolicyArg>,

    /// Manifest extraction strategy
    #[arg(long = "manifest", value_enum)]
    manifest: Option<ManifestModeArg>,

    /// Include a header row in the CSV output
    #[arg(long)]
    header: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_enum)]
    log_level: Option<LogLevelArg>,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ErrorPolicyArg {
    Tolerant,
    Strict,
}

impl From<ErrorPolicyArg> for ErrorPolicy {
    fn from(arg: ErrorPolicyArg) -> Self {
        match arg {
            ErrorPolicyArg::Tolerant => ErrorPolicy::Tolerant,
            ErrorPolicyArg::Strict => ErrorPolicy::Strict,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ManifestModeArg {
    Extracted,
    RawPath,
}

impl From<ManifestModeArg> for ManifestMode {
    fn from(arg: ManifestModeArg) -> Self {
        match arg {
            ManifestModeArg::Extracted => ManifestMode::Extracted,
            ManifestModeArg::RawPath => ManifestMode::RawPath,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

/// Apply CLI arguments on top of file/env configuration
///
/// Flags that were not given on the command line leave the configured
/// values untouched.
fn apply_cli_overrides(config: &mut ExportConfig, cli: &Cli) {
    if let Some(mode) = cli.mode {
        config.error_policy = mode.into();
    }
    if let Some(manifest) = cli.manifest {
        config.manifest_mode = manifest.into();
    }
    if cli.header {
        config.csv_header = true;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    config.verbose = cli.verbose;
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_config = PathBuf::from("medex.toml");
    let mut config = if let Some(ref path) = cli.config {
        ExportConfig::from_file(path)?
    } else if default_config.exists() {
        ExportConfig::from_file(&default_config)?
    } else {
        ExportConfig::default()
    };

    config.apply_env_overrides()?;
    apply_cli_overrides(&mut config, &cli);

    logging::init_logging(&config)?;
    config.validate()?;

    // Token acquisition is the one async step that must settle before any
    // listing starts; the provider caches it for the rest of the run.
    let tokens = TokenProvider::from_config(&config, reqwest::Client::new())?;
    tokens.access_token().await?;
    let client = CatalogClient::from_config(&config, tokens)?;

    run_export(&client, &config, &cli.output).await?;

    Ok(())
}
