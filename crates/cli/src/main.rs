// fieldrisk CLI - field observation CSVs in, risk summary and advice out

mod exit_codes;
mod logging;
mod output;
mod util;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use fieldrisk_analysis_client::AnalysisClient;
use fieldrisk_config::{ConfigError, Settings};
use fieldrisk_io::IngestOptions;
use fieldrisk_recon::{AnalysisError, LocalScorer, Session};

use exit_codes::{analysis_exit_code, EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "fieldrisk")]
#[command(about = "Normalize field observation CSVs and reconcile crop risk analysis")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug logging on stderr (FIELDRISK_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Config file [default: <config dir>/fieldrisk/config.toml]
    #[arg(long, global = true, env = "FIELDRISK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV and print the canonical field records
    #[command(after_help = "\
Examples:
  fieldrisk preview fields.csv
  fieldrisk preview fields.csv --json
  fieldrisk preview export.txt --delimiter ';'")]
    Preview {
        /// Field observation CSV
        file: PathBuf,

        /// Print records as a JSON array
        #[arg(long)]
        json: bool,

        /// Column delimiter [default: detected]
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Send the records for analysis and print the risk summary
    #[command(after_help = "\
Examples:
  fieldrisk analyze fields.csv
  fieldrisk analyze fields.csv --select F-002
  fieldrisk analyze fields.csv --url https://flows.example/webhook/field-analysis
  fieldrisk analyze fields.csv --offline --json

The first analysed field is selected unless --select names another.")]
    Analyze {
        /// Field observation CSV
        file: PathBuf,

        /// Field id whose advice to show
        #[arg(long)]
        select: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Score locally instead of calling the analysis service
        #[arg(long, conflicts_with_all = ["url", "timeout"])]
        offline: bool,

        /// Analysis service URL (overrides config and FIELDRISK_ANALYSIS_URL)
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds, 0 for none
        #[arg(long)]
        timeout: Option<u64>,

        /// Column delimiter [default: detected]
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Score the records locally and print the risk summary
    Score {
        /// Field observation CSV
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Column delimiter [default: detected]
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings as TOML
    Show,
    /// Print the default config file path
    Path,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("fieldrisk {}", env!("CARGO_PKG_VERSION"));

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Preview { file, json, delimiter } => cmd_preview(&file, json, delimiter),
        Commands::Analyze { file, select, json, offline, url, timeout, delimiter } => {
            let target = if offline {
                Target::Offline
            } else {
                Target::Remote { config, url, timeout }
            };
            cmd_analyze(&file, target, select, json, delimiter)
        }
        Commands::Score { file, json, delimiter } => cmd_score(&file, json, delimiter),
        Commands::Config(ConfigCommands::Show) => cmd_config_show(config),
        Commands::Config(ConfigCommands::Path) => cmd_config_path(),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::InvalidValue { .. } => None,
            _ => Some(format!(
                "fix or remove the file; defaults apply when {} is absent",
                Settings::config_path_display()
            )),
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }

    /// Create error from an analysis error with proper exit code.
    pub fn analysis(err: AnalysisError) -> Self {
        let code = analysis_exit_code(&err);
        let hint = match &err {
            AnalysisError::Remote { status: None, .. } => {
                Some("is the analysis service running? set FIELDRISK_ANALYSIS_URL, or use --offline".to_string())
            }
            AnalysisError::ResponseShape { raw: Some(_), .. } => {
                Some("run with --verbose to log the raw reply".to_string())
            }
            _ => None,
        };
        if let Some(raw) = err.raw_response() {
            log::debug!("raw analysis reply: {}", raw);
        }
        Self { code, message: err.message(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

enum Target<'a> {
    Offline,
    Remote { config: Option<&'a Path>, url: Option<String>, timeout: Option<u64> },
}

fn ingest_options(delimiter: Option<char>) -> Result<IngestOptions, CliError> {
    let delimiter = match delimiter {
        None => None,
        Some(c) if c.is_ascii() && !c.is_ascii_alphanumeric() && c != '"' => Some(c as u8),
        Some(c) => {
            return Err(CliError::usage(format!("invalid delimiter '{}'", c))
                .with_hint("use a single ASCII punctuation character, e.g. ',' ';' '|' or a tab"))
        }
    };
    Ok(IngestOptions { delimiter })
}

fn write_stdout(text: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .and_then(|_| if text.ends_with('\n') { Ok(()) } else { handle.write_all(b"\n") })
        .map_err(|e| CliError::io(e.to_string()))
}

fn json_text(result: Result<String, serde_json::Error>) -> Result<String, CliError> {
    result.map_err(|e| CliError::io(format!("cannot encode JSON output: {}", e)))
}

// ============================================================================
// preview
// ============================================================================

fn cmd_preview(file: &Path, json: bool, delimiter: Option<char>) -> Result<(), CliError> {
    let opts = ingest_options(delimiter)?;
    let records = fieldrisk_io::read_fields(file, &opts)
        .map_err(|e| CliError::analysis(AnalysisError::Parse(e)))?;

    let dupes = fieldrisk_io::duplicate_field_ids(&records);
    if !dupes.is_empty() {
        log::warn!("duplicate field_id value(s): {}", dupes.join(", "));
    }

    if json {
        write_stdout(&json_text(output::records_json(&records))?)
    } else {
        write_stdout(&output::records_table(&records))
    }
}

// ============================================================================
// analyze / score
// ============================================================================

fn cmd_analyze(
    file: &Path,
    target: Target<'_>,
    select: Option<String>,
    json: bool,
    delimiter: Option<char>,
) -> Result<(), CliError> {
    let opts = ingest_options(delimiter)?;

    let mut session = Session::new();
    session.load_file(file, &opts).map_err(CliError::analysis)?;

    match target {
        Target::Offline => session.run(&LocalScorer),
        Target::Remote { config, url, timeout } => {
            let mut settings = Settings::load(config).map_err(CliError::config)?;
            if let Some(url) = url {
                settings.analysis_url = url;
            }
            if let Some(secs) = timeout {
                settings.timeout_secs = secs;
            }
            log::info!("analysis service: {}", settings.analysis_url);
            let client = AnalysisClient::from_settings(&settings)
                .map_err(|e| CliError::analysis(e.into()))?;
            session.run(&client)
        }
    }
    .map_err(CliError::analysis)?;

    if let Some(id) = select {
        session.select(id);
    }

    if json {
        write_stdout(&json_text(output::analysis_json(&session, true))?)
    } else {
        write_stdout(&output::analysis_table(&session, true))
    }
}

fn cmd_score(file: &Path, json: bool, delimiter: Option<char>) -> Result<(), CliError> {
    let opts = ingest_options(delimiter)?;

    let mut session = Session::new();
    session.load_file(file, &opts).map_err(CliError::analysis)?;
    session.run(&LocalScorer).map_err(CliError::analysis)?;

    if json {
        write_stdout(&json_text(output::analysis_json(&session, false))?)
    } else {
        write_stdout(&output::analysis_table(&session, false))
    }
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_show(config: Option<&Path>) -> Result<(), CliError> {
    let settings = Settings::load(config).map_err(CliError::config)?;
    let rendered = settings.to_toml().map_err(CliError::config)?;
    write_stdout(&rendered)
}

fn cmd_config_path() -> Result<(), CliError> {
    write_stdout(&Settings::config_path_display())
}
