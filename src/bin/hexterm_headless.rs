//! Hexterm Headless Runner
//!
//! Reads a terminal output stream from stdin or a file, runs it through the
//! emulated terminal and prints the resulting state, the token stream or its
//! canonical re-encoding.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hexterm::config::{ConfigError, TerminalConfig};
use hexterm::parser::{serialize, tokenize};
use hexterm::terminal::Terminal;

#[derive(Parser, Debug)]
#[command(name = "hexterm-headless")]
#[command(version)]
#[command(about = "Run an escape-sequence stream through an emulated terminal", long_about = None)]
struct CliArgs {
    /// Input file (stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to a JSON config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Grid columns (overrides config)
    #[arg(long, value_name = "COLS")]
    cols: Option<usize>,

    /// Grid rows (overrides config)
    #[arg(long, value_name = "ROWS")]
    rows: Option<usize>,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full snapshot as JSON
    Json,
    /// Cursor position and screen text
    Text,
    /// One JSON token per line
    Tokens,
    /// Canonical re-encoding of the input. Invalid UTF-8 comes out as U+FFFD.
    Canonical,
}

#[derive(Debug, thiserror::Error)]
enum HeadlessError {
    #[error("reading {what}: {source}")]
    Input {
        what: String,
        #[source]
        source: io::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("writing output: {0}")]
    Output(#[from] io::Error),
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &CliArgs) -> Result<TerminalConfig, HeadlessError> {
    let mut config = match &args.config {
        Some(path) => TerminalConfig::load(path)?,
        None => TerminalConfig::load_or_default(),
    };
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    config.validate()?;
    Ok(config)
}

fn read_input(args: &CliArgs) -> Result<Vec<u8>, HeadlessError> {
    match &args.input {
        Some(path) => std::fs::read(path).map_err(|source| HeadlessError::Input {
            what: path.display().to_string(),
            source,
        }),
        None => {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .map_err(|source| HeadlessError::Input {
                    what: "stdin".to_string(),
                    source,
                })?;
            Ok(data)
        }
    }
}

fn run(args: &CliArgs) -> Result<(), HeadlessError> {
    let config = load_config(args)?;
    let input = read_input(args)?;
    let text = String::from_utf8_lossy(&input);
    if let Err(err) = std::str::from_utf8(&input) {
        tracing::warn!(
            offset = err.valid_up_to(),
            "input is not valid UTF-8, replacing invalid bytes"
        );
    }
    let tokens = tokenize(&text);
    tracing::debug!(bytes = input.len(), tokens = tokens.len(), "input tokenized");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.format {
        OutputFormat::Tokens => {
            for token in &tokens {
                writeln!(out, "{}", serde_json::to_string(token)?)?;
            }
        }
        OutputFormat::Canonical => {
            out.write_all(serialize(&tokens).as_bytes())?;
        }
        OutputFormat::Json | OutputFormat::Text => {
            let mut terminal = Terminal::with_config(&config);
            terminal.apply(&tokens);
            for event in terminal.take_events() {
                tracing::debug!(?event, "terminal event");
            }

            let snapshot = terminal.snapshot();
            if args.format == OutputFormat::Json {
                writeln!(out, "{}", snapshot.to_json()?)?;
            } else {
                writeln!(out, "Terminal State ({}x{}):", snapshot.cols, snapshot.rows)?;
                writeln!(out, "Cursor: ({}, {})", snapshot.cursor.row, snapshot.cursor.col)?;
                if !snapshot.title.is_empty() {
                    writeln!(out, "Title: {}", snapshot.title)?;
                }
                writeln!(out, "---")?;
                out.write_all(snapshot.to_text().as_bytes())?;
                writeln!(out, "---")?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
