//! walsift CLI
//!
//! Recovers and decodes a WAL block embedded as a hex dump in a server log.
//!
//! The core is handed already-read text and a stdout sink; this binary owns
//! all I/O. Diagnostics and tracing go to stderr so stdout stays clean for
//! `--format json` consumers.

use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use walsift_core::{decode_log_text, DecodeOptions};

/// Recover and decode WAL hex dumps embedded in server logs.
#[derive(Parser)]
#[command(name = "walsift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log file to scan; `-` or absent reads stdin
    input: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Maximum number of records to decode
    #[arg(short, long)]
    limit: Option<usize>,

    /// Cap on input bytes scanned
    #[arg(long)]
    max_input_bytes: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let input = match read_input(cli.input.as_deref()) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("walsift: {err}");
            return ExitCode::from(2);
        }
    };
    debug!(bytes = input.len(), "read input");

    let mut options = DecodeOptions::new();
    if let Some(limit) = cli.limit {
        options = options.max_records(limit);
    }
    if let Some(cap) = cli.max_input_bytes {
        options = options.max_input_bytes(cap);
    }

    let report = decode_log_text(&input, &options);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let rendered = match cli.format.as_str() {
        "json" => match serde_json::to_string_pretty(&report) {
            Ok(json) => writeln!(out, "{json}"),
            Err(err) => {
                eprintln!("walsift: {err}");
                return ExitCode::from(2);
            }
        },
        _ => report.render_text(&mut out),
    };
    if let Err(err) = rendered {
        eprintln!("walsift: {err}");
        return ExitCode::from(2);
    }

    if report.recovered() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Reads the input log, tolerating non-UTF-8 bytes.
///
/// Damaged logs are this tool's normal diet; invalid sequences are replaced
/// rather than refused.
fn read_input(path: Option<&Path>) -> io::Result<String> {
    let bytes = match path {
        Some(p) if p != Path::new("-") => fs::read(p)?,
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
