//! Dcnet - DC network solver
//!
//! Reads a JSON solve request and prints the JSON result.
//!
//! # Usage
//!
//! ```bash
//! dcnet request.json
//! dcnet request.json --port out --pretty
//! ```

use std::path::PathBuf;

use clap::Parser;
use dcnet_core::{error::Result, DcError, Port, SolveRequest, SolverConfig};

/// DC operating point and Thevenin solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the solve request (.json)
    #[arg(value_name = "REQUEST_FILE")]
    request_file: PathBuf,

    /// Thevenin port positive net (overrides any port in the request)
    #[arg(long)]
    port: Option<String>,

    /// Thevenin port negative net (defaults to ground)
    #[arg(long, requires = "port")]
    port_negative: Option<String>,

    /// Resistance placed across the port for the short-circuit run
    #[arg(long)]
    short_resistance: Option<f64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let content = std::fs::read_to_string(&args.request_file).map_err(|e| DcError::FileReadError {
        path: args.request_file.display().to_string(),
        source: e,
    })?;

    let mut request: SolveRequest = serde_json::from_str(&content)?;
    request.ensure_nets();
    if let Some(positive) = args.port {
        request.port = Some(Port {
            positive,
            negative: args.port_negative,
        });
    }

    let mut config = SolverConfig::new();
    if let Some(ohms) = args.short_resistance {
        config = config.with_short_resistance(ohms);
    }

    let analysis = request.run(&config)?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };
    println!("{output}");

    Ok(())
}
