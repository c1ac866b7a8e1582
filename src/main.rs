//! adjudicate -- a stateless JSON bridge to a Diplomacy adjudication engine.
//!
//! This binary reads one request document from stdin, runs one operation
//! against the Python `diplomacy` engine, and writes one response document to
//! stdout. Diagnostics go to stderr.

use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::Parser;

use adjudication_bridge::cli::Cli;
use adjudication_bridge::dispatch::{serve, Bridge};
use adjudication_bridge::engine::PythonEngine;
use adjudication_bridge::telemetry;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = telemetry::initialise(&cli.telemetry_config()) {
        eprintln!("adjudicate: {}", e);
    }

    let config = cli.bridge_config();
    let bridge = Bridge::new(PythonEngine::new(config.python.clone()), &config);

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    match serve(&bridge, io::stdin().lock(), out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("adjudicate: failed to write response: {}", e);
            ExitCode::FAILURE
        }
    }
}
