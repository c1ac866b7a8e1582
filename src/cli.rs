//! Command-line surface of the `adjudicate` binary.
//!
//! The binary reads one request on stdin and writes one response on stdout;
//! flags only tune how it gets there. Every flag has an environment fallback
//! so hosts that spawn the bridge can configure it without changing argv.

use std::path::PathBuf;

use clap::Parser;

use crate::config::BridgeConfig;
use crate::render::{Neutralization, DEFAULT_MARKER_WINDOW};
use crate::telemetry::{LogFormat, TelemetryConfig, DEFAULT_LOG_FILTER};

/// Stateless JSON bridge to a Diplomacy adjudication engine.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "adjudicate", version)]
pub struct Cli {
    /// Python interpreter with the `diplomacy` package installed.
    #[arg(long, env = "ADJUDICATE_PYTHON", default_value = "python3")]
    pub python: PathBuf,

    /// How tint on non-center provinces is neutralized: `remove` or `recolor`.
    #[arg(long = "neutralize", env = "ADJUDICATE_NEUTRALIZE", default_value_t = Neutralization::Remove)]
    pub neutralization: Neutralization,

    /// Bytes searched backward from an overlay for its province marker.
    #[arg(long, env = "ADJUDICATE_MARKER_WINDOW", default_value_t = DEFAULT_MARKER_WINDOW)]
    pub marker_window: usize,

    /// Omit province abbreviations from rendered maps.
    #[arg(long, env = "ADJUDICATE_NO_ABBREV")]
    pub no_abbrev: bool,

    /// Log filter directives, e.g. `adjudication_bridge=debug`.
    #[arg(long, env = "ADJUDICATE_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log line format on stderr.
    #[arg(long, env = "ADJUDICATE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            python: self.python.clone(),
            neutralization: self.neutralization,
            marker_window: self.marker_window,
            include_abbreviations: !self.no_abbrev,
        }
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            filter: self.log_filter.clone(),
            format: self.log_format,
        }
    }
}
