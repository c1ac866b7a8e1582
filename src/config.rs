//! Bridge configuration.

use std::path::PathBuf;

use crate::engine::python::DEFAULT_PYTHON;
use crate::engine::RenderOptions;
use crate::render::{Neutralization, PostProcessor, DEFAULT_MARKER_WINDOW};

/// Settings for one bridge invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Interpreter used to run the engine script.
    pub python: PathBuf,
    /// What happens to power tint on non-center provinces.
    pub neutralization: Neutralization,
    /// Bytes searched backward from an overlay for its province marker.
    pub marker_window: usize,
    /// Draw province abbreviations when rendering.
    pub include_abbreviations: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            python: PathBuf::from(DEFAULT_PYTHON),
            neutralization: Neutralization::default(),
            marker_window: DEFAULT_MARKER_WINDOW,
            include_abbreviations: true,
        }
    }
}

impl BridgeConfig {
    pub fn post_processor(&self) -> PostProcessor {
        PostProcessor::new(self.neutralization, self.marker_window)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            include_abbreviations: self.include_abbreviations,
        }
    }
}
