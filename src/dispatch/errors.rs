//! Dispatch failures.
//!
//! The display form of every variant is the exact `error` string written to
//! the caller.

use thiserror::Error;

use crate::engine::EngineError;

/// Any failure that ends a request with `{"ok": false}`.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The input is not JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The input is JSON but not a request object.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    /// The input could not be read.
    #[error("Invalid request: {0}")]
    Unreadable(#[source] std::io::Error),

    #[error("Unknown op: {0}")]
    UnknownOp(String),

    #[error("Missing game_state")]
    MissingGameState,

    /// An order key or engine power name outside the seven powers.
    #[error("Unknown power: {0}")]
    UnknownPower(String),

    /// The engine raised an error; displayed as `<kind>: <message>`.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// An engine call panicked.
    #[error("EnginePanic: {0}")]
    Panicked(String),
}

impl BridgeError {
    pub fn unknown_op(name: impl Into<String>) -> Self {
        BridgeError::UnknownOp(name.into())
    }

    pub fn unknown_power(name: impl Into<String>) -> Self {
        BridgeError::UnknownPower(name.into())
    }

    /// Builds a [`BridgeError::Panicked`] from a caught panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        BridgeError::Panicked(message)
    }

    /// Short category name used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            BridgeError::InvalidJson(_)
            | BridgeError::InvalidRequest(_)
            | BridgeError::Unreadable(_) => "malformed",
            BridgeError::UnknownOp(_) => "unknown_op",
            BridgeError::MissingGameState => "missing_field",
            BridgeError::UnknownPower(_) => "unknown_power",
            BridgeError::Engine(_) | BridgeError::Panicked(_) => "engine",
        }
    }
}
