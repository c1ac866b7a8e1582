//! Adjudication engine capability.
//!
//! The bridge never adjudicates. It drives an engine through the two traits
//! below: [`Engine`] creates and loads games, and [`Game`] is a handle to one
//! loaded game. Any implementation that honors these contracts can stand
//! behind the dispatcher; the binary uses [`python::PythonEngine`].

pub mod python;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use python::PythonEngine;

/// Opaque serialized game snapshot.
///
/// Owned and interpreted by the engine; the bridge only carries it between
/// requests and responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameState(Value);

impl GameState {
    /// Wraps a raw JSON value.
    pub fn new(value: Value) -> Self {
        GameState(value)
    }

    /// Returns the wrapped JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns true if the blob carries nothing: null, `{}`, `[]`, `""`, or `false`.
    pub fn is_blank(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            Value::Number(_) => false,
        }
    }
}

/// One entry of a game's phase history.
///
/// `orders` maps power name to the orders submitted that phase; `results`
/// maps unit (e.g. `A PAR`) to the outcome labels the engine recorded for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub name: String,
    #[serde(default)]
    pub orders: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub results: BTreeMap<String, Vec<String>>,
}

/// Options forwarded to the engine's renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw province abbreviations on the map.
    pub include_abbreviations: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            include_abbreviations: true,
        }
    }
}

/// A failure raised by the engine.
///
/// `kind` names the failure category (for the Python engine, the exception
/// class); the display form is `<kind>: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: String,
    pub message: String,
}

impl EngineError {
    /// Creates an error with an explicit category.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// The engine process could not be started.
    pub fn spawn(source: &std::io::Error) -> Self {
        EngineError::new("SpawnError", source.to_string())
    }

    /// The engine exited abnormally without a structured reply.
    pub fn failed(message: impl Into<String>) -> Self {
        EngineError::new("EngineFailed", message)
    }

    /// The engine replied with something the adapter could not decode.
    pub fn protocol(message: impl Into<String>) -> Self {
        EngineError::new("ProtocolError", message)
    }

    /// The named power is not part of the loaded game.
    pub fn unknown_power(power: &str) -> Self {
        EngineError::new("KeyError", format!("'{}'", power))
    }
}

/// Creates and loads games.
pub trait Engine {
    /// Handle to one loaded game.
    type Game: Game;

    /// Returns the serialized standard opening position.
    fn create_initial_state(&self) -> Result<GameState, EngineError>;

    /// Reconstructs a game from a serialized snapshot.
    fn deserialize(&self, state: &GameState) -> Result<Self::Game, EngineError>;
}

/// A loaded game. Lives for one request and is then discarded.
pub trait Game {
    /// Serializes the current game into a snapshot.
    fn serialize(&self) -> Result<GameState, EngineError>;

    /// Label of the active phase, e.g. `S1901M`.
    fn current_phase(&self) -> String;

    /// Power names in the engine's order.
    fn power_names(&self) -> Vec<String>;

    /// Units owned by `power`, e.g. `A PAR`, `F STP/SC`.
    fn units(&self, power: &str) -> Result<Vec<String>, EngineError>;

    /// Supply centers owned by `power`.
    fn centers(&self, power: &str) -> Result<Vec<String>, EngineError>;

    /// True once the game has finished.
    fn is_done(&self) -> bool;

    /// Replaces the pending orders for `power`. Powers never given orders are
    /// resolved by the engine as holds or civil disorder.
    fn set_orders(&mut self, power: &str, orders: &[String]) -> Result<(), EngineError>;

    /// Adjudicates the active phase and advances to the next one, appending
    /// a record of the completed phase to the history.
    fn process(&mut self) -> Result<(), EngineError>;

    /// Locations where `power` may issue an order this phase.
    fn orderable_locations(&self, power: &str) -> Result<Vec<String>, EngineError>;

    /// Every legal order this phase, keyed by location.
    fn all_possible_orders(&self) -> Result<BTreeMap<String, Vec<String>>, EngineError>;

    /// Recorded phases, oldest first. May include the active phase.
    fn phase_history(&self) -> Vec<PhaseRecord>;

    /// Renders the current position as SVG markup.
    fn render(&self, options: &RenderOptions) -> Result<String, EngineError>;
}
