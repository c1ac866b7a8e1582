//! Request parsing.
//!
//! A request is one JSON object:
//! `{ "op": ..., "game_state": {...}, "orders": {POWER: [...]}, "render": bool }`.
//! Parsing runs in two stages so that a syntax error and a shape error are
//! reported differently.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::BridgeError;
use crate::engine::GameState;

/// The operations the bridge recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    NewGame,
    SetOrdersAndProcess,
    GetPossible,
    GetState,
    RenderMap,
}

/// All operations in protocol order.
pub const ALL_OPS: [Op; 5] = [
    Op::NewGame,
    Op::SetOrdersAndProcess,
    Op::GetPossible,
    Op::GetState,
    Op::RenderMap,
];

impl Op {
    /// Parses an operation name. Names are exact and case-sensitive.
    pub fn parse(name: &str) -> Result<Op, BridgeError> {
        ALL_OPS
            .iter()
            .copied()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| BridgeError::unknown_op(name))
    }

    /// Resolves a request's `op` field. Anything but a recognized name,
    /// including a missing or non-string value, is an unknown op.
    pub fn from_value(value: &Value) -> Result<Op, BridgeError> {
        match value {
            Value::String(name) => Op::parse(name),
            other => Err(BridgeError::unknown_op(other.to_string())),
        }
    }

    /// Returns the wire name of this operation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Op::NewGame => "new_game",
            Op::SetOrdersAndProcess => "set_orders_and_process",
            Op::GetPossible => "get_possible",
            Op::GetState => "get_state",
            Op::RenderMap => "render_map",
        }
    }

    /// Returns true if the operation must be given a `game_state`.
    pub const fn requires_game_state(self) -> bool {
        !matches!(self, Op::NewGame)
    }
}

/// A parsed request.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Operation name, validated at dispatch.
    #[serde(default)]
    pub op: Value,
    /// Serialized game; required by every op except `new_game`.
    #[serde(default)]
    pub game_state: Option<GameState>,
    /// Orders per power name. Absent powers receive no explicit orders.
    #[serde(default)]
    pub orders: Option<BTreeMap<String, Vec<String>>>,
    /// Whether `set_orders_and_process` should also render the new position.
    #[serde(default)]
    pub render: Option<bool>,
}

impl Request {
    /// Parses a raw request document.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InvalidJson` if the text is not JSON, and
    /// `BridgeError::InvalidRequest` if it is JSON of the wrong shape.
    pub fn parse(raw: &str) -> Result<Request, BridgeError> {
        let value: Value = serde_json::from_str(raw).map_err(BridgeError::InvalidJson)?;
        serde_json::from_value(value).map_err(BridgeError::InvalidRequest)
    }

    /// Returns the game state unless it is absent or blank.
    pub fn game_state(&self) -> Option<&GameState> {
        self.game_state.as_ref().filter(|s| !s.is_blank())
    }

    /// Returns the submitted orders, or an empty mapping.
    pub fn orders(&self) -> BTreeMap<String, Vec<String>> {
        self.orders.clone().unwrap_or_default()
    }

    /// Returns whether rendering was requested (default false).
    pub fn render(&self) -> bool {
        self.render.unwrap_or(false)
    }
}
