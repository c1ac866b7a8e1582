//! Response shapes.
//!
//! Every response is `{"ok": true, "result": {...}}` or
//! `{"ok": false, "error": "..."}`; never both, never neither.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::{GameState, PhaseRecord};
use crate::power::Power;

/// Unit or center lists keyed by power.
pub type PowerMap = BTreeMap<Power, Vec<String>>;

/// Current position summary shared by several operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateView {
    pub phase: String,
    pub units: PowerMap,
    pub centers: PowerMap,
    pub is_game_done: bool,
}

/// Result of `new_game`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGameResult {
    pub game_state: GameState,
    pub phase: String,
    pub units: PowerMap,
    pub centers: PowerMap,
}

/// Orders and outcomes of the phase that was just adjudicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderResults {
    pub orders: BTreeMap<String, Vec<String>>,
    pub results: BTreeMap<String, Vec<String>>,
}

impl From<PhaseRecord> for OrderResults {
    fn from(record: PhaseRecord) -> Self {
        OrderResults {
            orders: record.orders,
            results: record.results,
        }
    }
}

/// Result of `set_orders_and_process`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResult {
    pub game_state: GameState,
    #[serde(flatten)]
    pub state: StateView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_results: Option<OrderResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
}

/// Result of `get_possible`: per power, location to legal orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PossibleOrdersResult {
    pub phase: String,
    pub possible_orders: BTreeMap<Power, BTreeMap<String, Vec<String>>>,
}

/// Result of `render_map`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderResult {
    pub svg: String,
    pub phase: String,
}

/// The result payload of a successful operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OpResult {
    NewGame(NewGameResult),
    Processed(ProcessResult),
    Possible(PossibleOrdersResult),
    State(StateView),
    Map(RenderResult),
}

/// The single document written back for every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<OpResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    /// Wraps a successful result.
    pub fn success(result: OpResult) -> Self {
        Response {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// Wraps an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Response {
            ok: false,
            result: None,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Serializes the response as a single-line JSON document.
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            // Result payloads are plain strings, lists, and string-keyed maps.
            Err(e) => format!(
                r#"{{"ok":false,"error":{}}}"#,
                serde_json::Value::from(format!("failed to encode response: {}", e))
            ),
        }
    }
}
