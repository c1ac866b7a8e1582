//! Engine adapter backed by the Python `diplomacy` package.
//!
//! Each call that needs the engine runs `python3 -c <script>` with one JSON
//! request on stdin and reads one JSON reply from stdout. Loading a game
//! fetches a snapshot (phase, powers, units, centers, history) once; orders
//! are collected in the handle and submitted together when the phase is
//! processed. Possible orders are fetched on first use and cached.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{Engine, EngineError, Game, GameState, PhaseRecord, RenderOptions};

const BRIDGE_SCRIPT: &str = include_str!("diplomacy_bridge.py");

/// Default interpreter looked up on `PATH`.
pub const DEFAULT_PYTHON: &str = "python3";

/// Engine that delegates to the Python `diplomacy` package.
#[derive(Debug, Clone)]
pub struct PythonEngine {
    program: PathBuf,
}

impl Default for PythonEngine {
    fn default() -> Self {
        PythonEngine::new(DEFAULT_PYTHON)
    }
}

impl PythonEngine {
    /// Creates an engine that runs scripts with the given interpreter.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        PythonEngine {
            program: program.into(),
        }
    }

    /// Runs one script call and decodes its value.
    fn invoke<T: DeserializeOwned>(&self, call: &str, args: Value) -> Result<T, EngineError> {
        let mut request = match args {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        request.insert("call".to_string(), Value::from(call));
        let payload = serde_json::to_vec(&request)
            .map_err(|e| EngineError::protocol(format!("failed to encode request: {}", e)))?;

        debug!(call, program = %self.program.display(), bytes = payload.len(), "invoking engine");

        let mut child = Command::new(&self.program)
            .arg("-c")
            .arg(BRIDGE_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::spawn(&e))?;

        // The script reads all of stdin before writing, so writing first is safe.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };

        let output = child.wait_with_output().map_err(|e| EngineError::spawn(&e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(call, status = %output.status, "engine exited abnormally");
            return Err(EngineError::failed(if stderr.is_empty() {
                format!("engine exited with {}", output.status)
            } else {
                stderr
            }));
        }
        written.map_err(|e| EngineError::spawn(&e))?;

        decode_reply(&output.stdout)
    }
}

/// Reply envelope written by the script.
#[derive(Debug, Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Decodes a script reply, turning a raised exception into an `EngineError`.
fn decode_reply<T: DeserializeOwned>(stdout: &[u8]) -> Result<T, EngineError> {
    let reply: Reply = serde_json::from_slice(stdout)
        .map_err(|e| EngineError::protocol(format!("malformed engine reply: {}", e)))?;

    if !reply.ok {
        return Err(EngineError::new(
            reply.kind.unwrap_or_else(|| "EngineError".to_string()),
            reply.message.unwrap_or_default(),
        ));
    }

    serde_json::from_value(reply.value)
        .map_err(|e| EngineError::protocol(format!("unexpected engine reply: {}", e)))
}

/// Snapshot of a loaded game, refreshed after each processed phase.
#[derive(Debug, Clone, Default, Deserialize)]
struct GameView {
    phase: String,
    powers: Vec<String>,
    units: BTreeMap<String, Vec<String>>,
    centers: BTreeMap<String, Vec<String>>,
    done: bool,
    #[serde(default)]
    history: Vec<PhaseRecord>,
}

#[derive(Debug, Deserialize)]
struct Processed {
    state: GameState,
    view: GameView,
}

#[derive(Debug, Clone, Deserialize)]
struct PossibleOrders {
    orderable: BTreeMap<String, Vec<String>>,
    orders: BTreeMap<String, Vec<String>>,
}

/// A game loaded into the Python engine.
pub struct PythonGame {
    engine: PythonEngine,
    state: GameState,
    view: GameView,
    pending: BTreeMap<String, Vec<String>>,
    possible: OnceCell<PossibleOrders>,
}

impl PythonGame {
    fn possible(&self) -> Result<&PossibleOrders, EngineError> {
        self.possible
            .get_or_try_init(|| self.engine.invoke("possible", json!({ "state": &self.state })))
    }

    fn knows(&self, power: &str) -> bool {
        self.view.powers.iter().any(|p| p == power)
    }
}

impl Engine for PythonEngine {
    type Game = PythonGame;

    fn create_initial_state(&self) -> Result<GameState, EngineError> {
        self.invoke("create", json!({}))
    }

    fn deserialize(&self, state: &GameState) -> Result<PythonGame, EngineError> {
        let view: GameView = self.invoke("load", json!({ "state": state }))?;
        Ok(PythonGame {
            engine: self.clone(),
            state: state.clone(),
            view,
            pending: BTreeMap::new(),
            possible: OnceCell::new(),
        })
    }
}

impl Game for PythonGame {
    fn serialize(&self) -> Result<GameState, EngineError> {
        Ok(self.state.clone())
    }

    fn current_phase(&self) -> String {
        self.view.phase.clone()
    }

    fn power_names(&self) -> Vec<String> {
        self.view.powers.clone()
    }

    fn units(&self, power: &str) -> Result<Vec<String>, EngineError> {
        self.view
            .units
            .get(power)
            .cloned()
            .ok_or_else(|| EngineError::unknown_power(power))
    }

    fn centers(&self, power: &str) -> Result<Vec<String>, EngineError> {
        self.view
            .centers
            .get(power)
            .cloned()
            .ok_or_else(|| EngineError::unknown_power(power))
    }

    fn is_done(&self) -> bool {
        self.view.done
    }

    fn set_orders(&mut self, power: &str, orders: &[String]) -> Result<(), EngineError> {
        if !self.knows(power) {
            return Err(EngineError::unknown_power(power));
        }
        self.pending.insert(power.to_string(), orders.to_vec());
        Ok(())
    }

    fn process(&mut self) -> Result<(), EngineError> {
        let processed: Processed = self.engine.invoke(
            "process",
            json!({ "state": &self.state, "orders": &self.pending }),
        )?;
        debug!(from = %self.view.phase, to = %processed.view.phase, "phase processed");
        self.state = processed.state;
        self.view = processed.view;
        self.pending.clear();
        self.possible = OnceCell::new();
        Ok(())
    }

    fn orderable_locations(&self, power: &str) -> Result<Vec<String>, EngineError> {
        self.possible()?
            .orderable
            .get(power)
            .cloned()
            .ok_or_else(|| EngineError::unknown_power(power))
    }

    fn all_possible_orders(&self) -> Result<BTreeMap<String, Vec<String>>, EngineError> {
        Ok(self.possible()?.orders.clone())
    }

    fn phase_history(&self) -> Vec<PhaseRecord> {
        self.view.history.clone()
    }

    fn render(&self, options: &RenderOptions) -> Result<String, EngineError> {
        self.engine.invoke(
            "render",
            json!({ "state": &self.state, "incl_abbrev": options.include_abbreviations }),
        )
    }
}
