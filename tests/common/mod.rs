//! Deterministic in-process engine for integration tests.
//!
//! Models just enough of a game to exercise the bridge: the standard opening
//! position, literal move application (no conflicts), a S/F/W phase cycle,
//! autumn center capture, per-phase history, and a renderer that tints every
//! province a power has ever occupied.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

use adjudication_bridge::config::BridgeConfig;
use adjudication_bridge::dispatch::{serve, Bridge};
use adjudication_bridge::engine::{
    Engine, EngineError, Game, GameState, PhaseRecord, RenderOptions,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUPPLY_CENTERS: [&str; 34] = [
    "ANK", "BEL", "BER", "BRE", "BUD", "BUL", "CON", "DEN", "EDI", "GRE", "HOL", "KIE", "LON",
    "LVP", "MAR", "MOS", "MUN", "NAP", "NWY", "PAR", "POR", "ROM", "RUM", "SER", "SEV", "SMY",
    "SPA", "STP", "SWE", "TRI", "TUN", "VEN", "VIE", "WAR",
];

const OPENING: [(&str, &[&str], &[&str]); 7] = [
    ("AUSTRIA", &["A BUD", "A VIE", "F TRI"], &["BUD", "TRI", "VIE"]),
    ("ENGLAND", &["F EDI", "F LON", "A LVP"], &["EDI", "LON", "LVP"]),
    ("FRANCE", &["F BRE", "A MAR", "A PAR"], &["BRE", "MAR", "PAR"]),
    ("GERMANY", &["F KIE", "A BER", "A MUN"], &["BER", "KIE", "MUN"]),
    ("ITALY", &["F NAP", "A ROM", "A VEN"], &["NAP", "ROM", "VEN"]),
    ("RUSSIA", &["A WAR", "A MOS", "F SEV", "F STP/SC"], &["MOS", "SEV", "STP", "WAR"]),
    ("TURKEY", &["F ANK", "A CON", "A SMY"], &["ANK", "CON", "SMY"]),
];

/// Serialized form of a stub game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubState {
    pub phase: String,
    pub units: BTreeMap<String, Vec<String>>,
    pub centers: BTreeMap<String, Vec<String>>,
    pub influence: BTreeMap<String, BTreeSet<String>>,
    pub history: Vec<PhaseRecord>,
    pub done: bool,
}

impl StubState {
    pub fn opening() -> Self {
        let mut state = StubState {
            phase: "S1901M".to_string(),
            units: BTreeMap::new(),
            centers: BTreeMap::new(),
            influence: BTreeMap::new(),
            history: Vec::new(),
            done: false,
        };
        for (power, units, centers) in OPENING {
            let units: Vec<String> = units.iter().map(|u| u.to_string()).collect();
            let influence = units.iter().map(|u| province(u)).collect();
            state.units.insert(power.to_string(), units);
            state.centers.insert(power.to_string(), centers.iter().map(|c| c.to_string()).collect());
            state.influence.insert(power.to_string(), influence);
        }
        state
    }

    pub fn into_game_state(self) -> GameState {
        GameState::new(serde_json::to_value(self).unwrap())
    }
}

/// Province code of a unit (`A PAR`, `F STP/SC`).
fn province(unit: &str) -> String {
    unit.get(2..5).unwrap_or_default().to_string()
}

fn next_phase(phase: &str) -> String {
    let year: u32 = phase.get(1..5).and_then(|y| y.parse().ok()).unwrap_or(1901);
    match phase.chars().next() {
        Some('S') => format!("F{}M", year),
        Some('F') => format!("W{}A", year),
        _ => format!("S{}M", year + 1),
    }
}

/// Failure switches for the stub.
#[derive(Debug, Clone, Default)]
pub struct StubEngine {
    pub extra_power: Option<String>,
    pub panic_on_process: bool,
    pub fail_render: bool,
}

impl StubEngine {
    pub fn with_extra_power(name: &str) -> Self {
        StubEngine {
            extra_power: Some(name.to_string()),
            ..StubEngine::default()
        }
    }
}

impl Engine for StubEngine {
    type Game = StubGame;

    fn create_initial_state(&self) -> Result<GameState, EngineError> {
        Ok(StubState::opening().into_game_state())
    }

    fn deserialize(&self, state: &GameState) -> Result<StubGame, EngineError> {
        let state: StubState = serde_json::from_value(state.as_value().clone())
            .map_err(|e| EngineError::new("ValueError", format!("not a saved game: {}", e)))?;
        Ok(StubGame {
            config: self.clone(),
            state,
            pending: BTreeMap::new(),
        })
    }
}

pub struct StubGame {
    config: StubEngine,
    state: StubState,
    pending: BTreeMap<String, Vec<String>>,
}

impl StubGame {
    fn lookup<'a>(
        map: &'a BTreeMap<String, Vec<String>>,
        power: &str,
    ) -> Result<&'a Vec<String>, EngineError> {
        map.get(power).ok_or_else(|| EngineError::unknown_power(power))
    }
}

impl Game for StubGame {
    fn serialize(&self) -> Result<GameState, EngineError> {
        serde_json::to_value(&self.state)
            .map(GameState::new)
            .map_err(|e| EngineError::protocol(e.to_string()))
    }

    fn current_phase(&self) -> String {
        self.state.phase.clone()
    }

    fn power_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.units.keys().cloned().collect();
        names.extend(self.config.extra_power.clone());
        names
    }

    fn units(&self, power: &str) -> Result<Vec<String>, EngineError> {
        Self::lookup(&self.state.units, power).cloned()
    }

    fn centers(&self, power: &str) -> Result<Vec<String>, EngineError> {
        Self::lookup(&self.state.centers, power).cloned()
    }

    fn is_done(&self) -> bool {
        self.state.done
    }

    fn set_orders(&mut self, power: &str, orders: &[String]) -> Result<(), EngineError> {
        let units = Self::lookup(&self.state.units, power)?;
        for order in orders {
            let known = units.iter().any(|u| order.starts_with(&format!("{} ", u)));
            if !known {
                return Err(EngineError::new("ValueError", format!("invalid order '{}'", order)));
            }
        }
        self.pending.insert(power.to_string(), orders.to_vec());
        Ok(())
    }

    fn process(&mut self) -> Result<(), EngineError> {
        if self.config.panic_on_process {
            panic!("stub adjudicator exploded");
        }

        let mut results = BTreeMap::new();
        for (power, orders) in &self.pending {
            let Some(units) = self.state.units.get_mut(power) else {
                continue;
            };
            for order in orders {
                let Some((unit, dest)) = order.split_once(" - ") else {
                    continue;
                };
                if let Some(slot) = units.iter_mut().find(|u| u.as_str() == unit) {
                    *slot = format!("{} {}", &unit[..1], dest);
                    self.state
                        .influence
                        .entry(power.clone())
                        .or_default()
                        .insert(dest.get(..3).unwrap_or(dest).to_string());
                }
                results.insert(unit.to_string(), Vec::new());
            }
        }

        if self.state.phase.starts_with('F') {
            for (power, units) in &self.state.units {
                for unit in units {
                    let code = province(unit);
                    if !SUPPLY_CENTERS.contains(&code.as_str()) {
                        continue;
                    }
                    for centers in self.state.centers.values_mut() {
                        centers.retain(|c| c != &code);
                    }
                    if let Some(centers) = self.state.centers.get_mut(power) {
                        centers.push(code);
                    }
                }
            }
        }

        self.state.history.push(PhaseRecord {
            name: self.state.phase.clone(),
            orders: std::mem::take(&mut self.pending),
            results,
        });
        self.state.phase = next_phase(&self.state.phase);
        Ok(())
    }

    fn orderable_locations(&self, power: &str) -> Result<Vec<String>, EngineError> {
        Ok(Self::lookup(&self.state.units, power)?
            .iter()
            .map(|u| u[2..].to_string())
            .collect())
    }

    fn all_possible_orders(&self) -> Result<BTreeMap<String, Vec<String>>, EngineError> {
        let mut all = BTreeMap::new();
        for unit in self.state.units.values().flatten() {
            all.insert(unit[2..].to_string(), vec![format!("{} H", unit)]);
        }
        // a location nobody can order this phase
        all.insert("BEL".to_string(), vec!["A BEL H".to_string()]);
        Ok(all)
    }

    fn phase_history(&self) -> Vec<PhaseRecord> {
        let mut history = self.state.history.clone();
        history.push(PhaseRecord {
            name: self.state.phase.clone(),
            ..PhaseRecord::default()
        });
        history
    }

    fn render(&self, options: &RenderOptions) -> Result<String, EngineError> {
        if self.config.fail_render {
            return Err(EngineError::new("RuntimeError", "renderer unavailable"));
        }
        let mut svg = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\">\n<g id=\"provinces\">\n");
        for (power, provinces) in &self.state.influence {
            for code in provinces {
                let lower = code.to_lowercase();
                svg.push_str(&format!("  <path id=\"_{}\" d=\"M 0 0 Z\"/>\n", lower));
                svg.push_str(&format!(
                    "  <path class=\"{}\" d=\"M 0 0 Z\"/>\n",
                    power.to_lowercase()
                ));
            }
        }
        svg.push_str("</g>\n");
        if options.include_abbreviations {
            svg.push_str("<g id=\"labels\"><text>PAR</text></g>\n");
        }
        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

/// Runs one raw request through `serve` and parses the written line.
pub fn call_raw<E: Engine>(bridge: &Bridge<E>, raw: &str) -> Value {
    let mut out = Vec::new();
    serve(bridge, Cursor::new(raw.as_bytes()), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with('\n'), "response must be one line");
    assert_eq!(text.lines().count(), 1, "response must be one line");
    serde_json::from_str(&text).unwrap()
}

pub fn call<E: Engine>(bridge: &Bridge<E>, request: Value) -> Value {
    call_raw(bridge, &request.to_string())
}

pub fn stub_bridge() -> Bridge<StubEngine> {
    Bridge::new(StubEngine::default(), &BridgeConfig::default())
}

/// Asserts the response envelope has `ok` and exactly one of `result`/`error`.
pub fn assert_envelope(response: &Value) {
    let object = response.as_object().expect("response is an object");
    let ok = object["ok"].as_bool().expect("ok is a bool");
    assert_eq!(object.contains_key("result"), ok, "{}", response);
    assert_eq!(object.contains_key("error"), !ok, "{}", response);
    assert_eq!(object.len(), 2, "{}", response);
}
