//! Operation handlers.

use std::collections::BTreeMap;

use tracing::debug;

use super::{Bridge, BridgeError};
use crate::engine::{Engine, Game, GameState, PhaseRecord};
use crate::power::Power;
use crate::protocol::{
    NewGameResult, OrderResults, PossibleOrdersResult, PowerMap, ProcessResult, RenderResult,
    StateView,
};
use crate::render::SupplyCenters;

/// Orders keyed by validated power.
pub type PowerOrders = BTreeMap<Power, Vec<String>>;

/// Maps request order keys onto powers, matching names case-insensitively.
///
/// Lists submitted under two spellings of the same power are concatenated in
/// key order.
pub fn canonical_orders(orders: BTreeMap<String, Vec<String>>) -> Result<PowerOrders, BridgeError> {
    let mut canonical = PowerOrders::new();
    for (key, list) in orders {
        let power = Power::from_name(&key).ok_or_else(|| BridgeError::unknown_power(key))?;
        canonical.entry(power).or_default().extend(list);
    }
    Ok(canonical)
}

/// Resolves the engine's power names to [`Power`], in engine order.
fn powers<G: Game>(game: &G) -> Result<Vec<(Power, String)>, BridgeError> {
    game.power_names()
        .into_iter()
        .map(|name| match Power::from_name(&name) {
            Some(power) => Ok((power, name)),
            None => Err(BridgeError::unknown_power(name)),
        })
        .collect()
}

fn units_and_centers<G: Game>(game: &G) -> Result<(PowerMap, PowerMap), BridgeError> {
    let mut units = PowerMap::new();
    let mut centers = PowerMap::new();
    for (power, name) in powers(game)? {
        units.insert(power, game.units(&name)?);
        centers.insert(power, game.centers(&name)?);
    }
    Ok((units, centers))
}

fn state_view<G: Game>(game: &G) -> Result<StateView, BridgeError> {
    let (units, centers) = units_and_centers(game)?;
    Ok(StateView {
        phase: game.current_phase(),
        units,
        centers,
        is_game_done: game.is_done(),
    })
}

/// The most recent history entry that is not the active phase.
pub fn completed_phase(history: Vec<PhaseRecord>, current: &str) -> Option<PhaseRecord> {
    history.into_iter().rev().find(|record| record.name != current)
}

impl<E: Engine> Bridge<E> {
    pub(super) fn new_game(&self) -> Result<NewGameResult, BridgeError> {
        let game_state = self.engine.create_initial_state()?;
        let game = self.engine.deserialize(&game_state)?;
        let (units, centers) = units_and_centers(&game)?;
        Ok(NewGameResult {
            game_state,
            phase: game.current_phase(),
            units,
            centers,
        })
    }

    pub(super) fn set_orders_and_process(
        &self,
        state: &GameState,
        orders: &PowerOrders,
        render: bool,
    ) -> Result<ProcessResult, BridgeError> {
        let mut game = self.engine.deserialize(state)?;
        for (power, list) in orders {
            game.set_orders(power.name(), list)?;
        }

        let previous = game.current_phase();
        game.process()?;
        let game_state = game.serialize()?;
        let view = state_view(&game)?;
        debug!(from = %previous, to = %view.phase, powers = orders.len(), "adjudicated");

        let order_results = completed_phase(game.phase_history(), &view.phase).map(OrderResults::from);
        let svg = if render {
            Some(self.render_post_processed(&game, &view.centers)?)
        } else {
            None
        };

        Ok(ProcessResult {
            game_state,
            state: view,
            order_results,
            svg,
        })
    }

    pub(super) fn get_possible(&self, state: &GameState) -> Result<PossibleOrdersResult, BridgeError> {
        let game = self.engine.deserialize(state)?;
        let all = game.all_possible_orders()?;

        let mut possible_orders = BTreeMap::new();
        for (power, name) in powers(&game)? {
            let by_location: BTreeMap<String, Vec<String>> = game
                .orderable_locations(&name)?
                .into_iter()
                .filter_map(|loc| all.get(&loc).map(|orders| (loc, orders.clone())))
                .collect();
            possible_orders.insert(power, by_location);
        }

        Ok(PossibleOrdersResult {
            phase: game.current_phase(),
            possible_orders,
        })
    }

    pub(super) fn get_state(&self, state: &GameState) -> Result<StateView, BridgeError> {
        let game = self.engine.deserialize(state)?;
        state_view(&game)
    }

    pub(super) fn render_map(&self, state: &GameState) -> Result<RenderResult, BridgeError> {
        let game = self.engine.deserialize(state)?;
        let (_, centers) = units_and_centers(&game)?;
        Ok(RenderResult {
            svg: self.render_post_processed(&game, &centers)?,
            phase: game.current_phase(),
        })
    }

    fn render_post_processed(&self, game: &E::Game, centers: &PowerMap) -> Result<String, BridgeError> {
        let svg = game.render(&self.render_options)?;
        let centers = SupplyCenters::from_lists(centers.values());
        Ok(self.post.apply(&svg, &centers))
    }
}
