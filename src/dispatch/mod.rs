//! Request dispatch.
//!
//! A [`Bridge`] turns one request into one response. It validates the
//! operation and its inputs, loads the game through the [`Engine`], runs the
//! operation, and post-processes rendered maps. Every failure, engine panics
//! included, comes back as an `ok: false` response.

mod errors;
mod ops;

use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

pub use errors::BridgeError;
pub use ops::{canonical_orders, completed_phase, PowerOrders};

use crate::config::BridgeConfig;
use crate::engine::{Engine, RenderOptions};
use crate::protocol::{Op, OpResult, Request, Response};
use crate::render::PostProcessor;

/// Dispatches requests against an engine.
///
/// Holds no game between calls: each request loads its own game from the
/// supplied state and drops it before returning.
pub struct Bridge<E> {
    engine: E,
    post: PostProcessor,
    render_options: RenderOptions,
}

impl<E: Engine> Bridge<E> {
    pub fn new(engine: E, config: &BridgeConfig) -> Self {
        Bridge {
            engine,
            post: config.post_processor(),
            render_options: config.render_options(),
        }
    }

    /// Parses and handles a raw request document.
    pub fn handle_raw(&self, raw: &str) -> Response {
        match Request::parse(raw) {
            Ok(request) => self.handle(&request),
            Err(e) => reject(e),
        }
    }

    /// Handles a parsed request. Never panics.
    pub fn handle(&self, request: &Request) -> Response {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(request)))
            .unwrap_or_else(|payload| Err(BridgeError::from_panic(payload.as_ref())));
        match outcome {
            Ok(result) => {
                info!(op = request.op.as_str().unwrap_or_default(), "request handled");
                Response::success(result)
            }
            Err(e) => reject(e),
        }
    }

    /// Validates a request and runs its operation.
    ///
    /// # Errors
    ///
    /// Fails with [`BridgeError::UnknownOp`] or [`BridgeError::MissingGameState`]
    /// before touching the engine, with [`BridgeError::UnknownPower`] for order
    /// keys outside the seven powers, and with [`BridgeError::Engine`] for
    /// anything the engine raises.
    pub fn dispatch(&self, request: &Request) -> Result<OpResult, BridgeError> {
        let op = Op::from_value(&request.op)?;
        debug!(op = op.as_str(), "dispatching");

        let state = request.game_state();
        if op.requires_game_state() && state.is_none() {
            return Err(BridgeError::MissingGameState);
        }

        match (op, state) {
            (Op::NewGame, _) => self.new_game().map(OpResult::NewGame),
            (Op::SetOrdersAndProcess, Some(state)) => {
                let orders = canonical_orders(request.orders())?;
                self.set_orders_and_process(state, &orders, request.render())
                    .map(OpResult::Processed)
            }
            (Op::GetPossible, Some(state)) => self.get_possible(state).map(OpResult::Possible),
            (Op::GetState, Some(state)) => self.get_state(state).map(OpResult::State),
            (Op::RenderMap, Some(state)) => self.render_map(state).map(OpResult::Map),
            // only reachable for ops that need no state, all matched above
            (_, None) => Err(BridgeError::MissingGameState),
        }
    }
}

fn reject(error: BridgeError) -> Response {
    warn!(category = error.category(), error = %error, "request failed");
    Response::failure(error.to_string())
}

/// Reads one request from `input` and writes one response line to `output`.
///
/// # Errors
///
/// Only failures writing the response are returned; unreadable input is
/// answered with an error response.
pub fn serve<E, R, W>(bridge: &Bridge<E>, mut input: R, mut output: W) -> io::Result<()>
where
    E: Engine,
    R: Read,
    W: Write,
{
    let mut raw = String::new();
    let response = match input.read_to_string(&mut raw) {
        Ok(_) => bridge.handle_raw(&raw),
        Err(e) => reject(BridgeError::Unreadable(e)),
    };
    writeln!(output, "{}", response.to_json())?;
    output.flush()
}
