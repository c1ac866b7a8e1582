//! Adjudication bridge library.
//!
//! Exposes the request dispatcher, the render post-processor, and the engine
//! capability traits for use by integration tests and the binary entry point.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod power;
pub mod protocol;
pub mod render;
pub mod telemetry;
