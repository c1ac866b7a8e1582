//! Wire protocol: one JSON request in, one JSON response out.

pub mod request;
pub mod response;

pub use request::{Op, Request, ALL_OPS};
pub use response::{
    NewGameResult, OpResult, OrderResults, PossibleOrdersResult, PowerMap, ProcessResult,
    RenderResult, Response, StateView,
};
