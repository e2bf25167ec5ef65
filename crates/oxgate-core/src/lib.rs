//! Generic asynchronous action-pipeline engine for oxgate.
//!
//! Every client request is served by one *action*: an object that owns a
//! fixed, ordered list of steps and is driven through them one at a time.
//! A step either finishes synchronously, suspends while external work
//! (body streaming, metadata I/O) completes, or short-circuits straight to
//! the terminal step. Suspended actions are woken by tagged events, never
//! by raw callbacks, so all progress flows through a single entry point.
//!
//! In-flight actions are owned by an [`ActionRegistry`] keyed by request
//! id; the registry drives each pipeline on its own task and removes the
//! entry once the terminal step has produced the response.

mod engine;
mod error;
mod registry;

pub use engine::{ActionEngine, EventDisposition, PipelineAction, StepFlow, StepFn};
pub use error::{OxgateError, OxgateResult};
pub use registry::ActionRegistry;
