//! Concrete request actions and their submission helpers.
//!
//! Each action implements `PipelineAction` over the shared
//! [`S3ActionEvent`] alphabet. The `submit_*` helpers wire an action to
//! its event channel and hand it to the registry, which drives the
//! pipeline on its own task.

mod create_bucket;
mod head_bucket;

pub use create_bucket::CreateBucketAction;
pub use head_bucket::HeadBucketAction;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use oxgate_core::{ActionRegistry, OxgateError};

use crate::config::GatewayConfig;
use crate::metadata::{BucketStore, LoadOutcome, SaveOutcome};
use crate::request::S3RequestContext;

/// Completion notices delivered to a suspended action.
#[derive(Debug)]
pub enum S3ActionEvent {
    /// The transport appended a body chunk.
    BodyChunk,
    /// A metadata load finished.
    MetadataLoaded(LoadOutcome),
    /// A metadata save finished.
    MetadataSaved(SaveOutcome),
}

/// Submit a CreateBucket action for the given request.
///
/// # Errors
///
/// Returns [`OxgateError::DuplicateRequest`] if an action with the same
/// request id is already in flight.
pub fn submit_create_bucket(
    registry: &Arc<ActionRegistry>,
    ctx: Arc<S3RequestContext>,
    store: Arc<dyn BucketStore>,
    config: &GatewayConfig,
) -> Result<JoinHandle<()>, OxgateError> {
    let (events, rx) = mpsc::unbounded_channel();
    let action = CreateBucketAction::new(ctx, store, events, config);
    registry.submit(action, rx)
}

/// Submit a HeadBucket action for the given request.
///
/// # Errors
///
/// Returns [`OxgateError::DuplicateRequest`] if an action with the same
/// request id is already in flight.
pub fn submit_head_bucket(
    registry: &Arc<ActionRegistry>,
    ctx: Arc<S3RequestContext>,
    store: Arc<dyn BucketStore>,
) -> Result<JoinHandle<()>, OxgateError> {
    let (events, rx) = mpsc::unbounded_channel();
    let action = HeadBucketAction::new(ctx, store, events);
    registry.submit(action, rx)
}
