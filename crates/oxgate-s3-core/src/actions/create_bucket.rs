//! The CreateBucket pipeline.
//!
//! Steps, in order: validate the request, load existing metadata, save
//! the new record, respond. Validation covers both the bucket name and
//! the XML payload; a failure at any point short-circuits to the
//! terminal step, which classifies the accumulated state into exactly
//! one response.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use oxgate_core::{EventDisposition, PipelineAction, StepFlow, StepFn};
use oxgate_s3_model::{Bucket, CreateBucketConfiguration, S3Error};
use oxgate_s3_xml::from_xml;

use crate::config::GatewayConfig;
use crate::metadata::{BucketStore, LoadOutcome, MetadataState, SaveOutcome};
use crate::request::S3RequestContext;
use crate::response::OutboundResponse;
use crate::validation::validate_bucket_name;

use super::S3ActionEvent;

/// Which suspension, if any, the action is parked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Nothing,
    Body,
    Load,
    Save,
}

/// How the terminal step classifies the accumulated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Rejected,
    Conflict,
    Created,
    BackendFailure,
}

fn classify(rejected: bool, metadata: MetadataState) -> Outcome {
    if rejected {
        return Outcome::Rejected;
    }
    match metadata {
        MetadataState::Present => Outcome::Conflict,
        MetadataState::Saved => Outcome::Created,
        MetadataState::Absent | MetadataState::Failed => Outcome::BackendFailure,
    }
}

/// Action serving one CreateBucket request.
pub struct CreateBucketAction {
    ctx: Arc<S3RequestContext>,
    store: Arc<dyn BucketStore>,
    events: UnboundedSender<S3ActionEvent>,
    default_region: String,
    chunk_hint: usize,
    awaiting: Awaiting,
    invalid: Option<S3Error>,
    metadata: MetadataState,
    location_constraint: Option<String>,
}

impl std::fmt::Debug for CreateBucketAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateBucketAction")
            .field("request_id", &self.ctx.request_id())
            .field("bucket_name", &self.ctx.bucket_name())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl CreateBucketAction {
    /// Build the action for one request.
    #[must_use]
    pub fn new(
        ctx: Arc<S3RequestContext>,
        store: Arc<dyn BucketStore>,
        events: UnboundedSender<S3ActionEvent>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            ctx,
            store,
            events,
            default_region: config.default_region.clone(),
            chunk_hint: config.body_chunk_hint,
            awaiting: Awaiting::Nothing,
            invalid: None,
            metadata: MetadataState::Absent,
            location_constraint: None,
        }
    }

    /// Check the bucket name, then gather and parse the request body.
    ///
    /// Re-entered via `Rerun` each time a body chunk notification
    /// arrives until the declared length has been received.
    fn validate(&mut self) -> StepFlow {
        if let Err(err) = validate_bucket_name(self.ctx.bucket_name()) {
            self.invalid = Some(err.with_request_id(self.ctx.request_id()));
            return StepFlow::ShortCircuit;
        }

        self.ctx.resume_body();
        if self.ctx.has_all_body_content() {
            return self.parse_payload();
        }

        self.awaiting = Awaiting::Body;
        let events = self.events.clone();
        self.ctx.listen_for_body(
            self.chunk_hint,
            Box::new(move || {
                let _ = events.send(S3ActionEvent::BodyChunk);
            }),
        );
        StepFlow::Suspend
    }

    /// Parse the complete body. An empty body means no location
    /// constraint.
    fn parse_payload(&mut self) -> StepFlow {
        let body = self.ctx.full_body();
        if body.is_empty() {
            return StepFlow::Advance;
        }

        match from_xml::<CreateBucketConfiguration>(&body) {
            Ok(config) => {
                self.location_constraint =
                    config.location_constraint.filter(|region| !region.is_empty());
                StepFlow::Advance
            }
            Err(err) => {
                self.invalid = Some(
                    S3Error::malformed_xml(format!("/{}", self.ctx.bucket_name()))
                        .with_request_id(self.ctx.request_id())
                        .with_source(err),
                );
                StepFlow::ShortCircuit
            }
        }
    }

    fn read_metadata(&mut self) -> StepFlow {
        self.awaiting = Awaiting::Load;
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let name = self.ctx.bucket_name().to_owned();
        tokio::spawn(async move {
            let outcome = store.load(&name).await;
            let _ = events.send(S3ActionEvent::MetadataLoaded(outcome));
        });
        StepFlow::Suspend
    }

    /// Write the new record unless the load already found one.
    ///
    /// A failed load does not stop the pipeline; the save result alone
    /// decides the final state.
    fn save_metadata(&mut self) -> StepFlow {
        if self.metadata == MetadataState::Present {
            return StepFlow::ShortCircuit;
        }

        let region = self
            .location_constraint
            .clone()
            .unwrap_or_else(|| self.default_region.clone());
        let bucket = Bucket::new(self.ctx.bucket_name(), region);

        self.awaiting = Awaiting::Save;
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = store.save(bucket).await;
            let _ = events.send(S3ActionEvent::MetadataSaved(outcome));
        });
        StepFlow::Suspend
    }

    /// Terminal step. May be entered from any pipeline position, so it
    /// classifies the outcome from the accumulated state alone.
    fn respond(&mut self) -> StepFlow {
        let response = match classify(self.invalid.is_some(), self.metadata) {
            Outcome::Rejected => {
                let err = self.invalid.take().unwrap_or_else(|| {
                    S3Error::malformed_xml(format!("/{}", self.ctx.bucket_name()))
                        .with_request_id(self.ctx.request_id())
                });
                OutboundResponse::from_error(&err)
            }
            Outcome::Conflict => OutboundResponse::from_error(
                &S3Error::bucket_already_exists(format!("/{}", self.ctx.bucket_name()))
                    .with_request_id(self.ctx.request_id()),
            ),
            Outcome::Created => {
                OutboundResponse::created(&format!("/{}", self.ctx.bucket_name()))
            }
            Outcome::BackendFailure => OutboundResponse::from_error(
                &S3Error::internal_error("bucket metadata could not be written")
                    .with_request_id(self.ctx.request_id()),
            ),
        };
        self.ctx.send_response(response);
        StepFlow::Advance
    }
}

impl PipelineAction for CreateBucketAction {
    type Event = S3ActionEvent;

    fn operation(&self) -> &'static str {
        "CreateBucket"
    }

    fn request_id(&self) -> &str {
        self.ctx.request_id()
    }

    fn steps() -> &'static [StepFn<Self>] {
        &[
            Self::validate,
            Self::read_metadata,
            Self::save_metadata,
            Self::respond,
        ]
    }

    fn apply(&mut self, event: S3ActionEvent) -> EventDisposition {
        match (self.awaiting, event) {
            (Awaiting::Body, S3ActionEvent::BodyChunk) => {
                if self.ctx.has_all_body_content() {
                    self.awaiting = Awaiting::Nothing;
                    EventDisposition::Rerun
                } else {
                    EventDisposition::Wait
                }
            }
            (Awaiting::Load, S3ActionEvent::MetadataLoaded(outcome)) => {
                self.awaiting = Awaiting::Nothing;
                self.metadata = match outcome {
                    LoadOutcome::Found(_) => MetadataState::Present,
                    LoadOutcome::Missing => MetadataState::Absent,
                    LoadOutcome::Unavailable(reason) => {
                        warn!(
                            bucket = %self.ctx.bucket_name(),
                            reason = %reason,
                            "metadata load failed"
                        );
                        MetadataState::Failed
                    }
                };
                EventDisposition::Advance
            }
            (Awaiting::Save, S3ActionEvent::MetadataSaved(outcome)) => {
                self.awaiting = Awaiting::Nothing;
                self.metadata = match outcome {
                    SaveOutcome::Saved => MetadataState::Saved,
                    SaveOutcome::AlreadyExists => MetadataState::Present,
                    SaveOutcome::Unavailable(reason) => {
                        warn!(
                            bucket = %self.ctx.bucket_name(),
                            reason = %reason,
                            "metadata save failed"
                        );
                        MetadataState::Failed
                    }
                };
                EventDisposition::Advance
            }
            (awaiting, event) => {
                warn!(
                    request_id = %self.ctx.request_id(),
                    ?awaiting,
                    ?event,
                    "event does not match the pending suspension; ignored"
                );
                EventDisposition::Wait
            }
        }
    }
}
