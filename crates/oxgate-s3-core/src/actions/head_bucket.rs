//! The HeadBucket pipeline.
//!
//! Two steps: load the bucket record, respond. A present bucket answers
//! 200 with its region in `x-amz-bucket-region`; a missing one answers
//! 404; a store failure answers 500.

use std::sync::Arc;

use http::HeaderValue;
use http::header::HeaderName;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use oxgate_core::{EventDisposition, PipelineAction, StepFlow, StepFn};
use oxgate_s3_model::S3Error;

use crate::metadata::{BucketStore, LoadOutcome, MetadataState};
use crate::request::S3RequestContext;
use crate::response::OutboundResponse;

use super::S3ActionEvent;

const BUCKET_REGION_HEADER: HeaderName = HeaderName::from_static("x-amz-bucket-region");

/// Action serving one HeadBucket request.
pub struct HeadBucketAction {
    ctx: Arc<S3RequestContext>,
    store: Arc<dyn BucketStore>,
    events: UnboundedSender<S3ActionEvent>,
    metadata: MetadataState,
    region: Option<String>,
}

impl std::fmt::Debug for HeadBucketAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadBucketAction")
            .field("request_id", &self.ctx.request_id())
            .field("bucket_name", &self.ctx.bucket_name())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl HeadBucketAction {
    /// Build the action for one request.
    #[must_use]
    pub fn new(
        ctx: Arc<S3RequestContext>,
        store: Arc<dyn BucketStore>,
        events: UnboundedSender<S3ActionEvent>,
    ) -> Self {
        Self {
            ctx,
            store,
            events,
            metadata: MetadataState::Absent,
            region: None,
        }
    }

    fn read_metadata(&mut self) -> StepFlow {
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let name = self.ctx.bucket_name().to_owned();
        tokio::spawn(async move {
            let outcome = store.load(&name).await;
            let _ = events.send(S3ActionEvent::MetadataLoaded(outcome));
        });
        StepFlow::Suspend
    }

    fn respond(&mut self) -> StepFlow {
        let response = match self.metadata {
            MetadataState::Present => {
                let mut response = OutboundResponse::ok();
                if let Some(region) = self.region.as_deref() {
                    if let Ok(value) = HeaderValue::from_str(region) {
                        response = response.with_header(BUCKET_REGION_HEADER, value);
                    }
                }
                response
            }
            MetadataState::Absent => OutboundResponse::from_error(
                &S3Error::no_such_bucket(format!("/{}", self.ctx.bucket_name()))
                    .with_request_id(self.ctx.request_id()),
            ),
            MetadataState::Saved | MetadataState::Failed => OutboundResponse::from_error(
                &S3Error::internal_error("bucket metadata could not be read")
                    .with_request_id(self.ctx.request_id()),
            ),
        };
        self.ctx.send_response(response);
        StepFlow::Advance
    }
}

impl PipelineAction for HeadBucketAction {
    type Event = S3ActionEvent;

    fn operation(&self) -> &'static str {
        "HeadBucket"
    }

    fn request_id(&self) -> &str {
        self.ctx.request_id()
    }

    fn steps() -> &'static [StepFn<Self>] {
        &[Self::read_metadata, Self::respond]
    }

    fn apply(&mut self, event: S3ActionEvent) -> EventDisposition {
        match event {
            S3ActionEvent::MetadataLoaded(outcome) => {
                self.metadata = match outcome {
                    LoadOutcome::Found(bucket) => {
                        self.region = Some(bucket.region);
                        MetadataState::Present
                    }
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
            event @ (S3ActionEvent::BodyChunk | S3ActionEvent::MetadataSaved(_)) => {
                warn!(
                    request_id = %self.ctx.request_id(),
                    ?event,
                    "event does not match the pending suspension; ignored"
                );
                EventDisposition::Wait
            }
        }
    }
}
