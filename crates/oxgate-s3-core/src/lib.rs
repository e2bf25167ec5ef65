//! Request-handling core for the oxgate S3 gateway.
//!
//! Every incoming request is served by one action: a pipeline of steps
//! driven by the engine in `oxgate-core`. This crate supplies the
//! S3-facing pieces around that engine: the per-request context, the
//! bucket metadata store, request validation, and the concrete actions
//! for bucket creation and lookup.
//!
//! # Architecture
//!
//! ```text
//! HTTP transport (routing, body delivery)
//!        |
//!        v
//! S3RequestContext (body buffer, response slot)
//!        |
//!        v
//! CreateBucketAction / HeadBucketAction (pipeline steps)
//!        |
//!        v
//!   BucketStore (bucket metadata)
//! ```

pub mod actions;
pub mod config;
pub mod metadata;
pub mod request;
pub mod response;
pub mod validation;

pub use actions::{
    CreateBucketAction, HeadBucketAction, S3ActionEvent, submit_create_bucket, submit_head_bucket,
};
pub use config::GatewayConfig;
pub use metadata::{BucketStore, InMemoryBucketStore, LoadOutcome, MetadataState, SaveOutcome};
pub use request::S3RequestContext;
pub use response::OutboundResponse;
