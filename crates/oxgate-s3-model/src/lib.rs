//! S3 data model types for oxgate.
//!
//! This crate holds the wire-facing vocabulary shared by the gateway
//! crates: the error taxonomy ([`S3Error`], [`S3ErrorCode`]) and the
//! request payload types ([`CreateBucketConfiguration`]).

pub mod error;
pub mod types;

pub use error::{S3Error, S3ErrorCode};
pub use types::{Bucket, CreateBucketConfiguration};
