//! Request payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration document carried in a CreateBucket request body.
///
/// An empty body is equivalent to a configuration with no location
/// constraint; the gateway then places the bucket in its default region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucketConfiguration {
    /// Region the bucket should be created in.
    pub location_constraint: Option<String>,
}

/// A bucket as the gateway knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bucket {
    /// Bucket name, unique across the gateway.
    pub name: String,
    /// Region the bucket lives in.
    pub region: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

impl Bucket {
    /// Create a bucket record stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            creation_date: Utc::now(),
        }
    }
}
