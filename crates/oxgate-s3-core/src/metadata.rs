//! Bucket metadata store and the outcomes it reports.
//!
//! Actions never talk to storage synchronously. A step spawns the store
//! call, suspends, and the result comes back as a tagged outcome. The
//! outcome sets carry every way a call can end, including backend
//! failure, so the terminal step can classify the request from the
//! recorded state alone.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use oxgate_s3_model::Bucket;

/// What an action knows about its bucket's metadata.
///
/// The state starts at `Absent` and is only ever updated from store
/// outcomes. The terminal step reads it to pick the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataState {
    /// No record was found, or none was looked up yet.
    #[default]
    Absent,
    /// A record for this bucket already exists.
    Present,
    /// This action wrote the record.
    Saved,
    /// The store could not be reached or failed.
    Failed,
}

/// Result of a metadata load.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// A record exists for the requested bucket.
    Found(Bucket),
    /// No record exists for the requested bucket.
    Missing,
    /// The store failed; the reason is diagnostic only.
    Unavailable(String),
}

/// Result of a metadata save.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// The record was written by this call.
    Saved,
    /// A record with the same name was written first.
    AlreadyExists,
    /// The store failed; the reason is diagnostic only.
    Unavailable(String),
}

/// Asynchronous bucket metadata store.
///
/// Implementations report failure through the outcome enums instead of
/// an error type; callers always receive a value they can record.
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Load the record for `name`.
    async fn load(&self, name: &str) -> LoadOutcome;

    /// Write `bucket`, failing if a record with the same name exists.
    async fn save(&self, bucket: Bucket) -> SaveOutcome;
}

/// In-memory bucket store backed by a concurrent map.
///
/// Name uniqueness is enforced by the map's entry API, so two racing
/// saves for the same name resolve to exactly one `Saved` and one
/// `AlreadyExists`.
pub struct InMemoryBucketStore {
    buckets: DashMap<String, Bucket>,
}

impl std::fmt::Debug for InMemoryBucketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBucketStore")
            .field("bucket_count", &self.buckets.len())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryBucketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBucketStore {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Whether a bucket with the given name exists.
    #[must_use]
    pub fn bucket_exists(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// Number of buckets in the store.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[async_trait]
impl BucketStore for InMemoryBucketStore {
    async fn load(&self, name: &str) -> LoadOutcome {
        match self.buckets.get(name) {
            Some(bucket) => LoadOutcome::Found(bucket.clone()),
            None => LoadOutcome::Missing,
        }
    }

    async fn save(&self, bucket: Bucket) -> SaveOutcome {
        match self.buckets.entry(bucket.name.clone()) {
            Entry::Occupied(_) => SaveOutcome::AlreadyExists,
            Entry::Vacant(slot) => {
                info!(bucket = %bucket.name, region = %bucket.region, "bucket created");
                slot.insert(bucket);
                SaveOutcome::Saved
            }
        }
    }
}
