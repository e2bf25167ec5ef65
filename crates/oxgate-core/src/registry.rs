//! Owner-held registry of in-flight actions.
//!
//! [`ActionRegistry`] indexes running actions by request id. Submitting an
//! action spawns a driver task that starts the pipeline, forwards events
//! from the action's channel, and removes the entry once the pipeline
//! finishes. The registry is the sole owner of an action's lifetime; an
//! action never destroys itself.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::{ActionEngine, PipelineAction};
use crate::error::OxgateError;

/// Registry of in-flight actions, keyed by request id.
///
/// Each entry records the operation name of the running action. Entries
/// are inserted by [`ActionRegistry::submit`] and removed by the driver
/// task when the pipeline finishes.
pub struct ActionRegistry {
    inflight: DashMap<String, &'static str>,
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("inflight_count", &self.inflight.len())
            .finish_non_exhaustive()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    /// Create a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: DashMap::new(),
        }
    }

    /// Register an action and spawn its driver task.
    ///
    /// The driver starts the pipeline, then drains `events` into
    /// [`ActionEngine::resume`] until the pipeline finishes, and finally
    /// removes the registry entry. Within one action everything runs on
    /// this single task, so steps and resumptions never overlap.
    ///
    /// # Errors
    ///
    /// Returns [`OxgateError::DuplicateRequest`] if an action with the same
    /// request id is already in flight.
    pub fn submit<A: PipelineAction>(
        self: &Arc<Self>,
        action: A,
        mut events: UnboundedReceiver<A::Event>,
    ) -> Result<JoinHandle<()>, OxgateError> {
        let request_id = action.request_id().to_owned();
        match self.inflight.entry(request_id.clone()) {
            Entry::Occupied(_) => {
                return Err(OxgateError::DuplicateRequest(request_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(action.operation());
            }
        }

        let registry = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut engine = ActionEngine::new(action);
            engine.start();
            while !engine.is_finished() {
                match events.recv().await {
                    Some(event) => engine.resume(event),
                    None => {
                        warn!(
                            request_id = %request_id,
                            "event channel closed before the pipeline finished"
                        );
                        break;
                    }
                }
            }
            registry.inflight.remove(&request_id);
            debug!(request_id = %request_id, "action removed from registry");
        });
        Ok(handle)
    }

    /// Whether an action with the given request id is in flight.
    #[must_use]
    pub fn is_inflight(&self, request_id: &str) -> bool {
        self.inflight.contains_key(request_id)
    }

    /// Number of in-flight actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    /// Whether the registry has no in-flight actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EventDisposition, StepFlow, StepFn};
    use tokio::sync::mpsc;

    struct BlockingAction {
        id: String,
        responses: u32,
    }

    impl BlockingAction {
        fn new(id: impl Into<String>) -> Self {
            Self {
                id: id.into(),
                responses: 0,
            }
        }

        fn wait(&mut self) -> StepFlow {
            StepFlow::Suspend
        }

        fn respond(&mut self) -> StepFlow {
            self.responses += 1;
            StepFlow::Advance
        }
    }

    impl PipelineAction for BlockingAction {
        type Event = ();

        fn operation(&self) -> &'static str {
            "Blocking"
        }

        fn request_id(&self) -> &str {
            &self.id
        }

        fn steps() -> &'static [StepFn<Self>] {
            &[Self::wait, Self::respond]
        }

        fn apply(&mut self, (): ()) -> EventDisposition {
            EventDisposition::Advance
        }
    }

    #[tokio::test]
    async fn test_should_remove_entry_after_completion() {
        let registry = Arc::new(ActionRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = registry
            .submit(BlockingAction::new("req-a"), rx)
            .unwrap_or_else(|e| panic!("submit failed: {e}"));
        assert!(registry.is_inflight("req-a"));

        tx.send(()).unwrap_or_else(|e| panic!("send failed: {e}"));
        handle.await.unwrap_or_else(|e| panic!("driver failed: {e}"));

        assert!(!registry.is_inflight("req-a"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_request_id() {
        let registry = Arc::new(ActionRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let (_tx2, rx2) = mpsc::unbounded_channel();

        let handle = registry
            .submit(BlockingAction::new("req-dup"), rx)
            .unwrap_or_else(|e| panic!("submit failed: {e}"));

        let result = registry.submit(BlockingAction::new("req-dup"), rx2);
        assert!(matches!(result, Err(OxgateError::DuplicateRequest(_))));
        assert_eq!(registry.len(), 1);

        tx.send(()).unwrap_or_else(|e| panic!("send failed: {e}"));
        handle.await.unwrap_or_else(|e| panic!("driver failed: {e}"));
    }

    #[tokio::test]
    async fn test_should_release_entry_when_channel_closes_early() {
        let registry = Arc::new(ActionRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel::<()>();

        let handle = registry
            .submit(BlockingAction::new("req-orphan"), rx)
            .unwrap_or_else(|e| panic!("submit failed: {e}"));

        drop(tx);
        handle.await.unwrap_or_else(|e| panic!("driver failed: {e}"));

        assert!(!registry.is_inflight("req-orphan"));
    }
}
