//! Step dispatch for per-request action pipelines.
//!
//! An action registers its steps once, at construction, as a fixed ordered
//! list. [`ActionEngine`] invokes them strictly in order: a step returns a
//! [`StepFlow`] telling the engine to run the next step, to park the
//! pipeline until an external completion arrives, or to jump to the
//! terminal step. External completions re-enter the pipeline exclusively
//! through [`ActionEngine::resume`] as tagged events; the action translates
//! each event into an [`EventDisposition`].

use tracing::{debug, warn};

/// Control value returned by a pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFlow {
    /// The step's work is done; run the next step.
    Advance,
    /// The step started asynchronous work; park the pipeline until an
    /// event resumes it.
    Suspend,
    /// Skip the remaining steps and run the terminal step.
    ShortCircuit,
}

/// How a suspended action reacts to a delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event did not complete the pending work; keep waiting.
    Wait,
    /// Re-run the current step from the top.
    Rerun,
    /// The pending work is done; run the next step.
    Advance,
}

/// One unit of work in an action's pipeline.
pub type StepFn<A> = fn(&mut A) -> StepFlow;

/// A per-request action driven through an ordered list of steps.
pub trait PipelineAction: Send + 'static {
    /// Completion notice delivered to a suspended action.
    type Event: Send + 'static;

    /// Operation name used in diagnostics (e.g. `"CreateBucket"`).
    fn operation(&self) -> &'static str;

    /// Identifier of the request this action serves.
    fn request_id(&self) -> &str;

    /// The fixed, ordered step list.
    ///
    /// The last entry is the terminal step. It may be entered from any
    /// earlier pipeline position, so it must classify the outcome from the
    /// action's accumulated state alone.
    fn steps() -> &'static [StepFn<Self>]
    where
        Self: Sized;

    /// Record an external completion and report how the pipeline should
    /// proceed.
    fn apply(&mut self, event: Self::Event) -> EventDisposition;
}

/// Drives one action through its step list.
///
/// The cursor only moves forward; at most one step is in flight at a time.
/// Once the pipeline has run past the terminal step the engine is
/// finished and ignores further events.
pub struct ActionEngine<A: PipelineAction> {
    action: A,
    cursor: usize,
    started: bool,
    finished: bool,
}

impl<A: PipelineAction> std::fmt::Debug for ActionEngine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEngine")
            .field("operation", &self.action.operation())
            .field("request_id", &self.action.request_id())
            .field("cursor", &self.cursor)
            .field("finished", &self.finished)
            .finish()
    }
}

impl<A: PipelineAction> ActionEngine<A> {
    /// Wrap an action, ready to start at step 0.
    pub fn new(action: A) -> Self {
        Self {
            action,
            cursor: 0,
            started: false,
            finished: false,
        }
    }

    /// Invoke the first step. Calling `start` twice is a programmer error
    /// and is ignored with a warning.
    pub fn start(&mut self) {
        if self.started {
            warn!(
                operation = self.action.operation(),
                request_id = %self.action.request_id(),
                "start called twice; ignored"
            );
            return;
        }
        self.started = true;
        self.dispatch();
    }

    /// Deliver an external completion to a suspended pipeline.
    ///
    /// Events that arrive after the pipeline finished are ignored.
    pub fn resume(&mut self, event: A::Event) {
        if self.finished {
            warn!(
                operation = self.action.operation(),
                request_id = %self.action.request_id(),
                "event delivered after completion; ignored"
            );
            return;
        }
        match self.action.apply(event) {
            EventDisposition::Wait => {}
            EventDisposition::Rerun => self.dispatch(),
            EventDisposition::Advance => {
                self.cursor += 1;
                self.dispatch();
            }
        }
    }

    /// Whether the pipeline has run past its terminal step.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The wrapped action.
    #[must_use]
    pub fn action(&self) -> &A {
        &self.action
    }

    fn dispatch(&mut self) {
        let steps = A::steps();
        loop {
            if self.cursor >= steps.len() {
                self.finished = true;
                debug!(
                    operation = self.action.operation(),
                    request_id = %self.action.request_id(),
                    "pipeline finished"
                );
                return;
            }
            debug!(
                operation = self.action.operation(),
                request_id = %self.action.request_id(),
                step = self.cursor,
                "entering step"
            );
            match steps[self.cursor](&mut self.action) {
                StepFlow::Advance => self.cursor += 1,
                StepFlow::Suspend => return,
                StepFlow::ShortCircuit => self.cursor = steps.len().saturating_sub(1),
            }
        }
    }
}
