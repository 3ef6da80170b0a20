//! Compute bridge between the codec and the voyage solver.
//!
//! The solver is an opaque compute engine: it takes an encoded payload
//! and streams back progress buffers followed by one terminal result.
//! The bridge owns that asynchronous boundary and nothing else -- it
//! never interprets buffer contents (that is the codec's job).
//!
//! # Contract
//!
//! [`ComputeBridge::dispatch`] runs the solver on a worker thread and
//! returns a [`DispatchHandle`] over a two-channel event stream:
//! zero or more `Progress` buffers, strictly followed by exactly one
//! terminal event. A solver error, panic, or vanished worker surfaces as
//! [`BridgeError::ComputeUnavailable`]; the caller is never left hanging.
//! Buffers are immutable once handed across the boundary.
//!
//! There is no built-in cancellation: callers wanting a timeout use
//! [`DispatchHandle::wait_deadline`] and treat expiry as unavailable
//! (the worker is detached, not interrupted).

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use voycalc_core::SolverInput;

pub mod greedy;

pub use greedy::GreedySolver;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors a solver implementation may report.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("malformed solver input: {0}")]
    BadInput(String),
    #[error("solver failed: {0}")]
    Failed(String),
}

/// Errors surfaced by the bridge. All recoverable: the caller may retry
/// the dispatch.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("compute engine unavailable: {reason}")]
    ComputeUnavailable { reason: String },
}

impl BridgeError {
    fn unavailable(reason: impl Into<String>) -> Self {
        BridgeError::ComputeUnavailable {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Solver trait
// ---------------------------------------------------------------------------

/// The external combinatorial solver, seen at its interface boundary.
///
/// `run` may call `progress` zero or more times with intermediate result
/// buffers, then returns the final result buffer. Implementations must
/// not retain the input past the call.
pub trait Solver: Send + Sync {
    fn run(
        &self,
        input: &SolverInput,
        progress: &mut dyn FnMut(Vec<u8>),
    ) -> Result<Vec<u8>, SolverError>;
}

// ---------------------------------------------------------------------------
// ComputeBridge
// ---------------------------------------------------------------------------

/// An event on the dispatch stream.
#[derive(Debug)]
pub enum ComputeEvent {
    /// An intermediate result buffer. May arrive zero or more times.
    Progress(Vec<u8>),
    /// The terminal event. Arrives exactly once, after all progress.
    Done(Result<Vec<u8>, BridgeError>),
}

/// Relays encoded payloads to a [`Solver`] on a worker thread.
pub struct ComputeBridge<S> {
    solver: Arc<S>,
}

impl<S: Solver + 'static> ComputeBridge<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver: Arc::new(solver),
        }
    }

    /// Dispatch a payload. Non-blocking: the solver runs on a worker
    /// thread and the returned handle yields its event stream.
    ///
    /// A panicking solver is caught at the thread boundary and reported
    /// as [`BridgeError::ComputeUnavailable`], so the terminal event is
    /// always delivered.
    pub fn dispatch(&self, input: SolverInput) -> DispatchHandle {
        let (tx, rx) = mpsc::channel();
        let solver = Arc::clone(&self.solver);

        let worker = thread::spawn(move || {
            let progress_tx = tx.clone();
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                let mut emit = |buffer: Vec<u8>| {
                    // A vanished receiver just means the caller gave up
                    // on progress; the terminal send below decides.
                    let _ = progress_tx.send(ComputeEvent::Progress(buffer));
                };
                solver.run(&input, &mut emit)
            }));

            let terminal = match outcome {
                Ok(Ok(buffer)) => Ok(buffer),
                Ok(Err(err)) => Err(BridgeError::unavailable(err.to_string())),
                Err(_) => {
                    log::error!("solver panicked during dispatch");
                    Err(BridgeError::unavailable("solver panicked"))
                }
            };
            let _ = tx.send(ComputeEvent::Done(terminal));
        });

        DispatchHandle {
            rx,
            worker: Some(worker),
            finished: false,
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchHandle
// ---------------------------------------------------------------------------

/// The caller's end of one dispatch: a progress stream of bounded or
/// unbounded length, then a single terminal result.
pub struct DispatchHandle {
    rx: Receiver<ComputeEvent>,
    worker: Option<JoinHandle<()>>,
    /// Set once the terminal event has been yielded; guarantees the
    /// at-most-once terminal delivery even for pollers.
    finished: bool,
}

impl DispatchHandle {
    /// Block until the terminal event, forwarding each progress buffer
    /// to `on_progress`. The terminal result is returned exactly once.
    pub fn wait(mut self, mut on_progress: impl FnMut(&[u8])) -> Result<Vec<u8>, BridgeError> {
        loop {
            match self.rx.recv() {
                Ok(ComputeEvent::Progress(buffer)) => on_progress(&buffer),
                Ok(ComputeEvent::Done(result)) => {
                    self.join_worker();
                    return result;
                }
                // The worker can no longer send a terminal event.
                Err(_) => {
                    self.join_worker();
                    return Err(BridgeError::unavailable("solver worker disconnected"));
                }
            }
        }
    }

    /// Like [`wait`](Self::wait), but give up after `deadline` of solver
    /// silence and report the engine unavailable. The worker keeps
    /// running detached; the solver has no cancellation.
    pub fn wait_deadline(
        mut self,
        deadline: Duration,
        mut on_progress: impl FnMut(&[u8]),
    ) -> Result<Vec<u8>, BridgeError> {
        loop {
            match self.rx.recv_timeout(deadline) {
                Ok(ComputeEvent::Progress(buffer)) => on_progress(&buffer),
                Ok(ComputeEvent::Done(result)) => {
                    self.join_worker();
                    return result;
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.worker.take(); // detach
                    return Err(BridgeError::unavailable(format!(
                        "no solver response within {deadline:?}"
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.join_worker();
                    return Err(BridgeError::unavailable("solver worker disconnected"));
                }
            }
        }
    }

    /// Non-blocking poll for the next event, for callers driving their
    /// own loop. Returns `None` when nothing is pending yet.
    pub fn try_next(&mut self) -> Option<ComputeEvent> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(event) => {
                if matches!(event, ComputeEvent::Done(_)) {
                    self.finished = true;
                    self.join_worker();
                }
                Some(event)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.finished = true;
                self.join_worker();
                Some(ComputeEvent::Done(Err(BridgeError::unavailable(
                    "solver worker disconnected",
                ))))
            }
        }
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
