//! Execution contexts for presentation handoff.
//!
//! The queue decides *which* request runs; the center's executor decides
//! *where* the presentation work happens. UI toolkits usually require it to
//! happen on their main thread, which [`MainQueue`] models as a job channel
//! drained by the UI loop.

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A unit of presentation work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs presentation jobs.
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

/// Runs jobs immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Runs jobs as tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// An executor for the runtime the caller runs in, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, job: Job) {
        self.handle.spawn(async move { job() });
    }
}

/// Sending half of a [`MainQueue`].
#[derive(Debug, Clone)]
pub struct MainQueueExecutor {
    tx: mpsc::UnboundedSender<Job>,
}

impl Executor for MainQueueExecutor {
    fn execute(&self, job: Job) {
        if self.tx.send(job).is_err() {
            warn!("Main queue is closed, dropping presentation job");
        }
    }
}

/// A FIFO of jobs to run on a single, UI-affine thread.
///
/// The owning thread drains it either by polling
/// [`run_pending`](Self::run_pending) from its event loop or by awaiting
/// [`run`](Self::run).
pub struct MainQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl MainQueue {
    pub fn new() -> (Self, MainQueueExecutor) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, MainQueueExecutor { tx })
    }

    /// Run every job queued so far. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Run jobs as they arrive until cancelled or every executor is dropped.
    pub async fn run(&mut self, cancel_token: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!("Main queue shutting down");
                    break;
                }
                job = self.rx.recv() => match job {
                    Some(job) => job(),
                    None => {
                        debug!("All main queue executors dropped");
                        break;
                    }
                },
            }
        }
    }
}
