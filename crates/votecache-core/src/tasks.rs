//! Fire-and-forget background work.
//!
//! Cache writes run detached from the request that produced the data: the
//! caller already has its result, so a failed write is only logged.

use std::future::Future;
use std::sync::Mutex;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawns `task` and logs its error, if any, under `label`.
pub fn spawn_detached<F, E>(label: &'static str, task: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    tokio::spawn(async move {
        match task.await {
            Ok(()) => debug!(task = label, "Detached task finished"),
            Err(e) => warn!(task = label, error = %e, "Detached task failed"),
        }
    })
}

/// Keeps handles of detached tasks so a short-lived process can wait for
/// them before exiting.
#[derive(Debug, Default)]
pub struct DetachedTasks {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl DetachedTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut handles) = self.handles.lock() {
            handles.retain(|h| !h.is_finished());
            handles.push(handle);
        }
    }

    pub fn spawn<F, E>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.track(spawn_detached(label, task));
    }

    pub fn pending(&self) -> usize {
        self.handles
            .lock()
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Waits for every tracked task, including ones spawned while waiting.
    pub async fn drain(&self) {
        loop {
            let batch: Vec<JoinHandle<()>> = match self.handles.lock() {
                Ok(mut handles) => handles.drain(..).collect(),
                Err(_) => return,
            };
            if batch.is_empty() {
                return;
            }
            for handle in batch {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Detached task panicked or was cancelled");
                }
            }
        }
    }
}
