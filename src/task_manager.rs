//! Tracks detached alert deliveries so shutdown can wait for them.
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// A registry of spawned background tasks.
///
/// Finished handles are pruned whenever a new task is spawned, so the list
/// only grows with the number of deliveries actually in flight.
#[derive(Clone, Debug, Default)]
pub struct TaskManager {
    handles: Arc<Mutex<Vec<(&'static str, JoinHandle<()>)>>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new task and adds its handle to the manager.
    pub fn spawn<F>(&self, name: &'static str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        debug!(task_name = name, "Spawning task");
        let handle = tokio::spawn(future);
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        handles.retain(|(_, h)| !h.is_finished());
        handles.push((name, handle));
    }

    /// Number of tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        let handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        handles.iter().filter(|(_, h)| !h.is_finished()).count()
    }

    /// Waits for all managed tasks to complete.
    pub async fn shutdown(&self) {
        let handles = self
            .handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect::<Vec<_>>();
        info!(
            "TaskManager shutting down. Waiting for {} tasks to complete...",
            handles.len()
        );

        let task_names: Vec<&'static str> = handles.iter().map(|(name, _)| *name).collect();
        let results = join_all(handles.into_iter().map(|(_, handle)| handle)).await;

        let mut panics = 0;
        for (task_name, result) in task_names.into_iter().zip(results) {
            if let Err(e) = result {
                error!(task_name, error = %e, "Task panicked before completing.");
                panics += 1;
            }
        }

        if panics > 0 {
            error!("{} tasks panicked during shutdown", panics);
        } else {
            info!("All tasks shut down gracefully.");
        }
    }
}
