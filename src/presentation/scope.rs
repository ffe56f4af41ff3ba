use std::future::Future;
use tokio::task::AbortHandle;

/// Owns the tasks spawned on behalf of a view model.
///
/// Dropping the scope aborts every task that is still running.
#[derive(Debug, Default)]
pub struct TaskScope {
    tasks: Vec<AbortHandle>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `future` on the current tokio runtime.
    ///
    /// Panics if called outside a runtime, like [`tokio::spawn`].
    pub fn spawn<F>(&mut self, future: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|task| !task.is_finished());
        let handle = tokio::spawn(future).abort_handle();
        self.tasks.push(handle.clone());
        handle
    }

    /// Number of tasks that have not finished yet.
    pub fn active(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    pub fn cancel_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
