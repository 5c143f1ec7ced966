use std::time::Duration;
use futures::future::LocalBoxFuture;

/// Timer and task seam for the single-threaded client runtime.
pub trait Scheduler {
    /// Dropping the handle cancels the timer.
    type Handle: 'static;

    /// Runs `task` every `every`, starting one interval from now.
    fn schedule(&self, every: Duration, task: Box<dyn FnMut()>) -> Self::Handle;

    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}
