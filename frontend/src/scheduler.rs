use std::time::Duration;
use futures::future::LocalBoxFuture;
use gloo_timers::callback::Interval;
use shared::Scheduler;

#[derive(Clone, Copy, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Handle = Interval;

    fn schedule(&self, every: Duration, task: Box<dyn FnMut()>) -> Interval {
        let millis = u32::try_from(every.as_millis()).unwrap_or(u32::MAX);
        Interval::new(millis, task)
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
