use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::debug;
use crate::api::PollApi;
use crate::controller::{Phase, SelectionChange, SyncConfig, SyncController, SyncState};
use crate::error::Result;
use crate::models::PollId;
use crate::scheduler::Scheduler;
use crate::submitter;
use crate::vote_guard::KeyValueStore;

/// Drives a [`SyncController`] with real timers and network calls.
///
/// Cloning is cheap and shares the session. Timers and in-flight requests
/// only hold weak references, so dropping every clone stops polling.
pub struct SyncSession<A, S: Scheduler, K> {
    inner: Rc<Inner<A, S, K>>,
}

impl<A, S: Scheduler, K> Clone for SyncSession<A, S, K> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

struct Inner<A, S: Scheduler, K> {
    api: Rc<A>,
    scheduler: S,
    controller: RefCell<SyncController<K>>,
    directory_timer: RefCell<Option<S::Handle>>,
    detail_timer: RefCell<Option<S::Handle>>,
    published: RefCell<Option<SyncState>>,
    on_change: Box<dyn Fn(&SyncState)>,
}

impl<A, S, K> SyncSession<A, S, K>
where
    A: PollApi + 'static,
    S: Scheduler + 'static,
    K: KeyValueStore + 'static,
{
    pub fn new(
        api: A,
        scheduler: S,
        store: K,
        config: SyncConfig,
        on_change: impl Fn(&SyncState) + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                api: Rc::new(api),
                scheduler,
                controller: RefCell::new(SyncController::new(store, config)),
                directory_timer: RefCell::new(None),
                detail_timer: RefCell::new(None),
                published: RefCell::new(None),
                on_change: Box::new(on_change),
            }),
        }
    }

    /// Starts the directory loop and fetches once right away.
    pub fn start(&self) {
        let every = self.inner.controller.borrow().config().directory_interval;
        let weak = Rc::downgrade(&self.inner);
        let handle = self.inner.scheduler.schedule(every, Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::directory_tick(&inner);
            }
        }));
        *self.inner.directory_timer.borrow_mut() = Some(handle);
        Inner::directory_tick(&self.inner);
    }

    pub fn select(&self, poll_id: PollId) {
        let changed = self.inner.controller.borrow_mut().select(poll_id);
        if changed {
            Inner::restart_detail(&self.inner);
            self.inner.publish();
        }
    }

    /// Casts the local user's vote on the selected poll.
    ///
    /// Local rejections return without touching the network.
    pub async fn vote(&self, option: usize) -> Result<()> {
        let ticket = self.inner.controller.borrow_mut().begin_vote(option);
        self.inner.publish();
        let ticket = ticket?;

        let api = self.inner.api.clone();
        let result = submitter::submit(api.as_ref(), ticket.poll_id, ticket.option).await;

        let outcome = self.inner.controller.borrow_mut().apply_vote(ticket, result);
        self.inner.publish();
        outcome
    }

    pub fn state(&self) -> SyncState {
        self.inner.controller.borrow().state().clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.controller.borrow().phase()
    }

    pub fn teardown(&self) {
        self.inner.controller.borrow_mut().teardown();
        self.inner.directory_timer.borrow_mut().take();
        self.inner.detail_timer.borrow_mut().take();
        debug!("sync session torn down");
    }
}

impl<A, S, K> Inner<A, S, K>
where
    A: PollApi + 'static,
    S: Scheduler + 'static,
    K: KeyValueStore + 'static,
{
    fn directory_tick(inner: &Rc<Self>) {
        let Some(ticket) = inner.controller.borrow_mut().begin_directory_fetch() else {
            return;
        };
        let api = inner.api.clone();
        let weak = Rc::downgrade(inner);
        inner.scheduler.spawn(Box::pin(async move {
            let result = api.list_polls().await;
            let Some(inner) = weak.upgrade() else { return };
            let change = inner.controller.borrow_mut().apply_directory(ticket, result);
            match change {
                SelectionChange::Selected(_) => Inner::restart_detail(&inner),
                SelectionChange::Cleared => {
                    inner.detail_timer.borrow_mut().take();
                }
                SelectionChange::Unchanged => {}
            }
            inner.publish();
        }));
    }

    fn detail_tick(inner: &Rc<Self>) {
        let Some(ticket) = inner.controller.borrow_mut().begin_detail_fetch() else {
            return;
        };
        let api = inner.api.clone();
        let weak = Rc::downgrade(inner);
        inner.scheduler.spawn(Box::pin(async move {
            let result = api.get_poll(ticket.target).await;
            let Some(inner) = weak.upgrade() else { return };
            inner.controller.borrow_mut().apply_detail(ticket, result);
            inner.publish();
        }));
    }

    /// Replaces the detail timer (dropping the old one cancels it) and
    /// fetches the newly selected poll right away.
    fn restart_detail(inner: &Rc<Self>) {
        let every = inner.controller.borrow().config().detail_interval;
        let weak: Weak<Self> = Rc::downgrade(inner);
        let handle = inner.scheduler.schedule(every, Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::detail_tick(&inner);
            }
        }));
        *inner.detail_timer.borrow_mut() = Some(handle);
        Inner::detail_tick(inner);
    }

    fn publish(&self) {
        let snapshot = {
            let controller = self.controller.borrow();
            if controller.is_closed() {
                return;
            }
            controller.state().clone()
        };
        let mut published = self.published.borrow_mut();
        if published.as_ref() == Some(&snapshot) {
            return;
        }
        *published = Some(snapshot.clone());
        drop(published);
        (self.on_change)(&snapshot);
    }
}
