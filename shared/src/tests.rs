#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;
    use futures::channel::oneshot;
    use futures::executor::{LocalPool, LocalSpawner};
    use futures::future::LocalBoxFuture;
    use futures::task::LocalSpawnExt;
    use crate::{
        MemoryStore, Phase, Poll, PollApi, PollId, PollSummary, Result, Scheduler, SyncConfig,
        SyncError, SyncSession, SyncState,
    };

    const TICK: Duration = Duration::from_secs(3);

    struct Timer {
        every: Duration,
        due: Duration,
        task: Rc<RefCell<Box<dyn FnMut()>>>,
        cancelled: Rc<Cell<bool>>,
    }

    struct TimerHandle(Rc<Cell<bool>>);

    impl Drop for TimerHandle {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[derive(Clone)]
    struct ManualScheduler {
        spawner: LocalSpawner,
        now: Rc<Cell<Duration>>,
        timers: Rc<RefCell<Vec<Timer>>>,
    }

    impl Scheduler for ManualScheduler {
        type Handle = TimerHandle;

        fn schedule(&self, every: Duration, task: Box<dyn FnMut()>) -> TimerHandle {
            let cancelled = Rc::new(Cell::new(false));
            self.timers.borrow_mut().push(Timer {
                every,
                due: self.now.get() + every,
                task: Rc::new(RefCell::new(task)),
                cancelled: cancelled.clone(),
            });
            TimerHandle(cancelled)
        }

        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            self.spawner.spawn_local(task).unwrap();
        }
    }

    type Reply<T> = oneshot::Sender<Result<T>>;

    #[derive(Default)]
    struct Wire {
        directory: RefCell<VecDeque<Reply<Vec<PollSummary>>>>,
        detail: RefCell<VecDeque<(PollId, Reply<Poll>)>>,
        votes: RefCell<VecDeque<(PollId, usize, Reply<Poll>)>>,
        vote_calls: Cell<usize>,
    }

    /// Every call parks until the test answers it.
    #[derive(Clone, Default)]
    struct GatedApi(Rc<Wire>);

    async fn park<T>(rx: oneshot::Receiver<Result<T>>) -> Result<T> {
        rx.await.unwrap_or_else(|_| Err(SyncError::Transient("request dropped".into())))
    }

    impl PollApi for GatedApi {
        async fn list_polls(&self) -> Result<Vec<PollSummary>> {
            let (tx, rx) = oneshot::channel();
            self.0.directory.borrow_mut().push_back(tx);
            park(rx).await
        }

        async fn get_poll(&self, id: PollId) -> Result<Poll> {
            let (tx, rx) = oneshot::channel();
            self.0.detail.borrow_mut().push_back((id, tx));
            park(rx).await
        }

        async fn cast_vote(&self, id: PollId, option: usize) -> Result<Poll> {
            self.0.vote_calls.set(self.0.vote_calls.get() + 1);
            let (tx, rx) = oneshot::channel();
            self.0.votes.borrow_mut().push_back((id, option, tx));
            park(rx).await
        }
    }

    type TestSession = SyncSession<GatedApi, ManualScheduler, Rc<MemoryStore>>;

    struct Harness {
        pool: LocalPool,
        scheduler: ManualScheduler,
        wire: Rc<Wire>,
        session: TestSession,
        updates: Rc<RefCell<Vec<SyncState>>>,
    }

    impl Harness {
        fn new(store: Rc<MemoryStore>) -> Self {
            let pool = LocalPool::new();
            let scheduler = ManualScheduler {
                spawner: pool.spawner(),
                now: Rc::new(Cell::new(Duration::ZERO)),
                timers: Rc::default(),
            };
            let api = GatedApi::default();
            let wire = api.0.clone();
            let updates = Rc::new(RefCell::new(Vec::new()));
            let sink = updates.clone();
            let session = SyncSession::new(
                api,
                scheduler.clone(),
                store,
                SyncConfig::default(),
                move |state: &SyncState| sink.borrow_mut().push(state.clone()),
            );
            let mut harness = Self { pool, scheduler, wire, session, updates };
            harness.session.start();
            harness.settle();
            harness
        }

        fn settle(&mut self) {
            self.pool.run_until_stalled();
        }

        fn advance(&mut self, by: Duration) {
            let now = self.scheduler.now.get() + by;
            self.scheduler.now.set(now);
            self.scheduler.timers.borrow_mut().retain(|t| !t.cancelled.get());
            let due: Vec<_> = self.scheduler.timers.borrow_mut().iter_mut()
                .filter(|t| t.due <= now)
                .map(|t| {
                    t.due += t.every;
                    (t.task.clone(), t.cancelled.clone())
                })
                .collect();
            for (task, cancelled) in due {
                if !cancelled.get() {
                    let mut task = task.borrow_mut();
                    (*task)();
                }
            }
            self.settle();
        }

        fn answer_directory(&mut self, result: Result<Vec<PollSummary>>) {
            let reply = self.wire.directory.borrow_mut().pop_front().expect("no directory request");
            let _ = reply.send(result);
            self.settle();
        }

        fn answer_detail(&mut self, result: Result<Poll>) -> PollId {
            let (id, reply) = self.wire.detail.borrow_mut().pop_front().expect("no detail request");
            let _ = reply.send(result);
            self.settle();
            id
        }

        fn answer_vote(&mut self, result: Result<Poll>) -> (PollId, usize) {
            let (id, option, reply) = self.wire.votes.borrow_mut().pop_front().expect("no vote request");
            let _ = reply.send(result);
            self.settle();
            (id, option)
        }

        fn pending_directory(&self) -> usize {
            self.wire.directory.borrow().len()
        }

        fn pending_detail(&self) -> Vec<PollId> {
            self.wire.detail.borrow().iter().map(|(id, _)| *id).collect()
        }

        fn vote(&mut self, option: usize) -> Rc<RefCell<Option<Result<()>>>> {
            let outcome = Rc::new(RefCell::new(None));
            let slot = outcome.clone();
            let session = self.session.clone();
            self.pool.spawner().spawn_local(async move {
                *slot.borrow_mut() = Some(session.vote(option).await);
            }).unwrap();
            self.settle();
            outcome
        }

        fn select(&mut self, poll_id: PollId) {
            self.session.select(poll_id);
            self.settle();
        }

        fn state(&self) -> SyncState {
            self.session.state()
        }
    }

    fn summary(id: PollId, question: &str) -> PollSummary {
        PollSummary { id, question: question.into() }
    }

    fn poll(id: PollId, votes: &[u64]) -> Poll {
        Poll {
            id,
            question: "A".into(),
            options: ["X", "Y"].iter().take(votes.len()).map(|o| o.to_string()).collect(),
            votes: votes.to_vec(),
        }
    }

    #[test]
    fn test_vote_response_wins_over_concurrent_detail() {
        let mut h = Harness::new(Rc::default());
        assert_eq!(h.session.phase(), Phase::Idle);

        h.answer_directory(Ok(vec![summary(1, "A")]));
        assert_eq!(h.state().selected_poll_id, Some(1));
        assert_eq!(h.pending_detail(), vec![1]);
        h.answer_detail(Ok(poll(1, &[0, 0])));
        assert_eq!(h.session.phase(), Phase::Viewing(1));

        // next scheduled refresh is on the wire when the user votes
        h.advance(TICK);
        assert_eq!(h.pending_detail(), vec![1]);

        let outcome = h.vote(1);
        assert_eq!(h.session.phase(), Phase::Voting(1));
        assert_eq!(h.answer_vote(Ok(poll(1, &[0, 1]))), (1, 1));
        assert_eq!(*outcome.borrow(), Some(Ok(())));

        h.answer_detail(Ok(poll(1, &[0, 0])));
        let state = h.state();
        assert_eq!(state.selected_poll.unwrap().votes, vec![0, 1]);
        assert_eq!(state.own_vote, Some(1));
        assert_eq!(h.session.phase(), Phase::Viewing(1));

        // regular merging resumes with the following tick
        h.advance(TICK);
        h.answer_detail(Ok(poll(1, &[4, 2])));
        assert_eq!(h.state().selected_poll.unwrap().votes, vec![4, 2]);
        assert_eq!(h.state().own_vote, Some(1));
    }

    #[test]
    fn test_already_voted_never_reaches_submitter() {
        let store = Rc::new(MemoryStore::new().with_entry("poll_voted_1", "0"));
        let mut h = Harness::new(store);
        h.answer_directory(Ok(vec![summary(1, "A")]));
        h.answer_detail(Ok(poll(1, &[5, 2])));
        assert_eq!(h.state().own_vote, Some(0));

        let outcome = h.vote(1);
        assert_eq!(*outcome.borrow(), Some(Err(SyncError::AlreadyVoted { poll_id: 1, option: 0 })));
        assert_eq!(h.wire.vote_calls.get(), 0);
        assert_eq!(h.state().own_vote, Some(0));
        assert_eq!(h.state().selected_poll.unwrap().votes, vec![5, 2]);
    }

    #[test]
    fn test_failing_directory_ticks_keep_last_snapshot() {
        let mut h = Harness::new(Rc::default());
        h.answer_directory(Ok(vec![summary(1, "A"), summary(2, "B")]));

        for _ in 0..2 {
            h.advance(TICK);
            h.answer_directory(Err(SyncError::Transient("connection refused".into())));
        }
        let state = h.state();
        assert_eq!(state.directory, vec![summary(1, "A"), summary(2, "B")]);
        assert!(!state.directory_stale);

        h.advance(TICK);
        h.answer_directory(Err(SyncError::rejection(500, "boom")));
        assert!(h.state().directory_stale);
        assert_eq!(h.state().directory.len(), 2);
    }

    #[test]
    fn test_ticks_are_skipped_while_request_outstanding() {
        let mut h = Harness::new(Rc::default());
        assert_eq!(h.pending_directory(), 1);
        h.advance(TICK);
        h.advance(TICK);
        assert_eq!(h.pending_directory(), 1);

        h.answer_directory(Ok(vec![]));
        assert_eq!(h.session.phase(), Phase::Listing);
        h.advance(TICK);
        assert_eq!(h.pending_directory(), 1);
    }

    #[test]
    fn test_switching_poll_discards_late_detail() {
        let mut h = Harness::new(Rc::default());
        h.answer_directory(Ok(vec![summary(1, "A"), summary(2, "B")]));
        assert_eq!(h.pending_detail(), vec![1]);

        h.select(2);
        assert_eq!(h.pending_detail(), vec![1, 2]);
        assert_eq!(h.answer_detail(Ok(poll(1, &[9, 9]))), 1);
        assert_eq!(h.state().selected_poll, None);

        assert_eq!(h.answer_detail(Ok(poll(2, &[1, 0]))), 2);
        assert_eq!(h.state().selected_poll.unwrap().id, 2);

        // only the new poll's timer is still running
        h.advance(TICK);
        assert_eq!(h.pending_detail(), vec![2]);
    }

    #[test]
    fn test_failed_vote_surfaces_error_and_allows_retry() {
        let mut h = Harness::new(Rc::default());
        h.answer_directory(Ok(vec![summary(1, "A")]));
        h.answer_detail(Ok(poll(1, &[2, 2])));

        let outcome = h.vote(0);
        h.answer_vote(Err(SyncError::rejection(404, "Poll not found")));
        assert!(matches!(*outcome.borrow(), Some(Err(SyncError::ServerRejection { .. }))));
        let state = h.state();
        assert_eq!(state.own_vote, None);
        assert_eq!(state.selected_poll.unwrap().votes, vec![2, 2]);
        assert_eq!(state.last_error.as_deref(), Some("This poll is no longer available."));

        let retry = h.vote(0);
        h.answer_vote(Ok(poll(1, &[3, 2])));
        assert_eq!(*retry.borrow(), Some(Ok(())));
        assert_eq!(h.wire.vote_calls.get(), 2);
        assert_eq!(h.state().last_error, None);
    }

    #[test]
    fn test_vote_guard_survives_new_session() {
        let store = Rc::new(MemoryStore::new());
        {
            let mut h = Harness::new(store.clone());
            h.answer_directory(Ok(vec![summary(1, "A")]));
            h.answer_detail(Ok(poll(1, &[0, 0])));
            h.vote(1);
            h.answer_vote(Ok(poll(1, &[0, 1])));
        }

        let mut h = Harness::new(store);
        h.answer_directory(Ok(vec![summary(1, "A")]));
        assert_eq!(h.state().own_vote, Some(1));
    }

    #[test]
    fn test_teardown_stops_polling_and_updates() {
        let mut h = Harness::new(Rc::default());
        h.answer_directory(Ok(vec![summary(1, "A")]));
        let published = h.updates.borrow().len();

        h.session.teardown();
        h.answer_detail(Ok(poll(1, &[1, 1])));
        h.advance(TICK);
        h.advance(TICK);

        assert_eq!(h.pending_directory(), 0);
        assert!(h.pending_detail().is_empty());
        assert_eq!(h.state().selected_poll, None);
        assert_eq!(h.updates.borrow().len(), published);
    }

    #[test]
    fn test_vote_landing_after_teardown_is_remembered() {
        let store = Rc::new(MemoryStore::new());
        {
            let mut h = Harness::new(store.clone());
            h.answer_directory(Ok(vec![summary(1, "A")]));
            h.answer_detail(Ok(poll(1, &[0, 0])));
            let outcome = h.vote(1);
            h.session.teardown();
            h.answer_vote(Ok(poll(1, &[0, 1])));
            assert_eq!(*outcome.borrow(), Some(Ok(())));

            let refused = h.vote(0);
            assert_eq!(*refused.borrow(), Some(Err(SyncError::Closed)));
        }

        let mut h = Harness::new(store);
        h.answer_directory(Ok(vec![summary(1, "A")]));
        assert_eq!(h.state().own_vote, Some(1));
    }

    #[test]
    fn test_identical_snapshots_publish_once() {
        let mut h = Harness::new(Rc::default());
        h.answer_directory(Ok(vec![summary(1, "A")]));
        h.answer_detail(Ok(poll(1, &[1, 1])));
        let published = h.updates.borrow().len();

        h.advance(TICK);
        h.answer_directory(Ok(vec![summary(1, "A")]));
        h.answer_detail(Ok(poll(1, &[1, 1])));
        assert_eq!(h.updates.borrow().len(), published);

        h.advance(TICK);
        h.answer_detail(Ok(poll(1, &[1, 2])));
        assert_eq!(h.updates.borrow().len(), published + 1);
    }
}
