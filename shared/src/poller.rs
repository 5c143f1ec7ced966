use tracing::debug;

pub type Generation = u64;

/// Issued with every request; the response is only applied if the slot still
/// expects this exact target and generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub target: K,
    pub generation: Generation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response answers the current context and may be merged.
    Current,
    /// The context moved on while the request was in flight.
    Stale,
}

/// Bookkeeping for one periodically polled resource.
///
/// At most one request is outstanding at a time. Changing the target or
/// invalidating the slot bumps the generation, so anything already on the
/// wire is discarded when it lands.
#[derive(Debug)]
pub struct PollerSlot<K> {
    target: Option<K>,
    generation: Generation,
    in_flight: Option<Generation>,
    failures: u32,
}

impl<K> Default for PollerSlot<K> {
    fn default() -> Self {
        Self { target: None, generation: 0, in_flight: None, failures: 0 }
    }
}

impl<K: Clone + PartialEq + std::fmt::Debug> PollerSlot<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Points the slot at a new target. A response for the previous target is
    /// no longer tracked, so the new target can be fetched right away.
    pub fn start_for(&mut self, target: K) {
        self.generation += 1;
        self.target = Some(target);
        self.in_flight = None;
        self.failures = 0;
    }

    pub fn stop(&mut self) {
        self.generation += 1;
        self.target = None;
        self.in_flight = None;
        self.failures = 0;
    }

    /// Discards the outstanding response, if any, without allowing a second
    /// request for the same target until it has landed.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Returns `None` when there is nothing to poll or a request is still out.
    pub fn begin(&mut self) -> Option<Ticket<K>> {
        let key = self.target.clone()?;
        if let Some(outstanding) = self.in_flight {
            debug!(?key, outstanding, "previous request outstanding, skipping tick");
            return None;
        }
        self.in_flight = Some(self.generation);
        Some(Ticket { target: key, generation: self.generation })
    }

    pub fn finish(&mut self, ticket: &Ticket<K>) -> Completion {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
        let current = ticket.generation == self.generation
            && self.target.as_ref() == Some(&ticket.target);
        if current {
            Completion::Current
        } else {
            debug!(key = ?ticket.target, issued = ticket.generation, current = self.generation,
                "discarding stale response");
            Completion::Stale
        }
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    pub fn record_failure(&mut self) -> u32 {
        self.failures = self.failures.saturating_add(1);
        self.failures
    }
}
