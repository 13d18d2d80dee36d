//! Live-mode scheduling
//!
//! A live session re-runs extraction on a fixed interval. Each iteration is
//! issued a [`RequestTicket`]; results handed back through
//! [`LiveSession::accept`] are kept only if no newer result has been accepted
//! and the session is still running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Sequence number of one live-mode request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Shareable stop flag for a [`LiveSession`].
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct LiveSession {
    next_ticket: AtomicU64,
    // 0 means nothing accepted yet; issued tickets start at 1
    last_accepted: AtomicU64,
    cancel: CancelHandle,
}

impl LiveSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Last ticket whose result was kept.
    pub fn latest_accepted(&self) -> Option<RequestTicket> {
        match self.last_accepted.load(Ordering::SeqCst) {
            0 => None,
            seq => Some(RequestTicket(seq)),
        }
    }

    /// Returns `value` if it answers the newest request seen so far, `None`
    /// if it is stale or the session was cancelled.
    pub fn accept<T>(&self, ticket: RequestTicket, value: T) -> Option<T> {
        if self.is_cancelled() {
            debug!(ticket = ticket.0, "Discarding result after cancellation");
            return None;
        }

        let updated = self
            .last_accepted
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                (ticket.0 > last).then_some(ticket.0)
            });

        match updated {
            Ok(_) => Some(value),
            Err(last) => {
                warn!(ticket = ticket.0, latest = last, "Dropping stale live result");
                None
            }
        }
    }

    /// Calls `tick` with a fresh ticket every `interval` until cancelled.
    /// Cancellation is observed between iterations, never inside `tick`.
    /// Returns the number of iterations run.
    pub fn run<F>(&self, interval: Duration, mut tick: F) -> u64
    where
        F: FnMut(RequestTicket),
    {
        info!(interval_ms = interval.as_millis() as u64, "Live mode started");
        let mut iterations = 0;

        while !self.is_cancelled() {
            let ticket = self.issue();
            tick(ticket);
            iterations += 1;
            self.wait(interval);
        }

        info!(iterations, "Live mode stopped");
        iterations
    }

    fn wait(&self, interval: Duration) {
        let deadline = Instant::now() + interval;
        loop {
            if self.is_cancelled() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            std::thread::sleep((deadline - now).min(CANCEL_POLL));
        }
    }
}
