//! Call-scoped deadlines.
//!
//! Each invocation owns its own [`Deadline`]. The worker thread running the
//! handler exposes it through a thread-local slot so a cooperative handler can
//! poll [`current`]. Blocking-pool threads are reused across invocations, so
//! the slot is captured on entry and restored on exit by [`DeadlineScope`].
//!
//! # State Transitions
//! ```text
//! Armed → Fired      timer won; outcome is a timeout
//! Armed → Disarmed   handler returned first; a late timer is ignored
//! ```
//! Exactly one transition out of `Armed` succeeds.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const DISARMED: u8 = 2;

thread_local! {
    static CURRENT: RefCell<Option<Deadline>> = const { RefCell::new(None) };
}

/// The deadline installed on the calling thread, if any.
pub fn current() -> Option<Deadline> {
    CURRENT.with(|slot| slot.borrow().clone())
}

#[derive(Debug)]
struct Inner {
    budget: Duration,
    expires_at: Instant,
    state: AtomicU8,
}

/// A one-shot wall-clock deadline for a single invocation.
#[derive(Debug, Clone)]
pub struct Deadline {
    inner: Arc<Inner>,
}

impl Deadline {
    /// Arm a deadline `budget` from now.
    pub fn arm(budget: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                budget,
                expires_at: Instant::now() + budget,
                state: AtomicU8::new(ARMED),
            }),
        }
    }

    pub fn budget(&self) -> Duration {
        self.inner.budget
    }

    pub fn expires_at(&self) -> Instant {
        self.inner.expires_at
    }

    /// Time left before the deadline, zero once passed.
    pub fn remaining(&self) -> Duration {
        self.inner.expires_at.saturating_duration_since(Instant::now())
    }

    /// True once the timer has fired for this invocation.
    pub fn is_expired(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == FIRED
    }

    pub fn is_armed(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == ARMED
    }

    /// Deliver the timer notification.
    ///
    /// Returns false if the deadline was already disarmed (lost race) or fired.
    pub fn fire(&self) -> bool {
        self.transition(FIRED)
    }

    /// Disarm the deadline. Returns false if the timer already fired.
    pub fn disarm(&self) -> bool {
        self.transition(DISARMED)
    }

    fn transition(&self, to: u8) -> bool {
        self.inner
            .state
            .compare_exchange(ARMED, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn same(&self, other: &Deadline) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Installs a deadline on the current thread for the scope's lifetime.
///
/// Whatever the slot held before is captured verbatim and put back on drop,
/// together with disarming the installed deadline. Drop runs on every exit
/// path, unwinding included.
#[derive(Debug)]
pub struct DeadlineScope {
    installed: Deadline,
    previous: Option<Deadline>,
}

impl DeadlineScope {
    pub fn enter(deadline: Deadline) -> Self {
        let previous = CURRENT.with(|slot| slot.borrow_mut().replace(deadline.clone()));
        if previous.is_some() {
            tracing::trace!("Deadline scope entered over an existing deadline");
        }
        Self {
            installed: deadline,
            previous,
        }
    }
}

impl Drop for DeadlineScope {
    fn drop(&mut self) {
        self.installed.disarm();
        let previous = self.previous.take();
        CURRENT.with(|slot| {
            let mut slot = slot.borrow_mut();
            debug_assert!(
                slot.as_ref().is_some_and(|d| d.same(&self.installed)),
                "deadline scopes must be released in reverse order"
            );
            *slot = previous;
        });
    }
}
