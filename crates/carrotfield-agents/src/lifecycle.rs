//! Cooperative stop signalling for actor tasks.
//!
//! Each execution unit owns a [`StopSignal`]. The unit checks
//! [`is_running`](StopSignal::is_running) once per iteration and does all
//! of its waiting through [`suspend`](StopSignal::suspend), which returns
//! early the moment a stop is requested. A stop is ordinary control flow,
//! reported as [`Suspension::Interrupted`] rather than as an error.
//!
//! The flag lives in a [`watch`] channel rather than a
//! [`Notify`](tokio::sync::Notify): a stop that lands between the running
//! check and the start of the sleep is still observed, and
//! [`rearm`](StopSignal::rearm) leaves no stale wake-up behind for the
//! next run.

use std::time::Duration;

use tokio::sync::watch;

/// Outcome of an interruptible wait.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspension {
    /// The full duration elapsed.
    Elapsed,
    /// A stop was requested before or during the wait.
    Interrupted,
}

impl Suspension {
    /// Whether the wait was cut short by a stop request.
    pub const fn is_interrupted(self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// The `running` flag of one execution unit.
#[derive(Debug)]
pub struct StopSignal {
    stopped: watch::Sender<bool>,
}

impl StopSignal {
    /// A signal in the running state.
    pub fn new() -> Self {
        let (stopped, _initial_rx) = watch::channel(false);
        Self { stopped }
    }

    /// Whether the unit should keep looping.
    pub fn is_running(&self) -> bool {
        !*self.stopped.borrow()
    }

    /// Ask the unit to stop and wake it if it is suspended.
    pub fn request_stop(&self) {
        self.stopped.send_replace(true);
    }

    /// Put the signal back into the running state before a relaunch.
    pub fn rearm(&self) {
        self.stopped.send_replace(false);
    }

    /// Sleep for `duration`, or until a stop is requested.
    pub async fn suspend(&self, duration: Duration) -> Suspension {
        let mut rx = self.stopped.subscribe();
        if *rx.borrow_and_update() {
            return Suspension::Interrupted;
        }
        tokio::select! {
            biased;
            _ = rx.wait_for(|stopped| *stopped) => Suspension::Interrupted,
            () = tokio::time::sleep(duration) => Suspension::Elapsed,
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
