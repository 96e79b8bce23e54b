//! The set of execution units a run has launched.
//!
//! [`UnitGroup`] tracks every Tokio task the controller spawns together
//! with the handle used to ask it to stop. [`UnitGroup::shutdown`]
//! broadcasts the stop, joins each task under a bounded timeout, and
//! aborts anything that overruns. Once shut down the group refuses new
//! launches until it is reopened, so a consumer spawned by a tick racing
//! a stop never escapes the join.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use carrotfield_agents::{Actor, StopSignal, UnitExit};
use carrotfield_types::{ActorId, ActorKind};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What a tracked task is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitLabel {
    /// One actor's behaviour loop.
    Actor {
        /// The actor.
        id: ActorId,
        /// Its kind.
        kind: ActorKind,
    },
    /// The periodic growth and spawn task.
    WorldTick,
}

impl std::fmt::Display for UnitLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Actor { id, kind } => write!(f, "{kind} {id}"),
            Self::WorldTick => f.write_str("world tick"),
        }
    }
}

/// Outcome of [`UnitGroup::shutdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Units that finished within the bound.
    pub stopped: usize,
    /// Units abandoned after the bound elapsed.
    pub timed_out: usize,
    /// Units that panicked or were cancelled before joining.
    pub failed: usize,
}

impl ShutdownReport {
    /// Total units the shutdown handled.
    pub const fn total(&self) -> usize {
        self.stopped
            .saturating_add(self.timed_out)
            .saturating_add(self.failed)
    }

    /// `true` if every unit stopped on its own.
    pub const fn is_clean(&self) -> bool {
        self.timed_out == 0 && self.failed == 0
    }
}

enum Stopper {
    Actor(Arc<Actor>),
    Signal(Arc<StopSignal>),
}

impl Stopper {
    fn request_stop(&self) {
        match self {
            Self::Actor(actor) => actor.request_stop(),
            Self::Signal(signal) => signal.request_stop(),
        }
    }
}

struct Unit {
    label: UnitLabel,
    stopper: Stopper,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Units {
    open: bool,
    running: Vec<Unit>,
}

/// Cancellation-aware group of running tasks.
#[derive(Default)]
pub struct UnitGroup {
    units: Mutex<Units>,
}

impl std::fmt::Debug for UnitGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = self.lock();
        f.debug_struct("UnitGroup")
            .field("open", &units.open)
            .field("units", &units.running.len())
            .finish()
    }
}

impl UnitGroup {
    /// Create a closed, empty group.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Units> {
        self.units.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accept launches again.
    pub fn open(&self) {
        self.lock().open = true;
    }

    /// Whether launches are currently accepted.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Number of tracked tasks that have not finished yet.
    pub fn len(&self) -> usize {
        self.lock()
            .running
            .iter()
            .filter(|unit| !unit.handle.is_finished())
            .count()
    }

    /// `true` if no tracked task is still running.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn an actor's loop. Returns `false`, without spawning, if the
    /// group is closed.
    pub fn launch_actor<F>(&self, actor: Arc<Actor>, unit: F) -> bool
    where
        F: Future<Output = UnitExit> + Send + 'static,
    {
        let label = UnitLabel::Actor {
            id: actor.id(),
            kind: actor.kind(),
        };
        self.launch(label, Stopper::Actor(actor), async move {
            unit.await;
        })
    }

    /// Spawn a task stopped through `signal`. Returns `false`, without
    /// spawning, if the group is closed.
    pub fn launch_signal<F>(&self, label: UnitLabel, signal: Arc<StopSignal>, unit: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.launch(label, Stopper::Signal(signal), unit)
    }

    fn launch<F>(&self, label: UnitLabel, stopper: Stopper, unit: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut units = self.lock();
        if !units.open {
            debug!(unit = %label, "Launch rejected, group closed");
            return false;
        }
        units.running.retain(|unit| !unit.handle.is_finished());
        let handle = tokio::spawn(unit);
        units.running.push(Unit {
            label,
            stopper,
            handle,
        });
        debug!(unit = %label, "Unit launched");
        true
    }

    /// Close the group, ask every unit to stop, and join each one within
    /// `timeout`. Units that overrun are aborted and counted as timed out.
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownReport {
        let units = {
            let mut units = self.lock();
            units.open = false;
            std::mem::take(&mut units.running)
        };

        for unit in &units {
            unit.stopper.request_stop();
        }

        let joins = units.into_iter().map(|unit| async move {
            let Unit { label, handle, .. } = unit;
            let abort = handle.abort_handle();
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(())) => Outcome::Stopped,
                Ok(Err(e)) => {
                    warn!(unit = %label, error = %e, "Unit ended abnormally");
                    Outcome::Failed
                }
                Err(_) => {
                    abort.abort();
                    warn!(
                        unit = %label,
                        timeout_ms = timeout.as_millis(),
                        "Unit did not stop in time, abandoning"
                    );
                    Outcome::TimedOut
                }
            }
        });

        let mut report = ShutdownReport::default();
        for outcome in join_all(joins).await {
            let slot = match outcome {
                Outcome::Stopped => &mut report.stopped,
                Outcome::TimedOut => &mut report.timed_out,
                Outcome::Failed => &mut report.failed,
            };
            *slot = slot.saturating_add(1);
        }

        info!(
            stopped = report.stopped,
            timed_out = report.timed_out,
            failed = report.failed,
            "Unit group shut down"
        );
        report
    }

    /// Close the group and abort every task without waiting.
    pub fn abort_all(&self) {
        let mut units = self.lock();
        units.open = false;
        for unit in units.running.drain(..) {
            unit.stopper.request_stop();
            unit.handle.abort();
        }
    }
}

impl Drop for UnitGroup {
    fn drop(&mut self) {
        self.abort_all();
    }
}

enum Outcome {
    Stopped,
    TimedOut,
    Failed,
}
