//! Behaviour loops.
//!
//! Every loop has the same shape: check the running flag, act on the
//! grid, then suspend on the actor's [`StopSignal`](crate::StopSignal).
//! A stop request interrupts the suspension and the loop unwinds without
//! finishing the half-done action.
//!
//! - [`producer`] -- plant empty cells, repair damaged ones, alert the
//!   paired protector.
//! - [`consumer`] -- wander and eat ready cells until the appetite is met.
//! - [`protector`] -- chase a target or scan for one.

pub mod consumer;
pub mod producer;
pub mod protector;

use std::sync::Arc;

use tracing::{debug, info};

use crate::actor::{Actor, Field, Role};
use crate::config::BehaviorConfig;
use crate::movement::StepSource;

/// Why an actor's loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitExit {
    /// The running flag was cleared by a stop request.
    Stopped,
    /// A consumer ate its fill.
    Exhausted,
    /// A consumer was deactivated by a protector.
    Caught,
}

impl UnitExit {
    /// Whether the actor reached a natural end of life (as opposed to
    /// being paused by a stop request).
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Caught)
    }
}

/// Run `actor`'s behaviour loop to completion.
///
/// This is the body of one execution unit. On a terminal exit the actor
/// is deactivated and unregistered from the grid; after a stop request it
/// stays registered so a later start can relaunch it. A producer always
/// stops its paired protector on the way out.
pub async fn run_unit(
    actor: Arc<Actor>,
    grid: Arc<Field>,
    config: Arc<BehaviorConfig>,
    mut steps: Box<dyn StepSource>,
) -> UnitExit {
    debug!(
        actor_id = %actor.id(),
        kind = %actor.kind(),
        position = %actor.position(),
        "Actor unit started"
    );

    let exit = match actor.role() {
        Role::Producer { companion } => {
            let exit = producer::tend(&actor, &grid, &config, steps.as_mut()).await;
            companion.request_stop();
            exit
        }
        Role::Consumer { .. } => consumer::forage(&actor, &grid, &config, steps.as_mut()).await,
        Role::Protector { .. } => protector::guard(&actor, &grid, &config, steps.as_mut()).await,
    };

    if exit.is_terminal() {
        actor.deactivate();
        grid.remove_actor(actor.id());
        info!(
            actor_id = %actor.id(),
            kind = %actor.kind(),
            reason = ?exit,
            meals_eaten = ?actor.meals_eaten(),
            "Actor left the field"
        );
    } else {
        debug!(actor_id = %actor.id(), kind = %actor.kind(), "Actor unit stopped");
    }
    exit
}
