//! Consumer loop: wander, eat ready cells, leave once full.

use std::sync::atomic::Ordering;

use carrotfield_types::CellState;
use tracing::debug;

use crate::actor::{Actor, Field, Role};
use crate::behavior::UnitExit;
use crate::config::BehaviorConfig;
use crate::movement::StepSource;

/// Run until the appetite is met, the consumer is caught, or a stop is
/// requested.
pub async fn forage(
    actor: &Actor,
    grid: &Field,
    config: &BehaviorConfig,
    steps: &mut dyn StepSource,
) -> UnitExit {
    let Role::Consumer {
        appetite,
        meals_eaten,
    } = actor.role()
    else {
        return UnitExit::Stopped;
    };

    loop {
        if !actor.is_running() {
            return UnitExit::Stopped;
        }
        if !actor.is_active() {
            return UnitExit::Caught;
        }
        if meals_eaten.load(Ordering::Acquire) >= *appetite {
            return UnitExit::Exhausted;
        }

        let pos = actor.wander(grid, steps);
        let cell = grid.cell(pos);

        if cell.state() == CellState::Ready {
            if actor.signal().suspend(config.eating_duration).await.is_interrupted() {
                return UnitExit::Stopped;
            }
            // Caught mid-meal: the cell survives.
            if !actor.is_active() {
                return UnitExit::Caught;
            }
            cell.damage();
            let eaten = actor.record_meal();
            debug!(
                actor_id = %actor.id(),
                position = %pos,
                eaten,
                appetite = *appetite,
                "Cell eaten"
            );
        }

        if actor
            .signal()
            .suspend(config.consumer_move_interval)
            .await
            .is_interrupted()
        {
            return UnitExit::Stopped;
        }
    }
}
