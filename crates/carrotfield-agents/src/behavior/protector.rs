//! Protector loop: pursue the current target, or scan and patrol.

use tracing::info;

use crate::actor::{Actor, Field};
use crate::behavior::UnitExit;
use crate::config::BehaviorConfig;
use crate::movement::StepSource;

/// Run until stopped by the owning producer or the controller.
pub async fn guard(
    actor: &Actor,
    grid: &Field,
    config: &BehaviorConfig,
    steps: &mut dyn StepSource,
) -> UnitExit {
    while actor.is_running() {
        let live_target = actor
            .target()
            .and_then(|id| grid.find_actor(id))
            .filter(|target| target.is_active());

        if let Some(target) = live_target {
            let next = actor.position().step_toward(target.position());
            actor.move_to(next);
            if next == target.position() {
                target.deactivate();
                actor.set_target(None);
                info!(
                    actor_id = %actor.id(),
                    consumer_id = %target.id(),
                    position = %next,
                    "Consumer caught"
                );
            }
        } else {
            let found = grid.find_nearby_consumer(actor.position(), config.detection_range);
            actor.set_target(found.map(|consumer| consumer.id()));
            actor.wander(grid, steps);
        }

        if actor
            .signal()
            .suspend(config.protector_interval)
            .await
            .is_interrupted()
        {
            break;
        }
    }
    UnitExit::Stopped
}
