//! Producer loop: wander, tend the cell underfoot, alert the protector.

use carrotfield_types::CellState;
use tracing::debug;

use crate::actor::{Actor, Field};
use crate::behavior::UnitExit;
use crate::config::BehaviorConfig;
use crate::movement::StepSource;

/// Run until stopped. Producers never finish on their own.
pub async fn tend(
    actor: &Actor,
    grid: &Field,
    config: &BehaviorConfig,
    steps: &mut dyn StepSource,
) -> UnitExit {
    while actor.is_running() {
        let pos = actor.wander(grid, steps);
        let cell = grid.cell(pos);

        match cell.state() {
            CellState::Damaged => {
                if actor.signal().suspend(config.repair_duration).await.is_interrupted() {
                    break;
                }
                cell.repair();
                debug!(actor_id = %actor.id(), position = %pos, "Cell repaired");
            }
            CellState::Empty => {
                if actor.signal().suspend(config.plant_duration).await.is_interrupted() {
                    break;
                }
                cell.plant();
                debug!(actor_id = %actor.id(), position = %pos, "Cell planted");
            }
            CellState::Growing | CellState::Ready => {}
        }

        if let (Some(consumer), Some(companion)) = (
            grid.find_nearby_consumer(pos, config.alert_radius),
            actor.companion(),
        ) {
            companion.set_target(Some(consumer.id()));
            debug!(
                actor_id = %actor.id(),
                consumer_id = %consumer.id(),
                "Protector alerted"
            );
        }

        if actor.signal().suspend(config.patrol_interval).await.is_interrupted() {
            break;
        }
    }
    UnitExit::Stopped
}
