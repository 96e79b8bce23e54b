//! Many actors running concurrently on one field.
//!
//! These tests launch real behaviour loops on a paused clock and check
//! the invariants that must hold however the tasks interleave.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::sync::Arc;
use std::time::Duration;

use carrotfield_agents::{Actor, BehaviorConfig, Field, RandomSteps, UnitExit, run_unit};
use carrotfield_types::{ActorKind, CellState, Position};
use carrotfield_world::MAX_GROWTH;

fn ripen(grid: &Field) {
    for (_, cell) in grid.cells() {
        cell.plant();
        for _ in 0..MAX_GROWTH {
            cell.grow();
        }
    }
}

#[tokio::test(start_paused = true)]
async fn mixed_population_keeps_cells_consistent() {
    let grid = Arc::new(Field::new(8).unwrap());
    ripen(&grid);
    let config = Arc::new(BehaviorConfig::default());

    let mut actors = Vec::new();
    for i in 0..3_u32 {
        let dog = Arc::new(Actor::protector(Position::new(i + 1, i + 1)));
        let farmer = Arc::new(Actor::producer(Position::new(i, i), Arc::clone(&dog)));
        grid.add_actor(Arc::clone(&dog));
        grid.add_actor(Arc::clone(&farmer));
        actors.push(dog);
        actors.push(farmer);
    }
    for i in 0..4_u32 {
        let rabbit = Arc::new(Actor::consumer(Position::new(7 - i, i), 3));
        grid.add_actor(Arc::clone(&rabbit));
        actors.push(rabbit);
    }

    let mut units = Vec::new();
    for (seed, actor) in (0_u64..).zip(&actors) {
        units.push(tokio::spawn(run_unit(
            Arc::clone(actor),
            Arc::clone(&grid),
            Arc::clone(&config),
            Box::new(RandomSteps::seeded(seed)),
        )));
    }

    for _ in 0..20 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        grid.update_growth();
        for (_, cell) in grid.cells() {
            let snap = cell.snapshot();
            match snap.state {
                CellState::Empty | CellState::Damaged => assert_eq!(snap.growth_stage, 0),
                CellState::Growing => assert!(snap.growth_stage < MAX_GROWTH),
                CellState::Ready => assert_eq!(snap.growth_stage, MAX_GROWTH),
            }
        }
    }

    for actor in &actors {
        actor.request_stop();
    }
    for unit in units {
        let exit = unit.await.unwrap();
        assert!(matches!(
            exit,
            UnitExit::Stopped | UnitExit::Exhausted | UnitExit::Caught
        ));
    }

    // Producers and protectors never leave on their own.
    let counts = grid.actor_counts();
    assert_eq!(counts.producers, 3);
    assert_eq!(counts.protectors, 3);
    assert!(
        grid.actors()
            .iter()
            .filter(|a| a.kind() == ActorKind::Consumer)
            .all(|a| a.meals_eaten().unwrap() <= 3)
    );
}

#[tokio::test(start_paused = true)]
async fn stopping_a_producer_stops_its_protector() {
    let grid = Arc::new(Field::new(6).unwrap());
    let config = Arc::new(BehaviorConfig::default());
    let dog = Arc::new(Actor::protector(Position::new(1, 1)));
    let farmer = Arc::new(Actor::producer(Position::new(0, 0), Arc::clone(&dog)));
    grid.add_actor(Arc::clone(&dog));
    grid.add_actor(Arc::clone(&farmer));

    let dog_unit = tokio::spawn(run_unit(
        Arc::clone(&dog),
        Arc::clone(&grid),
        Arc::clone(&config),
        Box::new(RandomSteps::seeded(1)),
    ));
    let farmer_unit = tokio::spawn(run_unit(
        Arc::clone(&farmer),
        Arc::clone(&grid),
        config,
        Box::new(RandomSteps::seeded(2)),
    ));

    tokio::time::sleep(Duration::from_secs(3)).await;
    farmer.request_stop();

    assert_eq!(farmer_unit.await.unwrap(), UnitExit::Stopped);
    assert_eq!(dog_unit.await.unwrap(), UnitExit::Stopped);
    assert!(!dog.is_running());
    assert_eq!(grid.actors().len(), 2);
}
