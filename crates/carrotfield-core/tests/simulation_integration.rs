//! End-to-end tests of the controller lifecycle: start, bounded stop,
//! save, and load.
//!
//! Every test runs on a paused clock so actor think-times advance
//! deterministically.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use carrotfield_agents::Actor;
use carrotfield_core::{PersistenceError, Simulation, SimulationConfig, SimulationError};
use carrotfield_types::{CellState, Position};
use carrotfield_world::MAX_GROWTH;
use carrotfield_world::grid::MAX_GRID_SIZE;

fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        grid_size: 10,
        producer_count: 2,
        spawn_rate: 0.0,
        seed: Some(99),
        ..SimulationConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn stop_joins_every_suspended_unit() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    sim.grid()
        .add_actor(Arc::new(Actor::consumer(Position::new(0, 0), 3)));
    assert_eq!(sim.grid().actors().len(), 5);

    assert!(sim.start());
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(sim.unit_count(), 6);

    let report = sim.stop().await;
    assert_eq!(report.stopped, 6);
    assert_eq!(report.timed_out, 0);
    assert!(!sim.is_running());
    assert_eq!(sim.unit_count(), 0);

    let grid = sim.grid();
    let actors = grid.actors();
    assert_eq!(actors.len(), 5);
    assert!(actors.iter().all(|actor| !actor.is_running()));

    grid.clear_actors();
    assert!(grid.actors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn start_twice_launches_one_tick() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    assert!(sim.start());
    assert!(!sim.start());
    assert_eq!(sim.unit_count(), 5);
    sim.stop().await;
}

#[tokio::test(start_paused = true)]
async fn restart_relaunches_registered_actors() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    assert!(sim.start());
    tokio::time::sleep(Duration::from_millis(100)).await;
    sim.stop().await;

    assert!(sim.start());
    assert_eq!(sim.unit_count(), 5);
    assert!(sim.grid().actors().iter().all(|actor| actor.is_running()));
    sim.stop().await;
}

#[tokio::test(start_paused = true)]
async fn save_then_load_reproduces_cells() {
    let source = Simulation::new(quiet_config()).unwrap();
    let grid = source.grid();
    grid.cell(Position::new(0, 0)).damage();
    grid.cell(Position::new(3, 4)).plant();
    grid.cell(Position::new(3, 4)).grow();
    let ready = grid.cell(Position::new(9, 9));
    ready.plant();
    for _ in 0..MAX_GROWTH {
        ready.grow();
    }

    let mut saved = Vec::new();
    source.save_state(&mut saved).unwrap();

    let mut target = Simulation::new(quiet_config()).unwrap();
    target.load_state(saved.as_slice()).await.unwrap();
    assert!(target.is_running());

    let restored = target.grid();
    assert_eq!(restored.cell_snapshots(), grid.cell_snapshots());
    assert_eq!(restored.cell(Position::new(9, 9)).state(), CellState::Ready);
    assert_eq!(restored.cell(Position::new(9, 9)).growth_stage(), MAX_GROWTH);

    let counts = target.actor_counts();
    assert_eq!(counts.producers, 2);
    assert_eq!(counts.protectors, 2);
    assert_eq!(counts.consumers, 0);
    target.stop().await;
}

#[tokio::test(start_paused = true)]
async fn load_clears_previous_actors() {
    let source = Simulation::new(quiet_config()).unwrap();
    let mut saved = Vec::new();
    source.save_state(&mut saved).unwrap();

    let mut sim = Simulation::new(quiet_config()).unwrap();
    let old_grid = sim.grid();
    old_grid.add_actor(Arc::new(Actor::consumer(Position::new(1, 1), 4)));
    assert!(sim.start());

    sim.load_state(saved.as_slice()).await.unwrap();
    assert!(old_grid.actors().is_empty());
    assert_eq!(sim.grid().actors().len(), 4);
    sim.stop().await;
}

#[tokio::test(start_paused = true)]
async fn corrupt_load_leaves_simulation_stopped() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    assert!(sim.start());

    let err = sim.load_state(&b"{ \"size\": "[..]).await.unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Persistence {
            source: PersistenceError::Json { .. }
        }
    ));
    assert!(!sim.is_running());
    assert_eq!(sim.grid().actors().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn load_rejects_truncated_record() {
    let source = Simulation::new(quiet_config()).unwrap();
    let mut snapshot = source.snapshot();
    snapshot.cells.truncate(10);
    let json = serde_json::to_vec(&snapshot).unwrap();

    let mut sim = Simulation::new(quiet_config()).unwrap();
    let err = sim.load_state(json.as_slice()).await.unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Persistence {
            source: PersistenceError::Corrupt { .. }
        }
    ));
    assert!(!sim.is_running());
}

#[tokio::test(start_paused = true)]
async fn file_round_trip_and_missing_file() {
    let dir = std::env::temp_dir().join(format!("carrotfield-core-test-{}", std::process::id()));
    let path = dir.join("grid.json");

    let source = Simulation::new(quiet_config()).unwrap();
    source.grid().cell(Position::new(2, 2)).plant();
    source.save_to_path(&path).unwrap();

    let mut sim = Simulation::new(quiet_config()).unwrap();
    sim.load_from_path(&path).await.unwrap();
    assert_eq!(sim.grid().cell(Position::new(2, 2)).state(), CellState::Growing);
    sim.stop().await;

    let err = sim.load_from_path(&dir.join("missing.json")).await.unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Persistence {
            source: PersistenceError::Io { .. }
        }
    ));
    assert!(!sim.is_running());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_save_leaves_state_unchanged() {
    let blocker = std::env::temp_dir().join(format!(
        "carrotfield-core-blocker-{}",
        std::process::id()
    ));
    std::fs::write(&blocker, b"not a directory").unwrap();
    let target = blocker.join("grid.json");

    let mut sim = Simulation::new(quiet_config()).unwrap();
    sim.grid().cell(Position::new(4, 4)).plant();
    assert!(sim.start());
    let cells_before = sim.grid().cell_snapshots();
    let actors_before = sim.actor_counts();

    let err = sim.save_to_path(&target).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Persistence {
            source: PersistenceError::Io { .. }
        }
    ));
    assert!(sim.is_running());
    assert_eq!(sim.grid().cell_snapshots(), cells_before);
    assert_eq!(sim.actor_counts(), actors_before);

    sim.stop().await;
    std::fs::remove_file(&blocker).unwrap();
}

#[tokio::test(start_paused = true)]
async fn load_rejects_impossible_records_as_corrupt() {
    let source = Simulation::new(quiet_config()).unwrap();

    let mut growing_at_max = source.snapshot();
    growing_at_max.cells[0].state = CellState::Growing;
    growing_at_max.cells[0].growth_stage = MAX_GROWTH;

    let mut oversized = source.snapshot();
    oversized.size = MAX_GRID_SIZE + 1;

    for record in [growing_at_max, oversized] {
        let json = serde_json::to_vec(&record).unwrap();
        let mut sim = Simulation::new(quiet_config()).unwrap();
        let err = sim.load_state(json.as_slice()).await.unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Persistence {
                source: PersistenceError::Corrupt { .. }
            }
        ));
        assert!(!sim.is_running());
        assert_eq!(sim.grid().actors().len(), 4);
    }
}

#[tokio::test(start_paused = true)]
async fn world_tick_spawns_and_grows() {
    let config = SimulationConfig {
        spawn_rate: 1.0,
        ..quiet_config()
    };
    let mut sim = Simulation::new(config).unwrap();
    sim.grid().cell(Position::new(5, 5)).plant();
    assert!(sim.start());

    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert_eq!(sim.actor_counts().consumers, 1);
    assert_eq!(sim.grid().cell(Position::new(5, 5)).growth_stage(), 1);

    let report = sim.stop().await;
    assert!(report.is_clean());
}

#[test]
fn invalid_config_is_reported_synchronously() {
    let config = SimulationConfig {
        detection_range: 0,
        ..quiet_config()
    };
    assert!(matches!(
        Simulation::new(config),
        Err(SimulationError::Config { .. })
    ));
}
