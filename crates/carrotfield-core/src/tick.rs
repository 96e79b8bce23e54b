//! The world tick.
//!
//! One task per run wakes every `growth_interval`, rolls for a new
//! consumer, and then advances growth on every cell. The tick has its own
//! [`StopSignal`] so it can be stopped with the actors and recreated on
//! the next start.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use carrotfield_agents::{Actor, BehaviorConfig, Field, RandomSteps, StopSignal, run_unit};
use carrotfield_types::Position;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::group::UnitGroup;

/// State owned by the world-tick task.
pub struct WorldTick {
    grid: Arc<Field>,
    group: Arc<UnitGroup>,
    behavior: Arc<BehaviorConfig>,
    signal: Arc<StopSignal>,
    interval: Duration,
    spawn_rate: f64,
    appetite: RangeInclusive<u32>,
    rng: StdRng,
}

impl std::fmt::Debug for WorldTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldTick")
            .field("interval", &self.interval)
            .field("spawn_rate", &self.spawn_rate)
            .field("appetite", &self.appetite)
            .finish_non_exhaustive()
    }
}

/// Everything a tick needs besides the shared handles.
#[derive(Debug, Clone)]
pub struct TickSettings {
    /// Time between ticks.
    pub interval: Duration,
    /// Bernoulli probability of spawning a consumer per tick.
    pub spawn_rate: f64,
    /// Range spawned consumers draw their appetite from.
    pub appetite: RangeInclusive<u32>,
    /// Seed for the tick's own RNG.
    pub seed: u64,
}

impl WorldTick {
    /// Build a tick that spawns into `grid` and launches through `group`.
    pub fn new(
        grid: Arc<Field>,
        group: Arc<UnitGroup>,
        behavior: Arc<BehaviorConfig>,
        signal: Arc<StopSignal>,
        settings: TickSettings,
    ) -> Self {
        Self {
            grid,
            group,
            behavior,
            signal,
            interval: settings.interval,
            spawn_rate: settings.spawn_rate,
            appetite: settings.appetite,
            rng: StdRng::seed_from_u64(settings.seed),
        }
    }

    /// Loop until the tick's signal is stopped.
    pub async fn run(mut self) {
        debug!(interval_ms = self.interval.as_millis(), "World tick started");
        while self.signal.is_running() {
            if self.signal.suspend(self.interval).await.is_interrupted() {
                break;
            }
            self.step();
        }
        debug!("World tick stopped");
    }

    /// One tick: spawn roll, then growth.
    pub fn step(&mut self) {
        self.spawn_roll();
        self.grid.update_growth();
    }

    /// Roll for a consumer and launch it on success. Returns the spawned
    /// actor, if any.
    pub fn spawn_roll(&mut self) -> Option<Arc<Actor>> {
        if !self.rng.random_bool(self.spawn_rate) {
            return None;
        }

        let size = self.grid.size();
        let position = Position::new(
            self.rng.random_range(0..size),
            self.rng.random_range(0..size),
        );
        let appetite = self.rng.random_range(self.appetite.clone());
        let actor = Arc::new(Actor::consumer(position, appetite));
        self.grid.add_actor(Arc::clone(&actor));

        let unit = run_unit(
            Arc::clone(&actor),
            Arc::clone(&self.grid),
            Arc::clone(&self.behavior),
            Box::new(RandomSteps::seeded(self.rng.random())),
        );
        if !self.group.launch_actor(Arc::clone(&actor), unit) {
            // Stop won the race; the consumer never ran.
            actor.deactivate();
            self.grid.remove_actor(actor.id());
            debug!(actor_id = %actor.id(), "Spawn discarded, simulation stopping");
            return None;
        }

        info!(actor_id = %actor.id(), %position, appetite, "Consumer spawned");
        Some(actor)
    }
}
