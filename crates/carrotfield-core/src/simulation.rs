//! The simulation controller.
//!
//! [`Simulation`] owns the grid for a session. `start()` launches one task
//! per registered actor plus a fresh world-tick task; `stop()` asks all of
//! them to stop and joins them under a bounded timeout. Cell state can be
//! saved at any time and restored between runs.
//!
//! The controller itself is driven from a single place (the engine's main
//! loop) and takes `&mut self` for every lifecycle change, so start, stop,
//! and load never race each other.

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use carrotfield_agents::{Actor, Field, RandomSteps, StopSignal, run_unit};
use carrotfield_types::Position;
use carrotfield_world::{ActorCensus, CellCensus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::group::{ShutdownReport, UnitGroup, UnitLabel};
use crate::snapshot::GridSnapshot;
use crate::tick::{TickSettings, WorldTick};

/// One simulation session.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    grid: Arc<Field>,
    group: Arc<UnitGroup>,
    running: bool,
    rng: StdRng,
}

impl Simulation {
    /// Validate `config`, build the grid, and place the initial producers
    /// with their protectors. Nothing runs until [`start`](Self::start).
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let grid = Arc::new(Field::new(config.grid_size)?);
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        let mut simulation = Self {
            config,
            grid,
            group: Arc::new(UnitGroup::new()),
            running: false,
            rng,
        };
        simulation.populate_producers();
        info!(
            grid_size = simulation.config.grid_size,
            producers = simulation.config.producer_count,
            "Simulation created"
        );
        Ok(simulation)
    }

    /// Place `producer_count` producers at random cells, each with a
    /// protector on the diagonal neighbour (wrapping at the edges).
    fn populate_producers(&mut self) {
        let size = self.grid.size();
        let cells = u64::from(size).saturating_mul(u64::from(size));
        let count = u64::from(self.config.producer_count).min(cells);

        for _ in 0..count {
            let position = Position::new(
                self.rng.random_range(0..size),
                self.rng.random_range(0..size),
            );
            let guard_post =
                Position::new(wrap_next(position.x, size), wrap_next(position.y, size));

            let protector = Arc::new(Actor::protector(guard_post));
            let producer = Arc::new(Actor::producer(position, Arc::clone(&protector)));
            self.grid.add_actor(protector);
            self.grid.add_actor(producer);
        }
        debug!(count, "Producers placed");
    }

    /// Launch a unit for every registered active actor and a new world
    /// tick. Returns `false` if the simulation was already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.running {
            debug!("Start ignored, already running");
            return false;
        }
        self.running = true;
        self.group.open();

        let behavior = Arc::new(self.config.behavior());
        let actors = self.grid.actors();
        let mut launched: usize = 0;
        for actor in actors.iter() {
            if !actor.is_active() {
                // Caught or finished while the previous run was stopping.
                self.grid.remove_actor(actor.id());
                continue;
            }
            actor.rearm();
            let unit = run_unit(
                Arc::clone(actor),
                Arc::clone(&self.grid),
                Arc::clone(&behavior),
                Box::new(RandomSteps::seeded(self.rng.random())),
            );
            if self.group.launch_actor(Arc::clone(actor), unit) {
                launched = launched.saturating_add(1);
            }
        }

        let signal = Arc::new(StopSignal::new());
        let tick = WorldTick::new(
            Arc::clone(&self.grid),
            Arc::clone(&self.group),
            behavior,
            Arc::clone(&signal),
            TickSettings {
                interval: self.config.growth_interval(),
                spawn_rate: self.config.spawn_rate,
                appetite: self.config.appetite_range(),
                seed: self.rng.random(),
            },
        );
        self.group.launch_signal(UnitLabel::WorldTick, signal, tick.run());

        info!(actors = launched, "Simulation started");
        true
    }

    /// Stop every unit and join them, each bounded by
    /// `shutdown_timeout_ms`. The actor registry is left as is.
    ///
    /// A no-op returning an empty report when not running.
    pub async fn stop(&mut self) -> ShutdownReport {
        if !self.running {
            return ShutdownReport::default();
        }
        self.running = false;

        let report = self.group.shutdown(self.config.shutdown_timeout()).await;
        if report.timed_out > 0 {
            warn!(
                timed_out = report.timed_out,
                "Some units were abandoned during shutdown"
            );
        }
        info!(stopped = report.stopped, "Simulation stopped");
        report
    }

    /// Capture the current cell state.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::capture(&self.grid)
    }

    /// Write the current cell state as JSON. Safe while running; cells
    /// are read one at a time, not as a single instant.
    pub fn save_state<W: Write>(&self, writer: W) -> Result<(), SimulationError> {
        self.snapshot().write_json(writer)?;
        info!(size = self.grid.size(), "Grid state saved");
        Ok(())
    }

    /// [`save_state`](Self::save_state) into a file.
    pub fn save_to_path(&self, path: &Path) -> Result<(), SimulationError> {
        self.snapshot().save_to_path(path)?;
        info!(path = %path.display(), size = self.grid.size(), "Grid state saved");
        Ok(())
    }

    /// Stop, replace the grid with the saved cell state, recreate the
    /// initial producers, and start again.
    ///
    /// # Errors
    ///
    /// On any failure the simulation is left stopped. A record that fails
    /// to parse or validate leaves the grid and its registry untouched.
    pub async fn load_state<R: Read>(&mut self, reader: R) -> Result<(), SimulationError> {
        self.stop().await;
        let snapshot = GridSnapshot::read_json(reader)?;
        self.restore(&snapshot)
    }

    /// [`load_state`](Self::load_state) from a file.
    pub async fn load_from_path(&mut self, path: &Path) -> Result<(), SimulationError> {
        self.stop().await;
        let snapshot = GridSnapshot::load_from_path(path)?;
        self.restore(&snapshot)?;
        info!(path = %path.display(), "Grid state loaded");
        Ok(())
    }

    fn restore(&mut self, snapshot: &GridSnapshot) -> Result<(), SimulationError> {
        let grid = Field::new(snapshot.size)?;
        snapshot.apply_to(&grid)?;

        self.grid.clear_actors();
        self.grid = Arc::new(grid);
        self.config.grid_size = snapshot.size;
        self.populate_producers();
        info!(
            size = snapshot.size,
            saved_at = %snapshot.saved_at,
            "Grid state restored"
        );
        self.start();
        Ok(())
    }

    /// Replace the configuration between runs.
    ///
    /// A new `grid_size` rebuilds an empty grid. A new `grid_size` or
    /// `producer_count` clears the registry and places fresh producers;
    /// cell state survives a same-size change. Other values take effect at
    /// the next start.
    pub fn reconfigure(&mut self, config: SimulationConfig) -> Result<(), SimulationError> {
        if self.running {
            return Err(SimulationError::Running);
        }
        config.validate()?;

        let resize = config.grid_size != self.grid.size();
        let repopulate = resize || config.producer_count != self.config.producer_count;
        if let Some(seed) = config.seed.filter(|seed| Some(*seed) != self.config.seed) {
            self.rng = StdRng::seed_from_u64(seed);
        }
        if resize {
            self.grid.clear_actors();
            self.grid = Arc::new(Field::new(config.grid_size)?);
        }
        self.config = config;
        if repopulate {
            self.grid.clear_actors();
            self.populate_producers();
        }
        info!(
            grid_size = self.config.grid_size,
            producer_count = self.config.producer_count,
            resized = resize,
            repopulated = repopulate,
            "Simulation reconfigured"
        );
        Ok(())
    }

    /// The grid currently in use. A load swaps it for a new one, so
    /// long-lived readers should fetch it again after loading.
    pub fn grid(&self) -> Arc<Field> {
        Arc::clone(&self.grid)
    }

    /// The active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Whether units are running.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Number of live units, the world tick included.
    pub fn unit_count(&self) -> usize {
        self.group.len()
    }

    /// Cells per state.
    pub fn census(&self) -> CellCensus {
        self.grid.census()
    }

    /// Active actors per kind.
    pub fn actor_counts(&self) -> ActorCensus {
        self.grid.actor_counts()
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        // The tick task holds the group; abort explicitly so it is released.
        self.group.abort_all();
    }
}

const fn wrap_next(value: u32, size: u32) -> u32 {
    match value.checked_add(1) {
        Some(next) if next < size => next,
        _ => 0,
    }
}
