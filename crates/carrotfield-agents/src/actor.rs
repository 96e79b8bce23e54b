//! Shared per-actor state.
//!
//! An [`Actor`] is held behind an [`Arc`] by the controller, by the grid's
//! registry, and by the actor's own task. Everything another task may read
//! (position, the active flag, the running flag, a protector's target) is
//! atomic or behind a short-lived lock, so the owning task can mutate it
//! while the renderer and detection scans read it.
//!
//! Kind-specific state lives in [`Role`], a closed enum. Behaviour is
//! dispatched by matching on it, never by inspecting concrete types.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use carrotfield_types::{ActorId, ActorKind, Position};
use carrotfield_world::{Grid, Occupant};

use crate::lifecycle::StopSignal;
use crate::movement::{self, StepSource};

/// The grid as populated by this crate's actors.
pub type Field = Grid<Actor>;

/// Kind-specific actor state.
#[derive(Debug)]
pub enum Role {
    /// Plants and repairs; owns the lifecycle of its paired protector.
    Producer {
        /// The protector this producer alerts and stops.
        companion: Arc<Actor>,
    },
    /// Eats ready cells until its appetite is met.
    Consumer {
        /// Meals to eat before leaving, fixed at creation.
        appetite: u32,
        /// Meals eaten so far.
        meals_eaten: AtomicU32,
    },
    /// Chases consumers.
    Protector {
        /// Identity of the consumer being chased. Liveness is always
        /// re-checked through the grid's registry, so a despawned target is
        /// never kept alive by this reference.
        target: Mutex<Option<ActorId>>,
    },
}

/// One autonomous actor.
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    position: AtomicU64,
    active: AtomicBool,
    signal: StopSignal,
    role: Role,
}

impl Actor {
    fn with_role(position: Position, role: Role) -> Self {
        Self {
            id: ActorId::new(),
            position: AtomicU64::new(position.to_bits()),
            active: AtomicBool::new(true),
            signal: StopSignal::new(),
            role,
        }
    }

    /// A producer paired with `companion`.
    pub fn producer(position: Position, companion: Arc<Self>) -> Self {
        Self::with_role(position, Role::Producer { companion })
    }

    /// A consumer that leaves after `appetite` meals.
    pub fn consumer(position: Position, appetite: u32) -> Self {
        Self::with_role(
            position,
            Role::Consumer {
                appetite,
                meals_eaten: AtomicU32::new(0),
            },
        )
    }

    /// A protector with no target.
    pub fn protector(position: Position) -> Self {
        Self::with_role(
            position,
            Role::Protector {
                target: Mutex::new(None),
            },
        )
    }

    /// Stable identity.
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Capability tag derived from the role.
    pub const fn kind(&self) -> ActorKind {
        match self.role {
            Role::Producer { .. } => ActorKind::Producer,
            Role::Consumer { .. } => ActorKind::Consumer,
            Role::Protector { .. } => ActorKind::Protector,
        }
    }

    /// Kind-specific state.
    pub const fn role(&self) -> &Role {
        &self.role
    }

    /// Current cell.
    pub fn position(&self) -> Position {
        Position::from_bits(self.position.load(Ordering::Acquire))
    }

    pub(crate) fn move_to(&self, position: Position) {
        self.position.store(position.to_bits(), Ordering::Release);
    }

    /// Take one random step from the current cell; off-grid proposals are
    /// discarded. Returns the resulting position.
    pub(crate) fn wander(&self, grid: &Field, steps: &mut dyn StepSource) -> Position {
        let next = movement::apply_step(grid, self.position(), steps.next_step());
        self.move_to(next);
        next
    }

    /// Whether the actor still participates in the simulation.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Remove the actor from play. Its task notices on its next iteration.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// The actor's running flag and interruptible sleep.
    pub const fn signal(&self) -> &StopSignal {
        &self.signal
    }

    /// Whether the actor's task should keep looping.
    pub fn is_running(&self) -> bool {
        self.signal.is_running()
    }

    /// Ask the actor's task to stop, interrupting any suspension.
    pub fn request_stop(&self) {
        self.signal.request_stop();
    }

    /// Reset the running flag before relaunching a stopped actor.
    pub fn rearm(&self) {
        self.signal.rearm();
    }

    /// A producer's paired protector.
    pub const fn companion(&self) -> Option<&Arc<Self>> {
        match &self.role {
            Role::Producer { companion } => Some(companion),
            _ => None,
        }
    }

    /// A consumer's appetite.
    pub const fn appetite(&self) -> Option<u32> {
        match &self.role {
            Role::Consumer { appetite, .. } => Some(*appetite),
            _ => None,
        }
    }

    /// Meals a consumer has eaten.
    pub fn meals_eaten(&self) -> Option<u32> {
        match &self.role {
            Role::Consumer { meals_eaten, .. } => Some(meals_eaten.load(Ordering::Acquire)),
            _ => None,
        }
    }

    pub(crate) fn record_meal(&self) -> u32 {
        match &self.role {
            Role::Consumer { meals_eaten, .. } => {
                meals_eaten.fetch_add(1, Ordering::AcqRel).saturating_add(1)
            }
            _ => 0,
        }
    }

    /// A protector's current chase target.
    pub fn target(&self) -> Option<ActorId> {
        match &self.role {
            Role::Protector { target } => *target.lock().unwrap_or_else(PoisonError::into_inner),
            _ => None,
        }
    }

    /// Hand a protector a new target (or clear it). Returns `false` for
    /// actors that are not protectors.
    pub fn set_target(&self, next: Option<ActorId>) -> bool {
        match &self.role {
            Role::Protector { target } => {
                *target.lock().unwrap_or_else(PoisonError::into_inner) = next;
                true
            }
            _ => false,
        }
    }
}

impl Occupant for Actor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn kind(&self) -> ActorKind {
        Self::kind(self)
    }

    fn position(&self) -> Position {
        Self::position(self)
    }

    fn is_active(&self) -> bool {
        Self::is_active(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_role() {
        let dog = Arc::new(Actor::protector(Position::new(1, 1)));
        let farmer = Actor::producer(Position::new(0, 0), Arc::clone(&dog));
        let rabbit = Actor::consumer(Position::new(2, 2), 4);

        assert_eq!(farmer.kind(), ActorKind::Producer);
        assert_eq!(dog.kind(), ActorKind::Protector);
        assert_eq!(rabbit.kind(), ActorKind::Consumer);
        assert_eq!(farmer.companion().map(|c| c.id()), Some(dog.id()));
        assert_eq!(rabbit.appetite(), Some(4));
        assert_eq!(rabbit.meals_eaten(), Some(0));
    }

    #[test]
    fn only_protectors_take_targets() {
        let dog = Actor::protector(Position::default());
        let rabbit = Actor::consumer(Position::default(), 3);
        assert!(dog.set_target(Some(rabbit.id())));
        assert_eq!(dog.target(), Some(rabbit.id()));
        assert!(!rabbit.set_target(Some(dog.id())));
        assert_eq!(rabbit.target(), None);
    }

    #[test]
    fn active_and_running_are_independent() {
        let rabbit = Actor::consumer(Position::default(), 3);
        rabbit.deactivate();
        assert!(!rabbit.is_active());
        assert!(rabbit.is_running());

        let dog = Actor::protector(Position::default());
        dog.request_stop();
        assert!(dog.is_active());
        assert!(!dog.is_running());
        dog.rearm();
        assert!(dog.is_running());
    }

    #[test]
    fn record_meal_counts_up() {
        let rabbit = Actor::consumer(Position::default(), 3);
        assert_eq!(rabbit.record_meal(), 1);
        assert_eq!(rabbit.record_meal(), 2);
        assert_eq!(rabbit.meals_eaten(), Some(2));
    }
}
