//! Copy-on-write registry of the actors currently on the grid.
//!
//! Reads vastly outnumber writes: the renderer and every detection scan
//! iterate the registry, while only spawns and despawns modify it. The
//! list is therefore held as an immutable `Arc<Vec<_>>`. Readers clone the
//! outer `Arc` under a short read lock and iterate without holding any
//! lock; writers build a new vector and swap it in. An iterator can never
//! observe a half-inserted element or a concurrent removal.

use std::sync::{Arc, PoisonError, RwLock};

use carrotfield_types::ActorId;

use crate::occupant::Occupant;

/// Concurrent, insertion-ordered actor registry.
#[derive(Debug)]
pub struct ActorRegistry<A> {
    entries: RwLock<Arc<Vec<Arc<A>>>>,
}

impl<A: Occupant> ActorRegistry<A> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Append an actor. Registration order is iteration order.
    pub fn add(&self, actor: Arc<A>) {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::with_capacity(guard.len().saturating_add(1));
        next.extend(guard.iter().cloned());
        next.push(actor);
        *guard = Arc::new(next);
    }

    /// Remove an actor by id. Removing an absent actor is a no-op that
    /// returns `false`.
    pub fn remove(&self, id: ActorId) -> bool {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.iter().any(|a| a.id() == id) {
            return false;
        }
        let next: Vec<Arc<A>> = guard.iter().filter(|a| a.id() != id).cloned().collect();
        *guard = Arc::new(next);
        true
    }

    /// Drop every registration.
    pub fn clear(&self) {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(Vec::new());
    }

    /// A point-in-time view of the registry, safe to iterate at leisure.
    pub fn snapshot(&self) -> Arc<Vec<Arc<A>>> {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Look up an actor by id.
    pub fn get(&self, id: ActorId) -> Option<Arc<A>> {
        self.snapshot().iter().find(|a| a.id() == id).cloned()
    }

    /// Number of registered actors, active or not.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl<A: Occupant> Default for ActorRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}
