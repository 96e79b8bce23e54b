//! Actors and their behaviour loops for the Carrotfield simulation.
//!
//! Every actor runs as its own Tokio task. This crate owns the per-actor
//! shared state ([`Actor`]), the interruptible suspension primitive the
//! loops sleep on ([`StopSignal`]), movement, and the three behaviour
//! loops themselves.
//!
//! # Modules
//!
//! - [`actor`] -- [`Actor`] and its kind-specific [`Role`].
//! - [`behavior`] -- Producer, consumer, and protector loops plus
//!   [`run_unit`], the entry point a task executes.
//! - [`config`] -- [`BehaviorConfig`], the think-times and radii the
//!   loops read.
//! - [`lifecycle`] -- [`StopSignal`] and [`Suspension`].
//! - [`movement`] -- [`StepSource`] implementations and the bounded
//!   random-step rule.
//!
//! [`Actor`]: actor::Actor
//! [`Role`]: actor::Role
//! [`run_unit`]: behavior::run_unit
//! [`BehaviorConfig`]: config::BehaviorConfig
//! [`StopSignal`]: lifecycle::StopSignal
//! [`Suspension`]: lifecycle::Suspension
//! [`StepSource`]: movement::StepSource

pub mod actor;
pub mod behavior;
pub mod config;
pub mod lifecycle;
pub mod movement;

pub use actor::{Actor, Field, Role};
pub use behavior::{UnitExit, run_unit};
pub use config::BehaviorConfig;
pub use lifecycle::{StopSignal, Suspension};
pub use movement::{RandomSteps, ScriptedSteps, Stationary, Step, StepSource};
