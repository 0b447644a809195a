//! Episode simulation.
//!
//! - [`Player`] - Box physics against the tile grid
//! - [`GameSimulation`] - One episode: stepping, fitness and termination
//! - [`EpisodeLimits`] - Tick ceilings for an episode
//! - [`DeathType`] - How an episode ended
//!
//! # Episode Flow
//!
//! 1. Build a [`GameSimulation`] from a [`GameConfig`](crate::GameConfig) or a
//!    shared [`World`](crate::World)
//! 2. Read the [`TileView`](crate::TileView) around the player
//! 3. Pick an [`Action`](crate::Action) and [`step`](GameSimulation::step)
//! 4. Repeat until `step` reports a [`DeathType`]
//!
//! Termination is checked after every tick in a fixed order: reaching the
//! finish wins over dying, which wins over timing out.

pub use self::{physics::*, simulation::*};

mod physics;
mod simulation;
