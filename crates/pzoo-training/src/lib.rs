//! Neuro-evolution of platformer controllers.
//!
//! This crate evolves populations of [`BreedablePolicy`] agents with a genetic
//! algorithm. There is no gradient descent: new agents come only from random
//! initialization and from breeding two survivors.
//!
//! # How Training Works
//!
//! 1. **Population** - Create `population_size` agents with random parameters
//! 2. **Evaluation** - Every agent plays one episode in the current world; the
//!    episode's fitness is its score
//! 3. **Logging** - The generation is handed to a [`GenerationSink`] (usually a
//!    [`RunLogger`]) before anything changes
//! 4. **Elitism** - The top `n_forward` agents are copied unchanged
//! 5. **Selection** - The remaining slots go to distinct agents drawn by fitness
//! 6. **Breeding** - Survivors are paired and each pair yields two children
//! 7. **Reseeding** - Every `cycle_levels` generations a new world is drawn
//!
//! # Architecture
//!
//! ```text
//! Trainer (this crate)
//!     ↓ runs
//! BreedablePolicy (pzoo-policy)
//!     ↓ plays
//! GameSimulation (pzoo-engine)
//!     ↓ produces
//! Fitness + DeathType
//!     ↓ guides
//! genetic::{top_n, select_survivors, select_breeding_pairs}
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pzoo_policy::{DnnArchitecture, FeedForwardDnn};
//! use pzoo_training::{RunLogger, Trainer, TrainingConfig};
//!
//! let config = TrainingConfig::<DnnArchitecture>::default();
//! let mut logger = RunLogger::create("runs/example", false)?;
//! logger.write_config(&config)?;
//! let mut trainer = Trainer::<FeedForwardDnn>::new(config)?;
//! trainer.run(&mut logger)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Current Limitations
//!
//! - **Single episode per agent**: fitness comes from one run in one world, so
//!   an agent that gets lucky on the current level is indistinguishable from a
//!   generally good one until the world is reseeded
//! - **No mutation**: diversity comes only from the initial population and
//!   the per-tensor mixing weights, so a converged population stays converged
//!
//! [`BreedablePolicy`]: pzoo_policy::BreedablePolicy

pub use self::{
    config::{ConfigurationError, TrainingConfig},
    run_logger::{PersistenceError, RunLogger},
    snapshot::AgentSnapshot,
    trainer::{GenerationResult, GenerationSink, Trainer, TrainingError},
};

mod config;
pub mod genetic;
pub mod run_logger;
mod snapshot;
pub mod stats;
pub mod trainer;
