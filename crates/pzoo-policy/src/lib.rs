//! Agent policies: parameterized controllers that map a tile view to an
//! action, and the breeding operator the genetic algorithm uses on them.
//!
//! Any representation that implements [`BreedablePolicy`] can be trained; the
//! selection and orchestration code never looks inside the parameters.
//!
//! - [`FeedForwardDnn`] - Tile embedding plus fully connected layers
//! - [`tensor`] - Parameter tensors and the convex blend
//! - [`play_episode`] - Runs a policy through one simulation
//!
//! Policies are inference only. There is no gradient or backward pass; new
//! parameters come from random initialization and from [`BreedablePolicy::breed`].

use std::fmt;

use pzoo_engine::{Action, TileView, ViewSize};
use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};

pub use self::{episode::*, feed_forward::*};

mod episode;
mod feed_forward;
pub mod tensor;

/// A policy representation the genetic algorithm can evolve.
pub trait BreedablePolicy: Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned {
    type Architecture: Clone
        + fmt::Debug
        + fmt::Display
        + PartialEq
        + Send
        + Sync
        + Serialize
        + DeserializeOwned;

    /// Tag written into snapshots and checked when loading them.
    const ARCHITECTURE: &'static str;

    fn validate_architecture(
        architecture: &Self::Architecture,
    ) -> Result<(), InvalidArchitectureError>;

    /// A policy with freshly randomized parameters.
    fn initialize<R>(architecture: &Self::Architecture, rng: &mut R) -> Self
    where
        R: Rng + ?Sized;

    fn architecture(&self) -> &Self::Architecture;

    /// Size of the view this policy expects.
    fn view_size(&self) -> ViewSize;

    /// Chooses the action for one tick. Same view, same action.
    fn evaluate(&self, view: &TileView) -> Action;

    /// Produces two children from two parents of the same architecture.
    fn breed<R>(a: &Self, b: &Self, rng: &mut R) -> Result<(Self, Self), ArchitectureMismatchError>
    where
        R: Rng + ?Sized;
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("architecture mismatch: expected {expected}, found {found}")]
pub struct ArchitectureMismatchError {
    pub expected: String,
    pub found: String,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum InvalidArchitectureError {
    #[display("view must contain at least one cell")]
    EmptyView,
    #[display("hidden layers must have at least one unit")]
    EmptyLayer,
    #[display("parameter shapes do not match the architecture")]
    ParameterShape,
}
