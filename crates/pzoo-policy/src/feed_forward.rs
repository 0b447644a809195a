//! Feed-forward network policy.
//!
//! The network embeds every tile code as one learned scalar, flattens the
//! view row-major, and runs it through fully connected layers:
//!
//! ```text
//! view (rows x cols tile codes)
//!     -> embedding (TileKind::COUNT scalars)
//!     -> Linear(view cells, hidden[0]) -> ReLU
//!     -> ...
//!     -> Linear(hidden[n - 1], Action::CHANNELS) -> Sigmoid
//!     -> threshold at 0.5
//! ```
//!
//! Parameters are stored as an ordered list of tensors: the embedding, then a
//! weight (`[out, in]`) and a bias (`[out]`) for every layer. Breeding draws
//! one mixing weight per tensor in that order.

use std::fmt;

use pzoo_engine::{Action, TileKind, TileView, ViewSize};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    ArchitectureMismatchError, BreedablePolicy, InvalidArchitectureError,
    tensor::{self, Tensor},
};

const ACTIVATION_THRESHOLD: f32 = 0.5;

/// Shape of a [`FeedForwardDnn`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnnArchitecture {
    pub view: ViewSize,
    pub hidden: Vec<usize>,
}

impl Default for DnnArchitecture {
    fn default() -> Self {
        Self {
            view: ViewSize::default(),
            hidden: vec![64, 32, 16],
        }
    }
}

impl fmt::Display for DnnArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.view)?;
        for size in self.layer_sizes().iter().skip(1) {
            write!(f, "-{size}")?;
        }
        Ok(())
    }
}

impl DnnArchitecture {
    pub fn validate(&self) -> Result<(), InvalidArchitectureError> {
        if self.view.cells() == 0 {
            return Err(InvalidArchitectureError::EmptyView);
        }
        if self.hidden.contains(&0) {
            return Err(InvalidArchitectureError::EmptyLayer);
        }
        Ok(())
    }

    /// Widths of every layer boundary, input first and output last.
    #[must_use]
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden.len() + 2);
        sizes.push(self.view.cells());
        sizes.extend_from_slice(&self.hidden);
        sizes.push(Action::CHANNELS);
        sizes
    }

    /// Shapes of the parameter tensors in storage order.
    #[must_use]
    pub fn parameter_shapes(&self) -> Vec<Vec<usize>> {
        let mut shapes = vec![vec![TileKind::COUNT]];
        for pair in self.layer_sizes().windows(2) {
            let (inputs, outputs) = (pair[0], pair[1]);
            shapes.push(vec![outputs, inputs]);
            shapes.push(vec![outputs]);
        }
        shapes
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameter_shapes()
            .iter()
            .map(|shape| shape.iter().product::<usize>())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeedForwardDnn")]
pub struct FeedForwardDnn {
    architecture: DnnArchitecture,
    parameters: Vec<Tensor>,
}

#[derive(Deserialize)]
struct RawFeedForwardDnn {
    architecture: DnnArchitecture,
    parameters: Vec<Tensor>,
}

impl TryFrom<RawFeedForwardDnn> for FeedForwardDnn {
    type Error = InvalidArchitectureError;

    fn try_from(raw: RawFeedForwardDnn) -> Result<Self, Self::Error> {
        Self::from_parameters(raw.architecture, raw.parameters)
    }
}

impl FeedForwardDnn {
    /// Builds a network from explicit parameters, checking every shape.
    pub fn from_parameters(
        architecture: DnnArchitecture,
        parameters: Vec<Tensor>,
    ) -> Result<Self, InvalidArchitectureError> {
        architecture.validate()?;
        let shapes = architecture.parameter_shapes();
        let matches = shapes.len() == parameters.len()
            && shapes
                .iter()
                .zip(&parameters)
                .all(|(shape, tensor)| shape.as_slice() == tensor.shape());
        if !matches {
            return Err(InvalidArchitectureError::ParameterShape);
        }
        Ok(Self {
            architecture,
            parameters,
        })
    }

    #[must_use]
    pub fn parameters(&self) -> &[Tensor] {
        &self.parameters
    }

    /// Raw output activations for `view`, one per action channel.
    ///
    /// Returns `None` if `view` does not have the architecture's view size.
    #[must_use]
    pub fn forward(&self, view: &TileView) -> Option<[f32; Action::CHANNELS]> {
        if view.size() != self.architecture.view {
            return None;
        }
        let embedding = self.parameters[0].values();
        let mut x = view
            .tiles()
            .iter()
            .map(|tile| embedding[usize::from(tile.code())])
            .collect::<Vec<_>>();

        let layers = self.parameters[1..].chunks_exact(2);
        let last = layers.len() - 1;
        for (i, layer) in layers.enumerate() {
            let (weight, bias) = (&layer[0], &layer[1]);
            let inputs = weight.shape()[1];
            x = weight
                .values()
                .chunks_exact(inputs)
                .zip(bias.values())
                .map(|(row, b)| {
                    let z = row.iter().zip(&x).map(|(w, v)| w * v).sum::<f32>() + b;
                    if i == last { sigmoid(z) } else { z.max(0.0) }
                })
                .collect();
        }

        let mut out = [0.0; Action::CHANNELS];
        out.copy_from_slice(&x);
        Some(out)
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl BreedablePolicy for FeedForwardDnn {
    type Architecture = DnnArchitecture;

    const ARCHITECTURE: &'static str = "feed-forward-dnn";

    fn validate_architecture(
        architecture: &Self::Architecture,
    ) -> Result<(), InvalidArchitectureError> {
        architecture.validate()
    }

    fn initialize<R>(architecture: &Self::Architecture, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let parameters = architecture
            .parameter_shapes()
            .into_iter()
            .map(|shape| Tensor::random(shape, rng))
            .collect();
        Self {
            architecture: architecture.clone(),
            parameters,
        }
    }

    fn architecture(&self) -> &Self::Architecture {
        &self.architecture
    }

    fn view_size(&self) -> ViewSize {
        self.architecture.view
    }

    /// A view of the wrong size presses nothing.
    fn evaluate(&self, view: &TileView) -> Action {
        self.forward(view).map_or(Action::NONE, |out| {
            Action::from_buttons(out.map(|v| v >= ACTIVATION_THRESHOLD))
        })
    }

    fn breed<R>(a: &Self, b: &Self, rng: &mut R) -> Result<(Self, Self), ArchitectureMismatchError>
    where
        R: Rng + ?Sized,
    {
        if a.architecture != b.architecture {
            return Err(ArchitectureMismatchError {
                expected: a.architecture.to_string(),
                found: b.architecture.to_string(),
            });
        }
        let (child_a, child_b) = a
            .parameters
            .iter()
            .zip(&b.parameters)
            .map(|(ta, tb)| {
                let w = rng.random::<f32>();
                tensor::blend(ta, tb, w)
            })
            .unzip();
        Ok((
            Self {
                architecture: a.architecture.clone(),
                parameters: child_a,
            },
            Self {
                architecture: b.architecture.clone(),
                parameters: child_b,
            },
        ))
    }
}
