//! Parameter tensors and the convex blend used for breeding.
//!
//! A [`Tensor`] is a flat, row-major `Vec<f32>` with a shape. Policies keep
//! their parameters as a list of tensors so that breeding can draw one mixing
//! weight per tensor.
//!
//! # Blending
//!
//! For parents `a` and `b` and a weight `w` in `[0, 1]`, [`blend`] produces
//!
//! ```text
//! child_a = w * a + (1 - w) * b
//! child_b = w * b + (1 - w) * a
//! ```
//!
//! componentwise. Both children are convex combinations of the parents, so
//! every value lies between the corresponding parent values. Results are
//! clamped to that interval to absorb rounding.

use rand::Rng;
use rand_distr::{Distribution as _, Uniform};
use serde::{Deserialize, Serialize};

/// Bound of the uniform range used for freshly initialized parameters.
pub const INIT_RANGE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTensor")]
pub struct Tensor {
    shape: Vec<usize>,
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct RawTensor {
    shape: Vec<usize>,
    values: Vec<f32>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("tensor of shape {shape:?} cannot hold {len} values")]
pub struct TensorShapeError {
    shape: Vec<usize>,
    len: usize,
}

impl TryFrom<RawTensor> for Tensor {
    type Error = TensorShapeError;

    fn try_from(raw: RawTensor) -> Result<Self, Self::Error> {
        Self::new(raw.shape, raw.values)
    }
}

impl Tensor {
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Result<Self, TensorShapeError> {
        if shape.iter().product::<usize>() != values.len() {
            return Err(TensorShapeError {
                shape,
                len: values.len(),
            });
        }
        Ok(Self { shape, values })
    }

    /// Creates a tensor by applying `f` to each flat index.
    pub fn from_fn<F>(shape: Vec<usize>, f: F) -> Self
    where
        F: FnMut(usize) -> f32,
    {
        let len = shape.iter().product();
        let values = (0..len).map(f).collect();
        Self { shape, values }
    }

    /// A tensor with every value drawn independently from
    /// `Uniform[-INIT_RANGE, INIT_RANGE]`.
    pub fn random<R>(shape: Vec<usize>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let uniform = Uniform::new_inclusive(-INIT_RANGE, INIT_RANGE).unwrap();
        Self::from_fn(shape, |_| uniform.sample(rng))
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Blends two equally-shaped tensors with mixing weight `w`.
///
/// # Panics
///
/// Panics if the shapes differ.
#[must_use]
pub fn blend(a: &Tensor, b: &Tensor, w: f32) -> (Tensor, Tensor) {
    assert_eq!(a.shape, b.shape);
    let (va, vb) = blend_values(&a.values, &b.values, w);
    (
        Tensor {
            shape: a.shape.clone(),
            values: va,
        },
        Tensor {
            shape: b.shape.clone(),
            values: vb,
        },
    )
}

/// Componentwise convex blend of two equal-length slices.
///
/// # Examples
///
/// ```
/// use pzoo_policy::tensor;
///
/// let (a, b) = tensor::blend_values(&[0.0], &[1.0], 0.25);
/// assert_eq!(a, vec![0.75]);
/// assert_eq!(b, vec![0.25]);
/// ```
///
/// # Panics
///
/// Panics if the slices have different lengths.
#[must_use]
pub fn blend_values(a: &[f32], b: &[f32], w: f32) -> (Vec<f32>, Vec<f32>) {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let lo = x.min(y);
            let hi = x.max(y);
            let child_a = (w * x + (1.0 - w) * y).clamp(lo, hi);
            let child_b = (w * y + (1.0 - w) * x).clamp(lo, hi);
            (child_a, child_b)
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_blend_scalar_example() {
        let (a, b) = blend_values(&[1.0], &[0.0], 0.3);
        assert!((a[0] - 0.3).abs() < 1e-6);
        assert!((b[0] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_blend_endpoints_copy_parents() {
        let a = [0.5, -0.25, 1.0];
        let b = [-1.0, 0.75, 0.0];
        let (ca, cb) = blend_values(&a, &b, 1.0);
        assert_eq!(ca, a);
        assert_eq!(cb, b);
        let (ca, cb) = blend_values(&a, &b, 0.0);
        assert_eq!(ca, b);
        assert_eq!(cb, a);
    }

    #[test]
    fn test_random_is_in_range() {
        let mut rng = Pcg64::seed_from_u64(3);
        let tensor = Tensor::random(vec![8, 16], &mut rng);
        assert_eq!(tensor.len(), 128);
        assert!(tensor.values().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_shape_is_checked_on_deserialize() {
        let ok: Tensor = serde_json::from_str(r#"{"shape":[2,1],"values":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.shape(), &[2, 1]);
        let bad = serde_json::from_str::<Tensor>(r#"{"shape":[3],"values":[1.0]}"#);
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn blend_stays_between_parents(
            pairs in prop::collection::vec((-1.0f32..=1.0, -1.0f32..=1.0), 1..64),
            w in 0.0f32..1.0,
        ) {
            let (a, b): (Vec<f32>, Vec<f32>) = pairs.into_iter().unzip();
            let (ca, cb) = blend_values(&a, &b, w);
            for i in 0..a.len() {
                let lo = a[i].min(b[i]);
                let hi = a[i].max(b[i]);
                prop_assert!((lo..=hi).contains(&ca[i]));
                prop_assert!((lo..=hi).contains(&cb[i]));
            }
        }
    }
}
