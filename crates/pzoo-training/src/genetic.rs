//! Index-level genetic operators.
//!
//! These functions work on fitness values and population indices only. They
//! never see policy parameters, so any [`BreedablePolicy`] can be evolved
//! with them.
//!
//! # Generation Step
//!
//! 1. [`top_n`] picks the elites that are carried forward unchanged
//! 2. [`select_survivors`] picks the distinct agents that breed, weighted by
//!    fitness
//! 3. [`select_breeding_pairs`] groups the survivors into pairs
//! 4. Each pair is bred into two children (see
//!    [`Trainer`](crate::trainer::Trainer))
//!
//! # Selection
//!
//! Survivors are drawn without replacement, with each draw weighted by
//! fitness. Negative or non-finite fitness counts as zero. Agents with zero
//! weight are only picked once every agent with positive weight has been
//! picked, and then uniformly, so a population with no progress still breeds.
//!
//! No agent fills more than one slot, so a pair never holds the same agent
//! twice.
//!
//! # Pairing
//!
//! Pairing ignores fitness: the survivors are shuffled and adjacent entries
//! form a pair.
//!
//! [`BreedablePolicy`]: pzoo_policy::BreedablePolicy

use std::collections::HashSet;

use rand::{
    Rng,
    seq::{SliceRandom as _, index},
};
use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Two distinct survivors combined into two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingPair {
    pub first: usize,
    pub second: usize,
}

/// Draws `fitnesses.len() - save_spots` distinct breeding survivors.
///
/// Returns population indices in draw order.
pub fn select_survivors<R>(
    fitnesses: &[f32],
    save_spots: usize,
    rng: &mut R,
) -> Result<Vec<usize>, ConfigurationError>
where
    R: Rng + ?Sized,
{
    let population_size = fitnesses.len();
    let Some(slots) = population_size.checked_sub(save_spots) else {
        return Err(ConfigurationError::TooManySaveSpots {
            save_spots,
            population_size,
        });
    };
    if slots % 2 != 0 {
        return Err(ConfigurationError::OddSurvivors { survivors: slots });
    }

    let weight = |i: usize| {
        let f = fitnesses[i];
        if f.is_finite() { f.max(0.0) } else { 0.0 }
    };
    // returns fewer than `slots` indices when too few weights are positive
    let mut survivors = index::sample_weighted(rng, population_size, weight, slots)
        .map(index::IndexVec::into_vec)
        .unwrap_or_default();

    let missing = slots - survivors.len();
    if missing > 0 {
        let picked = survivors.iter().copied().collect::<HashSet<_>>();
        let rest = (0..population_size)
            .filter(|i| !picked.contains(i))
            .collect::<Vec<_>>();
        survivors.extend(index::sample(rng, rest.len(), missing).iter().map(|k| rest[k]));
    }
    Ok(survivors)
}

/// Shuffles the survivors and pairs them up.
///
/// Every survivor appears in exactly one pair, and the two agents of a pair
/// are always different.
pub fn select_breeding_pairs<R>(
    survivors: &[usize],
    rng: &mut R,
) -> Result<Vec<BreedingPair>, ConfigurationError>
where
    R: Rng + ?Sized,
{
    if survivors.len() % 2 != 0 {
        return Err(ConfigurationError::OddSurvivors {
            survivors: survivors.len(),
        });
    }
    let mut seen = HashSet::with_capacity(survivors.len());
    if let Some(&agent) = survivors.iter().find(|&&i| !seen.insert(i)) {
        return Err(ConfigurationError::DuplicateSurvivor { index: agent });
    }

    let mut slots = survivors.to_vec();
    slots.shuffle(rng);
    Ok(slots
        .chunks_exact(2)
        .map(|pair| BreedingPair {
            first: pair[0],
            second: pair[1],
        })
        .collect())
}

/// Indices of the `n` fittest agents, best first.
///
/// Ties go to the lower index.
#[must_use]
pub fn top_n(fitnesses: &[f32], n: usize) -> Vec<usize> {
    let mut indices = (0..fitnesses.len()).collect::<Vec<_>>();
    indices.sort_by(|&a, &b| fitnesses[b].total_cmp(&fitnesses[a]));
    indices.truncate(n);
    indices
}
