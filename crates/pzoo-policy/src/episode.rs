use pzoo_engine::{Action, DeathType, EpisodeTerminatedError, GameSimulation, TileView};
use serde::{Deserialize, Serialize};

use crate::BreedablePolicy;

/// Outcome of one finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub fitness: f32,
    pub death_type: DeathType,
    pub ticks: u32,
}

impl EpisodeResult {
    /// The record used for an episode that could not be played to the end.
    pub const ABORTED: Self = Self {
        fitness: 0.0,
        death_type: DeathType::Dead,
        ticks: 0,
    };
}

/// Runs `simulation` to termination, asking `controller` for an action on
/// every tick.
pub fn run_episode<F>(
    simulation: &mut GameSimulation,
    mut controller: F,
) -> Result<EpisodeResult, EpisodeTerminatedError>
where
    F: FnMut(&TileView) -> Action,
{
    let death_type = loop {
        let action = controller(&simulation.view());
        if let Some(death_type) = simulation.step(action)? {
            break death_type;
        }
    };
    Ok(EpisodeResult {
        fitness: simulation.fitness(),
        death_type,
        ticks: simulation.tick(),
    })
}

/// Lets `policy` play `simulation` to termination.
pub fn play_episode<P>(
    policy: &P,
    simulation: &mut GameSimulation,
) -> Result<EpisodeResult, EpisodeTerminatedError>
where
    P: BreedablePolicy,
{
    run_episode(simulation, |view| policy.evaluate(view))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pzoo_engine::{
        Chunk, COMPLETION_BONUS, EpisodeLimits, GROUND_ROW, SPAWN_COL, ViewSize, World,
    };
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::{DnnArchitecture, FeedForwardDnn};

    fn flat_simulation(view: ViewSize) -> GameSimulation {
        let world = World::new(vec![Chunk::flat(GROUND_ROW)], SPAWN_COL + 10).unwrap();
        GameSimulation::with_world(Arc::new(world), EpisodeLimits::default(), view)
    }

    #[test]
    fn test_always_right_completes() {
        let mut sim = flat_simulation(ViewSize::default());
        let result = run_episode(&mut sim, |_| Action::new(false, true, false)).unwrap();
        assert_eq!(result.death_type, DeathType::Complete);
        assert!((result.fitness - (10.0 + COMPLETION_BONUS)).abs() < 1e-4);
        assert!(result.ticks < EpisodeLimits::default().max_ticks);
    }

    #[test]
    fn test_finished_simulation_is_rejected() {
        let mut sim = flat_simulation(ViewSize::default());
        run_episode(&mut sim, |_| Action::new(false, true, false)).unwrap();
        assert!(run_episode(&mut sim, |_| Action::NONE).is_err());
    }

    #[test]
    fn test_policy_episode_is_reproducible() {
        let arch = DnnArchitecture {
            view: ViewSize::new(5, 5),
            hidden: vec![8],
        };
        let policy = FeedForwardDnn::initialize(&arch, &mut Pcg64::seed_from_u64(11));
        let a = play_episode(&policy, &mut flat_simulation(arch.view)).unwrap();
        let b = play_episode(&policy, &mut flat_simulation(arch.view)).unwrap();
        assert_eq!(a, b);
    }
}
