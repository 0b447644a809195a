//! Generation loop: evaluation, elitism, breeding and world reseeding.
//!
//! One call to [`Trainer::run_generation`] performs
//!
//! ```text
//! EVALUATE -> LOG -> ELITE_COPY -> SELECT -> PAIR -> BREED -> REINSERT -> RESEED
//! ```
//!
//! # Randomness
//!
//! The trainer owns the only master generator. It is drawn from in a fixed
//! order: the initial population, then per generation the survivor draw, the
//! pair shuffle, one breed seed and, on reseed generations, the next world
//! seed. Evaluation never touches it, and pair `k` breeds with a generator
//! seeded from `derive_seed(breed_seed, k)`, so both parallel phases produce
//! the same result regardless of thread scheduling.
//!
//! # Parallelization
//!
//! Episodes and breeding pairs are processed with rayon. Every agent gets its
//! own [`GameSimulation`] over a world shared through [`Arc`]; results are
//! collected in population order.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use pzoo_engine::{
    EpisodeLimits, GameConfig, GameSimulation, World, WorldConfigError, derive_seed,
};
use pzoo_policy::{BreedablePolicy, EpisodeResult, play_episode};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use rayon::prelude::*;

use crate::{
    ConfigurationError, PersistenceError, TrainingConfig, genetic,
    stats::{DeathCounts, FitnessStats},
};

/// Everything observed while evaluating one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub generation: usize,
    /// World the generation was evaluated in.
    pub game: GameConfig,
    pub limits: EpisodeLimits,
    /// One entry per agent, aligned with the population.
    pub episodes: Vec<EpisodeResult>,
    pub stats: FitnessStats,
    pub deaths: DeathCounts,
}

impl GenerationResult {
    /// # Panics
    ///
    /// Panics if `episodes` is empty.
    #[must_use]
    pub fn new(
        generation: usize,
        game: GameConfig,
        limits: EpisodeLimits,
        episodes: Vec<EpisodeResult>,
    ) -> Self {
        let stats = FitnessStats::new(episodes.iter().map(|e| e.fitness)).unwrap();
        let deaths = DeathCounts::new(episodes.iter().map(|e| e.death_type));
        Self {
            generation,
            game,
            limits,
            episodes,
            stats,
            deaths,
        }
    }

    #[must_use]
    pub fn fitnesses(&self) -> Vec<f32> {
        self.episodes.iter().map(|e| e.fitness).collect()
    }

    /// Index of the fittest agent; the lowest index wins ties.
    #[must_use]
    pub fn best_index(&self) -> Option<usize> {
        genetic::top_n(&self.fitnesses(), 1).first().copied()
    }
}

/// Receives every generation before it is bred.
pub trait GenerationSink<P> {
    fn record(
        &mut self,
        result: &GenerationResult,
        population: &[P],
    ) -> Result<(), PersistenceError>;
}

impl<P> GenerationSink<P> for () {
    fn record(&mut self, _: &GenerationResult, _: &[P]) -> Result<(), PersistenceError> {
        Ok(())
    }
}

impl<P> GenerationSink<P> for Vec<GenerationResult> {
    fn record(&mut self, result: &GenerationResult, _: &[P]) -> Result<(), PersistenceError> {
        self.push(result.clone());
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid training configuration")]
    Configuration(ConfigurationError),
    #[display("failed to generate the world")]
    World(WorldConfigError),
    #[display("failed to record the generation")]
    Persistence(PersistenceError),
}

/// Runs the genetic algorithm over a population of `P`.
#[derive(Debug)]
pub struct Trainer<P>
where
    P: BreedablePolicy,
{
    config: TrainingConfig<P::Architecture>,
    rng: Pcg64,
    population: Vec<P>,
    generation: usize,
    game: GameConfig,
}

impl<P> Trainer<P>
where
    P: BreedablePolicy,
{
    /// Validates `config` and creates the initial random population.
    pub fn new(config: TrainingConfig<P::Architecture>) -> Result<Self, ConfigurationError> {
        config.validate()?;
        P::validate_architecture(&config.architecture)?;
        let mut rng = Pcg64::seed_from_u64(config.run_seed);
        let population = (0..config.population_size)
            .map(|_| P::initialize(&config.architecture, &mut rng))
            .collect();
        let game = config.game;
        Ok(Self {
            config,
            rng,
            population,
            generation: 0,
            game,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig<P::Architecture> {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &[P] {
        &self.population
    }

    /// Index of the next generation to be evaluated.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// World the next generation will be evaluated in.
    #[must_use]
    pub fn game(&self) -> GameConfig {
        self.game
    }

    /// Plays every agent through the current world.
    ///
    /// An agent whose episode panics is recorded as dead with zero fitness.
    pub fn evaluate(&self) -> Result<GenerationResult, WorldConfigError> {
        let world = Arc::new(World::generate(&self.game)?);
        let limits = self.config.limits;
        let episodes = self
            .population
            .par_iter()
            .enumerate()
            .map(|(index, policy)| {
                let world = Arc::clone(&world);
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let mut simulation =
                        GameSimulation::with_world(world, limits, policy.view_size());
                    play_episode(policy, &mut simulation)
                }));
                match outcome {
                    Ok(Ok(result)) => result,
                    Ok(Err(err)) => {
                        log::warn!("agent {index}: {err}; recorded as dead");
                        EpisodeResult::ABORTED
                    }
                    Err(_) => {
                        log::warn!("agent {index}: episode panicked; recorded as dead");
                        EpisodeResult::ABORTED
                    }
                }
            })
            .collect();
        Ok(GenerationResult::new(
            self.generation,
            self.game,
            limits,
            episodes,
        ))
    }

    /// Replaces the population with the next generation.
    ///
    /// `fitnesses` must be aligned with the current population.
    pub fn advance(&mut self, fitnesses: &[f32]) -> Result<(), ConfigurationError> {
        if fitnesses.len() != self.population.len() {
            return Err(ConfigurationError::FitnessCountMismatch {
                fitnesses: fitnesses.len(),
                population_size: self.population.len(),
            });
        }
        let n_forward = self.config.n_forward;

        let elites = genetic::top_n(fitnesses, n_forward)
            .into_iter()
            .map(|i| self.population[i].clone())
            .collect::<Vec<_>>();
        let survivors = genetic::select_survivors(fitnesses, n_forward, &mut self.rng)?;
        let pairs = genetic::select_breeding_pairs(&survivors, &mut self.rng)?;
        let breed_seed = self.rng.random::<u64>();

        let population = &self.population;
        let children = pairs
            .par_iter()
            .enumerate()
            .map(|(k, pair)| {
                let mut rng = Pcg64::seed_from_u64(derive_seed(breed_seed, k as u64));
                P::breed(&population[pair.first], &population[pair.second], &mut rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut next = Vec::with_capacity(self.population.len());
        for (a, b) in children {
            next.push(a);
            next.push(b);
        }
        next.extend(elites);
        debug_assert_eq!(next.len(), self.population.len());
        self.population = next;

        if self
            .config
            .cycle_levels
            .is_some_and(|c| self.generation % c == c - 1)
        {
            self.game.seed = self.rng.random();
            log::debug!(
                "generation {}: switching to world seed {}",
                self.generation,
                self.game.seed
            );
        }
        self.generation += 1;
        Ok(())
    }

    /// Evaluates the current generation, hands it to `sink` and breeds the
    /// next one.
    pub fn run_generation<S>(&mut self, sink: &mut S) -> Result<GenerationResult, TrainingError>
    where
        S: GenerationSink<P> + ?Sized,
    {
        let result = self.evaluate()?;
        log::info!(
            "generation {} (seed {}): min {:.2}, max {:.2}, avg {:.2}, dead {}, complete {}, timeout {}",
            result.generation,
            result.game.seed,
            result.stats.min,
            result.stats.max,
            result.stats.mean,
            result.deaths.dead,
            result.deaths.complete,
            result.deaths.timeout,
        );
        sink.record(&result, &self.population)?;
        self.advance(&result.fitnesses())?;
        Ok(result)
    }

    /// Runs all remaining generations of the configuration.
    pub fn run<S>(&mut self, sink: &mut S) -> Result<Vec<GenerationResult>, TrainingError>
    where
        S: GenerationSink<P> + ?Sized,
    {
        let mut results = Vec::new();
        while self.generation < self.config.generations {
            results.push(self.run_generation(sink)?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use pzoo_engine::{Action, TileView, ViewSize};
    use pzoo_policy::{DnnArchitecture, FeedForwardDnn, InvalidArchitectureError};
    use serde::{Deserialize, Serialize};

    use super::*;

    fn config() -> TrainingConfig<DnnArchitecture> {
        config_with(DnnArchitecture {
            view: ViewSize::new(5, 5),
            hidden: vec![6],
        })
    }

    fn config_with<A>(architecture: A) -> TrainingConfig<A> {
        TrainingConfig {
            run_seed: 2024,
            population_size: 12,
            generations: 3,
            n_forward: 2,
            cycle_levels: Some(2),
            game: GameConfig {
                seed: 31,
                num_chunks: 2,
            },
            limits: EpisodeLimits {
                max_ticks: 400,
                idle_ticks: Some(60),
            },
            architecture,
        }
    }

    #[test]
    fn test_population_size_is_preserved() {
        let mut trainer = Trainer::<FeedForwardDnn>::new(config()).unwrap();
        for _ in 0..3 {
            let result = trainer.run_generation(&mut ()).unwrap();
            assert_eq!(result.episodes.len(), 12);
            assert_eq!(trainer.population().len(), 12);
        }
    }

    #[test]
    fn test_death_counts_cover_population() {
        let trainer = Trainer::<FeedForwardDnn>::new(config()).unwrap();
        let result = trainer.evaluate().unwrap();
        assert_eq!(result.deaths.total(), 12);
        assert!(result.episodes.iter().all(|e| e.fitness >= 0.0));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        Trainer::<FeedForwardDnn>::new(config())
            .unwrap()
            .run(&mut a)
            .unwrap();
        Trainer::<FeedForwardDnn>::new(config())
            .unwrap()
            .run(&mut b)
            .unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_elitism_never_loses_best_fitness() {
        let config = TrainingConfig {
            cycle_levels: None,
            generations: 4,
            ..config()
        };
        let mut trainer = Trainer::<FeedForwardDnn>::new(config).unwrap();
        let results = trainer.run(&mut ()).unwrap();
        for pair in results.windows(2) {
            assert!(
                pair[1].stats.max >= pair[0].stats.max,
                "max fitness dropped from {} to {}",
                pair[0].stats.max,
                pair[1].stats.max
            );
        }
    }

    #[test]
    fn test_elites_are_carried_unchanged() {
        let mut trainer = Trainer::<FeedForwardDnn>::new(config()).unwrap();
        let result = trainer.evaluate().unwrap();
        let best = result.best_index().unwrap();
        let best_policy = trainer.population()[best].clone();
        trainer.advance(&result.fitnesses()).unwrap();
        // elites are appended after the children
        assert_eq!(trainer.population()[10], best_policy);
    }

    #[test]
    fn test_world_reseeds_on_cycle() {
        let mut trainer = Trainer::<FeedForwardDnn>::new(config()).unwrap();
        let initial = trainer.game();
        let fitnesses = vec![1.0; 12];
        trainer.advance(&fitnesses).unwrap();
        assert_eq!(trainer.game(), initial);
        trainer.advance(&fitnesses).unwrap();
        assert_ne!(trainer.game().seed, initial.seed);
        assert_eq!(trainer.game().num_chunks, initial.num_chunks);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_any_generation() {
        let odd = TrainingConfig {
            n_forward: 3,
            ..config()
        };
        assert!(Trainer::<FeedForwardDnn>::new(odd).is_err());

        let empty_view = TrainingConfig {
            architecture: DnnArchitecture {
                view: ViewSize::new(0, 5),
                hidden: vec![6],
            },
            ..config()
        };
        assert!(matches!(
            Trainer::<FeedForwardDnn>::new(empty_view),
            Err(ConfigurationError::Architecture(_))
        ));
    }

    /// Runs right every tick, or panics when asked to.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct RunRight {
        view: ViewSize,
        panics: bool,
    }

    impl BreedablePolicy for RunRight {
        type Architecture = ViewSize;

        const ARCHITECTURE: &'static str = "run-right";

        fn validate_architecture(_: &ViewSize) -> Result<(), InvalidArchitectureError> {
            Ok(())
        }

        fn initialize<R>(view: &ViewSize, _: &mut R) -> Self
        where
            R: rand::Rng + ?Sized,
        {
            Self {
                view: *view,
                panics: false,
            }
        }

        fn architecture(&self) -> &ViewSize {
            &self.view
        }

        fn view_size(&self) -> ViewSize {
            self.view
        }

        fn evaluate(&self, _: &TileView) -> Action {
            assert!(!self.panics, "policy failure");
            Action::new(false, true, false)
        }

        fn breed<R>(
            a: &Self,
            b: &Self,
            _: &mut R,
        ) -> Result<(Self, Self), pzoo_policy::ArchitectureMismatchError>
        where
            R: rand::Rng + ?Sized,
        {
            Ok((a.clone(), b.clone()))
        }
    }

    #[test]
    fn test_panicking_episode_is_recorded_as_dead() {
        let healthy = Trainer::<RunRight>::new(config_with(ViewSize::new(3, 3))).unwrap();
        let expected = healthy.evaluate().unwrap();

        let mut trainer = Trainer::<RunRight>::new(config_with(ViewSize::new(3, 3))).unwrap();
        trainer.population[3].panics = true;
        let result = trainer.evaluate().unwrap();

        assert_eq!(result.episodes.len(), 12);
        assert_eq!(result.episodes[3], EpisodeResult::ABORTED);
        for (i, (got, want)) in result.episodes.iter().zip(&expected.episodes).enumerate() {
            if i != 3 {
                assert_eq!(got, want, "agent {i}");
                assert!(got.ticks > 0, "agent {i}");
            }
        }
        assert_eq!(result.deaths.total(), 12);

        // the generation still breeds
        trainer.advance(&result.fitnesses()).unwrap();
        assert_eq!(trainer.population().len(), 12);
    }

    #[test]
    fn test_advance_rejects_misaligned_fitnesses() {
        let mut trainer = Trainer::<FeedForwardDnn>::new(config()).unwrap();
        let err = trainer.advance(&[1.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::FitnessCountMismatch {
                fitnesses: 5,
                population_size: 12,
            }
        ));
        assert_eq!(trainer.generation(), 0);
    }
}
