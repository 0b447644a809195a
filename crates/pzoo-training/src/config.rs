use pzoo_engine::{EpisodeLimits, GameConfig, InvalidLimitsError, WorldConfigError};
use pzoo_policy::{ArchitectureMismatchError, InvalidArchitectureError};
use serde::{Deserialize, Serialize};

/// Parameters of a training run.
///
/// A run is fully determined by its configuration: two runs with the same
/// configuration produce identical generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig<A> {
    /// Seed of the master random generator.
    pub run_seed: u64,
    pub population_size: usize,
    pub generations: usize,
    /// Number of top agents carried unchanged into the next generation. Must
    /// be even so the remaining slots can be filled by pairs.
    pub n_forward: usize,
    /// Draw a new world seed every this many generations. `None` keeps the
    /// initial world for the whole run.
    pub cycle_levels: Option<usize>,
    /// World of the first generation.
    pub game: GameConfig,
    pub limits: EpisodeLimits,
    pub architecture: A,
}

impl<A> Default for TrainingConfig<A>
where
    A: Default,
{
    fn default() -> Self {
        Self {
            run_seed: 123_456,
            population_size: 100,
            generations: 100,
            n_forward: 4,
            cycle_levels: Some(20),
            game: GameConfig::default(),
            limits: EpisodeLimits::default(),
            architecture: A::default(),
        }
    }
}

impl<A> TrainingConfig<A> {
    /// Checks everything that can be checked before the first generation.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let Self {
            population_size,
            n_forward,
            cycle_levels,
            ..
        } = *self;
        if population_size == 0 {
            return Err(ConfigurationError::EmptyPopulation);
        }
        if population_size % 2 != 0 {
            return Err(ConfigurationError::OddPopulation { population_size });
        }
        if n_forward % 2 != 0 {
            return Err(ConfigurationError::OddElitism { n_forward });
        }
        if n_forward >= population_size {
            return Err(ConfigurationError::TooManyElites {
                n_forward,
                population_size,
            });
        }
        if cycle_levels == Some(0) {
            return Err(ConfigurationError::ZeroCycleLevels);
        }
        self.game.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ConfigurationError {
    #[display("population must not be empty")]
    EmptyPopulation,
    #[display("population size must be even, got {population_size}")]
    OddPopulation { population_size: usize },
    #[display("n_forward must be even, got {n_forward}")]
    OddElitism { n_forward: usize },
    #[display("n_forward ({n_forward}) must be smaller than the population ({population_size})")]
    TooManyElites {
        n_forward: usize,
        population_size: usize,
    },
    #[display("cycle_levels must be positive when set")]
    ZeroCycleLevels,
    #[display("{save_spots} save spots requested for {population_size} agents")]
    TooManySaveSpots {
        save_spots: usize,
        population_size: usize,
    },
    #[display("breeding needs an even number of survivors, got {survivors}")]
    OddSurvivors { survivors: usize },
    #[display("agent {index} was selected as a survivor more than once")]
    DuplicateSurvivor { index: usize },
    #[display("got {fitnesses} fitness values for {population_size} agents")]
    FitnessCountMismatch {
        fitnesses: usize,
        population_size: usize,
    },
    #[display("invalid world configuration")]
    #[from]
    World(WorldConfigError),
    #[display("invalid episode limits")]
    #[from]
    Limits(InvalidLimitsError),
    #[display("invalid policy architecture")]
    #[from]
    Architecture(InvalidArchitectureError),
    #[display("population has inconsistent architectures")]
    #[from]
    ArchitectureMismatch(ArchitectureMismatchError),
}
