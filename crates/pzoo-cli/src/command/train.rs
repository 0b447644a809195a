use std::path::PathBuf;

use anyhow::Context;
use pzoo_engine::{EpisodeLimits, GameConfig, ViewSize};
use pzoo_policy::{DnnArchitecture, FeedForwardDnn};
use pzoo_training::{RunLogger, Trainer, TrainingConfig};
use rand::Rng as _;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Seed of the master random generator (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of agents per generation
    #[arg(long, default_value_t = 100)]
    agents: usize,
    #[arg(long, default_value_t = 100)]
    generations: usize,
    /// Top agents carried unchanged into the next generation (must be even)
    #[arg(long, default_value_t = 4)]
    n_forward: usize,
    /// Switch to a new level every this many generations (0 = never)
    #[arg(long, default_value_t = 20)]
    cycle_levels: usize,
    /// Number of chunks in a level
    #[arg(long, default_value_t = 10)]
    num_chunks: u32,
    /// Seed of the first level
    #[arg(long, default_value_t = 10101)]
    level_seed: u64,
    /// Tick ceiling of an episode
    #[arg(long, default_value_t = 3600)]
    max_ticks: u32,
    /// Ticks without progress before an episode times out (0 = never)
    #[arg(long, default_value_t = 360)]
    idle_ticks: u32,
    #[arg(long, default_value_t = 15)]
    view_rows: u16,
    #[arg(long, default_value_t = 15)]
    view_cols: u16,
    /// Hidden layer widths, comma separated
    #[arg(long, value_delimiter = ',', default_value = "64,32,16")]
    hidden: Vec<usize>,
    /// Run directory for the log, snapshots and configuration
    #[arg(long, default_value = "runs/latest")]
    log_dir: PathBuf,
    /// Replace the run directory if it already exists
    #[arg(long)]
    force: bool,
}

impl TrainArg {
    fn to_config(&self) -> TrainingConfig<DnnArchitecture> {
        TrainingConfig {
            run_seed: self.seed.unwrap_or_else(|| rand::rng().random()),
            population_size: self.agents,
            generations: self.generations,
            n_forward: self.n_forward,
            cycle_levels: (self.cycle_levels > 0).then_some(self.cycle_levels),
            game: GameConfig {
                seed: self.level_seed,
                num_chunks: self.num_chunks,
            },
            limits: EpisodeLimits {
                max_ticks: self.max_ticks,
                idle_ticks: (self.idle_ticks > 0).then_some(self.idle_ticks),
            },
            architecture: DnnArchitecture {
                view: ViewSize::new(self.view_rows, self.view_cols),
                hidden: self.hidden.clone(),
            },
        }
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.to_config();
    let mut trainer =
        Trainer::<FeedForwardDnn>::new(config.clone()).context("Invalid training configuration")?;

    let mut logger = RunLogger::create(&arg.log_dir, arg.force)?;
    logger.write_config(&config)?;

    eprintln!("Training {} agents", config.population_size);
    eprintln!("  Run seed:     {}", config.run_seed);
    eprintln!("  Architecture: {}", config.architecture);
    eprintln!(
        "  Parameters:   {} per agent",
        config.architecture.parameter_count()
    );
    eprintln!("  Run dir:      {}", logger.dir().display());

    let results = trainer.run(&mut logger)?;

    eprintln!();
    eprintln!("Training completed");
    eprintln!("  Generations: {}", results.len());
    if let Some(last) = results.last() {
        eprintln!(
            "  Last generation: min {:.2}, max {:.2}, avg {:.2}",
            last.stats.min, last.stats.max, last.stats.mean
        );
        eprintln!(
            "  Last outcomes:   {} complete, {} dead, {} timeout",
            last.deaths.complete, last.deaths.dead, last.deaths.timeout
        );
    }
    if let Some(best) = logger.best_fitness() {
        eprintln!("  Best fitness: {best:.2}");
    }
    Ok(())
}
