//! On-disk record of a training run.
//!
//! A run directory contains:
//!
//! - `run_config.json` - the validated configuration
//! - `run_log.txt` - one line per generation (see [`format_log_line`])
//! - `gen_{generation}_{fitness}.json` - the best agent of every generation
//! - `best.json` - the best agent seen so far

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use pzoo_engine::DeathType;
use pzoo_policy::BreedablePolicy;
use serde::Serialize;

use crate::{
    snapshot::AgentSnapshot,
    stats::{DeathCounts, FitnessStats},
    trainer::{GenerationResult, GenerationSink},
};

pub const RUN_LOG_FILE: &str = "run_log.txt";
pub const RUN_CONFIG_FILE: &str = "run_config.json";
pub const BEST_SNAPSHOT_FILE: &str = "best.json";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PersistenceError {
    #[display("I/O error on {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("invalid JSON in {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("snapshot architecture mismatch: expected {expected}, found {found}")]
    ArchitectureMismatch { expected: String, found: String },
    #[display("output directory already exists: {}", path.display())]
    DirectoryExists { path: PathBuf },
}

impl PersistenceError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_owned(),
            source,
        }
    }
}

/// One `run_log.txt` line: `min, max, avg, dead, complete, timeout`.
///
/// # Examples
///
/// ```
/// use pzoo_training::{
///     run_logger::format_log_line,
///     stats::{DeathCounts, FitnessStats},
/// };
///
/// let stats = FitnessStats { min: 0.0, max: 112.5, mean: 7.25 };
/// let deaths = DeathCounts { complete: 1, dead: 90, timeout: 9 };
/// assert_eq!(format_log_line(&stats, &deaths), "0.00, 112.50, 7.25, 90, 1, 9");
/// ```
#[must_use]
pub fn format_log_line(stats: &FitnessStats, deaths: &DeathCounts) -> String {
    let [dead, complete, timeout] = LOG_ORDER.map(|death_type| deaths.get(death_type));
    format!(
        "{:.2}, {:.2}, {:.2}, {dead}, {complete}, {timeout}",
        stats.min, stats.max, stats.mean
    )
}

const LOG_ORDER: [DeathType; 3] = [DeathType::Dead, DeathType::Complete, DeathType::Timeout];

/// Snapshot file name for the best agent of `generation`.
#[must_use]
pub fn snapshot_file_name(generation: usize, fitness: f32) -> String {
    format!("gen_{generation:05}_{fitness:.2}.json")
}

/// Writes the run directory as generations complete.
#[derive(Debug)]
pub struct RunLogger {
    dir: PathBuf,
    log: BufWriter<File>,
    best_fitness: Option<f32>,
}

impl RunLogger {
    /// Creates the run directory and an empty run log.
    ///
    /// An existing directory is an error unless `force` is set, in which case
    /// it is removed first.
    pub fn create(dir: impl Into<PathBuf>, force: bool) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        if dir.exists() {
            if !force {
                return Err(PersistenceError::DirectoryExists { path: dir });
            }
            log::warn!("removing existing run directory {}", dir.display());
            fs::remove_dir_all(&dir).map_err(|source| PersistenceError::io(&dir, source))?;
        }
        fs::create_dir_all(&dir).map_err(|source| PersistenceError::io(&dir, source))?;

        let log_path = dir.join(RUN_LOG_FILE);
        let file =
            File::create(&log_path).map_err(|source| PersistenceError::io(&log_path, source))?;
        Ok(Self {
            dir,
            log: BufWriter::new(file),
            best_fitness: None,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn best_fitness(&self) -> Option<f32> {
        self.best_fitness
    }

    pub fn write_config<T>(&self, config: &T) -> Result<(), PersistenceError>
    where
        T: Serialize,
    {
        let path = self.dir.join(RUN_CONFIG_FILE);
        let json = serde_json::to_string_pretty(config)
            .map_err(|source| PersistenceError::json(&path, source))?;
        fs::write(&path, json + "\n").map_err(|source| PersistenceError::io(&path, source))
    }

    fn append_line(&mut self, line: &str) -> Result<(), PersistenceError> {
        let path = self.dir.join(RUN_LOG_FILE);
        writeln!(self.log, "{line}")
            .and_then(|()| self.log.flush())
            .map_err(|source| PersistenceError::io(&path, source))
    }
}

impl<P> GenerationSink<P> for RunLogger
where
    P: BreedablePolicy,
{
    fn record(
        &mut self,
        result: &GenerationResult,
        population: &[P],
    ) -> Result<(), PersistenceError> {
        self.append_line(&format_log_line(&result.stats, &result.deaths))?;

        let Some(best) = result.best_index() else {
            return Ok(());
        };
        let episode = result.episodes[best];
        let snapshot = AgentSnapshot::new(
            population[best].clone(),
            result.generation,
            episode.fitness,
            episode.death_type,
            result.game,
            result.limits,
        );
        snapshot.save(
            &self
                .dir
                .join(snapshot_file_name(result.generation, episode.fitness)),
        )?;

        if self.best_fitness.is_none_or(|best| episode.fitness > best) {
            log::debug!(
                "new best agent in generation {} (fitness {:.2})",
                result.generation,
                episode.fitness
            );
            snapshot.save(&self.dir.join(BEST_SNAPSHOT_FILE))?;
            self.best_fitness = Some(episode.fitness);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pzoo_engine::{DeathType, EpisodeLimits, GameConfig, ViewSize};
    use pzoo_policy::{DnnArchitecture, EpisodeResult, FeedForwardDnn};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn generation(generation: usize, fitnesses: &[f32]) -> GenerationResult {
        let episodes = fitnesses
            .iter()
            .map(|&fitness| EpisodeResult {
                fitness,
                death_type: if fitness > 100.0 {
                    DeathType::Complete
                } else {
                    DeathType::Dead
                },
                ticks: 10,
            })
            .collect();
        GenerationResult::new(
            generation,
            GameConfig::default(),
            EpisodeLimits::default(),
            episodes,
        )
    }

    fn population(n: usize) -> Vec<FeedForwardDnn> {
        let arch = DnnArchitecture {
            view: ViewSize::new(2, 2),
            hidden: vec![2],
        };
        let mut rng = Pcg64::seed_from_u64(0);
        (0..n)
            .map(|_| FeedForwardDnn::initialize(&arch, &mut rng))
            .collect()
    }

    #[test]
    fn test_log_line_format() {
        let stats = FitnessStats {
            min: 1.0,
            max: 2.5,
            mean: 1.333,
        };
        let deaths = DeathCounts {
            complete: 0,
            dead: 3,
            timeout: 1,
        };
        assert_eq!(format_log_line(&stats, &deaths), "1.00, 2.50, 1.33, 3, 0, 1");
    }

    #[test]
    fn test_snapshot_file_name() {
        assert_eq!(snapshot_file_name(7, 12.346), "gen_00007_12.35.json");
    }

    #[test]
    fn test_existing_directory_requires_force() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("run");
        RunLogger::create(&dir, false).unwrap();
        assert!(matches!(
            RunLogger::create(&dir, false),
            Err(PersistenceError::DirectoryExists { .. })
        ));
        RunLogger::create(&dir, true).unwrap();
    }

    #[test]
    fn test_record_writes_log_and_snapshots() {
        let root = tempfile::tempdir().unwrap();
        let mut logger = RunLogger::create(root.path().join("run"), false).unwrap();
        logger.write_config(&GameConfig::default()).unwrap();
        let agents = population(4);

        logger
            .record(&generation(0, &[1.0, 3.5, 0.0, 2.5]), &agents)
            .unwrap();
        logger
            .record(&generation(1, &[0.5, 0.25, 0.0, 1.0]), &agents)
            .unwrap();
        logger
            .record(&generation(2, &[0.0, 0.0, 110.0, 0.0]), &agents)
            .unwrap();

        let dir = logger.dir().to_owned();
        let log = fs::read_to_string(dir.join(RUN_LOG_FILE)).unwrap();
        let lines = log.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "0.00, 3.50, 1.75, 4, 0, 0",
                "0.00, 1.00, 0.44, 4, 0, 0",
                "0.00, 110.00, 27.50, 3, 1, 0",
            ]
        );
        assert!(dir.join(RUN_CONFIG_FILE).exists());
        assert!(dir.join("gen_00000_3.50.json").exists());
        assert!(dir.join("gen_00001_1.00.json").exists());
        assert!(dir.join("gen_00002_110.00.json").exists());

        let best = AgentSnapshot::<FeedForwardDnn>::load(&dir.join(BEST_SNAPSHOT_FILE)).unwrap();
        assert_eq!(best.generation, 2);
        assert_eq!(best.death_type, DeathType::Complete);
        assert_eq!(best.policy, agents[2]);
        assert_eq!(logger.best_fitness(), Some(110.0));
    }
}
