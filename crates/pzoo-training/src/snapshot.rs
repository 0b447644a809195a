use std::{
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::Path,
};

use chrono::{DateTime, Utc};
use pzoo_engine::{DeathType, EpisodeLimits, GameConfig};
use pzoo_policy::BreedablePolicy;
use serde::{Deserialize, Serialize};

use crate::PersistenceError;

/// A saved agent together with the world it was evaluated in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot<P> {
    /// [`BreedablePolicy::ARCHITECTURE`] of the saved policy.
    pub architecture: String,
    pub generation: usize,
    pub fitness: f32,
    pub death_type: DeathType,
    pub saved_at: DateTime<Utc>,
    pub game: GameConfig,
    pub limits: EpisodeLimits,
    pub policy: P,
}

#[derive(Deserialize)]
struct SnapshotHeader {
    architecture: String,
}

impl<P> AgentSnapshot<P>
where
    P: BreedablePolicy,
{
    #[must_use]
    pub fn new(
        policy: P,
        generation: usize,
        fitness: f32,
        death_type: DeathType,
        game: GameConfig,
        limits: EpisodeLimits,
    ) -> Self {
        Self {
            architecture: P::ARCHITECTURE.to_owned(),
            generation,
            fitness,
            death_type,
            saved_at: Utc::now(),
            game,
            limits,
            policy,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let file = File::create(path).map_err(|source| PersistenceError::io(path, source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|source| PersistenceError::json(path, source))?;
        writeln!(writer).map_err(|source| PersistenceError::io(path, source))?;
        writer
            .flush()
            .map_err(|source| PersistenceError::io(path, source))?;
        Ok(())
    }

    /// Loads a snapshot, rejecting files written for another architecture.
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let text = fs::read_to_string(path).map_err(|source| PersistenceError::io(path, source))?;
        let header: SnapshotHeader =
            serde_json::from_str(&text).map_err(|source| PersistenceError::json(path, source))?;
        if header.architecture != P::ARCHITECTURE {
            return Err(PersistenceError::ArchitectureMismatch {
                expected: P::ARCHITECTURE.to_owned(),
                found: header.architecture,
            });
        }
        serde_json::from_str(&text).map_err(|source| PersistenceError::json(path, source))
    }
}

#[cfg(test)]
mod tests {
    use pzoo_engine::ViewSize;
    use pzoo_policy::{DnnArchitecture, FeedForwardDnn};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn snapshot() -> AgentSnapshot<FeedForwardDnn> {
        let arch = DnnArchitecture {
            view: ViewSize::new(4, 4),
            hidden: vec![6, 3],
        };
        let policy = FeedForwardDnn::initialize(&arch, &mut Pcg64::seed_from_u64(9));
        AgentSnapshot::new(
            policy,
            12,
            42.25,
            DeathType::Timeout,
            GameConfig {
                seed: 77,
                num_chunks: 3,
            },
            EpisodeLimits::default(),
        )
    }

    #[test]
    fn test_save_load_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");
        let saved = snapshot();
        saved.save(&path).unwrap();
        let loaded = AgentSnapshot::<FeedForwardDnn>::load(&path).unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_load_rejects_other_architecture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");
        let mut saved = snapshot();
        saved.architecture = "something-else".to_owned();
        saved.save(&path).unwrap();
        let err = AgentSnapshot::<FeedForwardDnn>::load(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::ArchitectureMismatch { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AgentSnapshot::<FeedForwardDnn>::load(&dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
    }
}
