use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    Action, EpisodeTerminatedError, GameConfig, InvalidLimitsError, TileKind, TileView, ViewSize,
    World, WorldConfigError,
};

use super::physics::Player;

/// Column the player starts in.
pub const SPAWN_COL: usize = 2;

/// Added to the fitness of an episode that reaches the finish.
pub const COMPLETION_BONUS: f32 = 100.0;

/// How an episode ended. Assigned exactly once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeathType {
    /// Reached the end of the level.
    Complete,
    /// Fell out of the world, touched a hazard, or the physics diverged.
    Dead,
    /// Ran out of ticks while still alive.
    Timeout,
}

impl fmt::Display for DeathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeathType::Complete => "COMPLETE",
            DeathType::Dead => "DEAD",
            DeathType::Timeout => "TIMEOUT",
        };
        f.write_str(s)
    }
}

/// Tick ceilings for one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeLimits {
    /// Episode times out once this many ticks have run.
    pub max_ticks: u32,
    /// Episode times out after this many consecutive ticks without progress.
    pub idle_ticks: Option<u32>,
}

impl Default for EpisodeLimits {
    fn default() -> Self {
        Self {
            max_ticks: 60 * 60,
            idle_ticks: Some(60 * 6),
        }
    }
}

impl EpisodeLimits {
    pub fn validate(&self) -> Result<(), InvalidLimitsError> {
        if self.max_ticks == 0 {
            return Err(InvalidLimitsError::ZeroMaxTicks);
        }
        if self.idle_ticks == Some(0) {
            return Err(InvalidLimitsError::ZeroIdleTicks);
        }
        Ok(())
    }
}

/// A single episode: one player running through one world.
///
/// # Example
///
/// ```
/// use pzoo_engine::{Action, EpisodeLimits, GameConfig, GameSimulation, ViewSize};
///
/// let config = GameConfig { seed: 7, num_chunks: 2 };
/// let mut sim = GameSimulation::reset(&config, EpisodeLimits::default(), ViewSize::default())?;
/// while !sim.is_terminated() {
///     let _view = sim.view();
///     sim.step(Action::new(false, true, false))?;
/// }
/// assert!(sim.death_type().is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct GameSimulation {
    world: Arc<World>,
    limits: EpisodeLimits,
    view_size: ViewSize,
    player: Player,
    tick: u32,
    progress: f32,
    ticks_since_progress: u32,
    death_type: Option<DeathType>,
}

impl GameSimulation {
    /// Generates the world for `config` and starts a fresh episode in it.
    pub fn reset(
        config: &GameConfig,
        limits: EpisodeLimits,
        view_size: ViewSize,
    ) -> Result<Self, WorldConfigError> {
        let world = World::generate(config)?;
        Ok(Self::with_world(Arc::new(world), limits, view_size))
    }

    /// Starts a fresh episode in an existing world.
    #[must_use]
    pub fn with_world(world: Arc<World>, limits: EpisodeLimits, view_size: ViewSize) -> Self {
        let player = Player::spawn(&world, SPAWN_COL);
        Self {
            world,
            limits,
            view_size,
            player,
            tick: 0,
            progress: 0.0,
            ticks_since_progress: 0,
            death_type: None,
        }
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[must_use]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    #[must_use]
    pub fn limits(&self) -> EpisodeLimits {
        self.limits
    }

    #[must_use]
    pub fn death_type(&self) -> Option<DeathType> {
        self.death_type
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.death_type.is_some()
    }

    /// Furthest distance travelled to the right of the spawn column.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Current fitness; final once the episode has terminated.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        match self.death_type {
            Some(DeathType::Complete) => self.progress + COMPLETION_BONUS,
            _ => self.progress,
        }
    }

    /// The window of tiles around the player.
    ///
    /// Always exactly the configured view size; cells outside the world are
    /// [`TileKind::Void`].
    #[must_use]
    pub fn view(&self) -> TileView {
        let (col, row) = self.player.center_cell();
        self.world.view(col, row, self.view_size)
    }

    /// Advances the episode by one tick.
    ///
    /// Returns the death type if this tick ended the episode.
    pub fn step(&mut self, action: Action) -> Result<Option<DeathType>, EpisodeTerminatedError> {
        if self.is_terminated() {
            return Err(EpisodeTerminatedError);
        }

        self.player.step(action, &self.world);
        self.tick += 1;
        self.update_progress();
        self.death_type = self.terminate_check();
        if let Some(death_type) = self.death_type {
            log::trace!(
                "episode ended at tick {} with {death_type} (fitness {:.2})",
                self.tick,
                self.fitness()
            );
        }
        Ok(self.death_type)
    }

    #[expect(clippy::cast_precision_loss)]
    fn update_progress(&mut self) {
        let distance = self.player.x - SPAWN_COL as f32;
        if distance.is_finite() && distance > self.progress {
            self.progress = distance;
            self.ticks_since_progress = 0;
        } else {
            self.ticks_since_progress += 1;
        }
    }

    /// Classifies the episode after a step: completion, then death, then
    /// timeout.
    #[expect(clippy::cast_precision_loss)]
    fn terminate_check(&mut self) -> Option<DeathType> {
        if !self.player.is_finite() {
            return Some(DeathType::Dead);
        }

        let finish_col = self.world.finish_col() as f32;
        let (on_finish, on_hazard) = self
            .player
            .touching(&self.world)
            .fold((false, false), |(finish, hazard), tile| {
                (finish || tile == TileKind::Finish, hazard || tile.is_hazard())
            });
        if on_finish || self.player.x >= finish_col {
            self.progress = finish_col - SPAWN_COL as f32;
            return Some(DeathType::Complete);
        }

        if on_hazard || self.player.y >= self.world.height() as f32 {
            return Some(DeathType::Dead);
        }

        let idle = self
            .limits
            .idle_ticks
            .is_some_and(|limit| self.ticks_since_progress >= limit);
        if self.tick >= self.limits.max_ticks || idle {
            return Some(DeathType::Timeout);
        }
        None
    }
}
