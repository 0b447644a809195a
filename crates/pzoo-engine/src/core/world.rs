use std::fmt;

use serde::{Deserialize, Serialize};

use crate::WorldConfigError;

use super::{
    chunk::{CHUNK_HEIGHT, CHUNK_WIDTH, Chunk},
    tile::TileKind,
    view::{TileView, ViewSize},
};

/// Upper bound on the number of chunks in one level.
pub const MAX_CHUNKS: u32 = 1024;

/// Identifies a generated level.
///
/// Saved agents carry this so that they can be replayed in the world they
/// were evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameConfig {
    pub seed: u64,
    pub num_chunks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 10101,
            num_chunks: 10,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), WorldConfigError> {
        match self.num_chunks {
            0 => Err(WorldConfigError::NoChunks),
            n if n > MAX_CHUNKS => Err(WorldConfigError::TooManyChunks { num_chunks: n }),
            _ => Ok(()),
        }
    }
}

/// A complete level: chunks laid out left to right plus the finish column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    chunks: Vec<Chunk>,
    finish_col: usize,
}

impl World {
    /// Builds a world from explicit chunks.
    ///
    /// Every empty cell of `finish_col` becomes a [`TileKind::Finish`] tile.
    pub fn new(mut chunks: Vec<Chunk>, finish_col: usize) -> Result<Self, WorldConfigError> {
        if chunks.is_empty() {
            return Err(WorldConfigError::NoChunks);
        }
        let width = chunks.len() * CHUNK_WIDTH;
        if finish_col >= width {
            return Err(WorldConfigError::FinishOutOfRange { finish_col, width });
        }

        let chunk = &mut chunks[finish_col / CHUNK_WIDTH];
        let local_col = finish_col % CHUNK_WIDTH;
        for row in 0..CHUNK_HEIGHT {
            if chunk.get(row, local_col) == Some(TileKind::Empty) {
                chunk.set(row, local_col, TileKind::Finish);
            }
        }

        Ok(Self { chunks, finish_col })
    }

    /// Generates the level described by `config`.
    ///
    /// The finish column sits two columns before the end of the last chunk,
    /// where the ground is always flat.
    pub fn generate(config: &GameConfig) -> Result<Self, WorldConfigError> {
        config.validate()?;
        let chunks = (0..u64::from(config.num_chunks))
            .map(|index| Chunk::generate(config.seed, index))
            .collect::<Vec<_>>();
        let finish_col = chunks.len() * CHUNK_WIDTH - 2;
        Self::new(chunks, finish_col)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.chunks.len() * CHUNK_WIDTH
    }

    #[must_use]
    pub fn height(&self) -> usize {
        CHUNK_HEIGHT
    }

    #[must_use]
    pub fn finish_col(&self) -> usize {
        self.finish_col
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Tile at the given cell, or [`TileKind::Void`] outside the world.
    #[must_use]
    pub fn tile(&self, col: i64, row: i64) -> TileKind {
        let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row)) else {
            return TileKind::Void;
        };
        self.tile_at(col, row)
    }

    fn tile_at(&self, col: usize, row: usize) -> TileKind {
        self.chunks
            .get(col / CHUNK_WIDTH)
            .and_then(|chunk| chunk.get(row, col % CHUNK_WIDTH))
            .unwrap_or(TileKind::Void)
    }

    /// Whether the cell blocks movement.
    ///
    /// Everything left of the first column is a wall; other out-of-world
    /// cells are open so that the player can fall out of the level.
    #[must_use]
    pub fn is_solid(&self, col: i64, row: i64) -> bool {
        col < 0 || self.tile(col, row).is_solid()
    }

    /// Topmost solid row in `col`, if any.
    #[must_use]
    pub fn surface_row(&self, col: usize) -> Option<usize> {
        (0..self.height()).find(|&row| self.tile_at(col, row).is_solid())
    }

    /// A `size` window of tiles centred on the given cell.
    #[must_use]
    pub fn view(&self, center_col: i64, center_row: i64, size: ViewSize) -> TileView {
        let left = center_col - i64::from(size.cols / 2);
        let top = center_row - i64::from(size.rows / 2);
        TileView::from_fn(size, |r, c| {
            self.tile(left + i64::from(c), top + i64::from(r))
        })
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height() {
            for col in 0..self.width() {
                write!(f, "{}", self.tile_at(col, row))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::GROUND_ROW;

    #[test]
    fn test_same_seed_same_world() {
        let config = GameConfig {
            seed: 42,
            num_chunks: 5,
        };
        assert_eq!(
            World::generate(&config).unwrap(),
            World::generate(&config).unwrap()
        );
    }

    #[test]
    fn test_longer_world_extends_shorter_one() {
        let short = World::generate(&GameConfig {
            seed: 9,
            num_chunks: 3,
        })
        .unwrap();
        let long = World::generate(&GameConfig {
            seed: 9,
            num_chunks: 6,
        })
        .unwrap();
        // the last chunk differs only by the finish overlay
        assert_eq!(short.chunks()[..2], long.chunks()[..2]);
    }

    #[test]
    fn test_invalid_chunk_counts() {
        let err = World::generate(&GameConfig {
            seed: 1,
            num_chunks: 0,
        })
        .unwrap_err();
        assert!(matches!(err, WorldConfigError::NoChunks));

        let err = World::generate(&GameConfig {
            seed: 1,
            num_chunks: MAX_CHUNKS + 1,
        })
        .unwrap_err();
        assert!(matches!(err, WorldConfigError::TooManyChunks { .. }));
    }

    #[test]
    fn test_finish_column_is_placed() {
        let world = World::generate(&GameConfig {
            seed: 3,
            num_chunks: 2,
        })
        .unwrap();
        let col = i64::try_from(world.finish_col()).unwrap();
        assert_eq!(world.finish_col(), 2 * CHUNK_WIDTH - 2);
        assert_eq!(world.tile(col, 0), TileKind::Finish);
        assert_eq!(world.surface_row(world.finish_col()), Some(GROUND_ROW));
    }

    #[test]
    fn test_finish_out_of_range() {
        let err = World::new(vec![Chunk::flat(GROUND_ROW)], CHUNK_WIDTH).unwrap_err();
        assert!(matches!(err, WorldConfigError::FinishOutOfRange { .. }));
    }

    #[test]
    fn test_out_of_world_is_void() {
        let world = World::new(vec![Chunk::flat(GROUND_ROW)], 10).unwrap();
        assert_eq!(world.tile(-1, 0), TileKind::Void);
        assert_eq!(world.tile(0, -1), TileKind::Void);
        assert_eq!(world.tile(CHUNK_WIDTH as i64, 0), TileKind::Void);
        assert_eq!(world.tile(0, CHUNK_HEIGHT as i64), TileKind::Void);
        assert!(world.is_solid(-1, 0));
        assert!(!world.is_solid(0, CHUNK_HEIGHT as i64));
    }
}
