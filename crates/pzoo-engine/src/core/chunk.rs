use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64;

use super::{seed::derive_seed, tile::TileKind};

pub const CHUNK_WIDTH: usize = 32;
pub const CHUNK_HEIGHT: usize = 16;

/// Ground surface row at chunk borders and in the spawn chunk.
pub const GROUND_ROW: usize = CHUNK_HEIGHT - CHUNK_HEIGHT / 4;

const MIN_GROUND_ROW: usize = 9;
const MAX_GROUND_ROW: usize = 14;
/// Columns at both chunk edges that always sit at [`GROUND_ROW`].
const EDGE_COLUMNS: usize = 2;
const PLATFORM_CLEARANCE: usize = 4;

/// A fixed-size segment of a level.
///
/// Rows are indexed from the top, columns from the left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    rows: [[TileKind; CHUNK_WIDTH]; CHUNK_HEIGHT],
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Flat,
    Step,
    Pit,
    Spikes,
    Platform,
}

impl Segment {
    const ALL: [Segment; 5] = [
        Segment::Flat,
        Segment::Step,
        Segment::Pit,
        Segment::Spikes,
        Segment::Platform,
    ];
}

impl Chunk {
    pub const WIDTH: usize = CHUNK_WIDTH;
    pub const HEIGHT: usize = CHUNK_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [[TileKind::Empty; CHUNK_WIDTH]; CHUNK_HEIGHT],
    };

    #[must_use]
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> TileKind,
    {
        let mut chunk = Self::EMPTY;
        for (r, row) in chunk.rows.iter_mut().enumerate() {
            for (c, tile) in row.iter_mut().enumerate() {
                *tile = f(r, c);
            }
        }
        chunk
    }

    /// A chunk with flat ground whose surface is at `ground_row`.
    #[must_use]
    pub fn flat(ground_row: usize) -> Self {
        let mut chunk = Self::EMPTY;
        for col in 0..CHUNK_WIDTH {
            chunk.fill_ground(col, ground_row);
        }
        chunk
    }

    /// Generates chunk `index` of the level identified by `seed`.
    ///
    /// The result depends only on `(seed, index)`. Chunk 0 is always a flat,
    /// hazard-free spawn area. Every chunk starts and ends at [`GROUND_ROW`],
    /// so chunks can be concatenated in any order without seams.
    #[must_use]
    pub fn generate(seed: u64, index: u64) -> Self {
        if index == 0 {
            return Self::flat(GROUND_ROW);
        }

        let mut rng = Pcg64::seed_from_u64(derive_seed(seed, index));
        let mut chunk = Self::EMPTY;
        let mut ground = GROUND_ROW;
        let body_end = CHUNK_WIDTH - EDGE_COLUMNS;

        for col in 0..EDGE_COLUMNS {
            chunk.fill_ground(col, GROUND_ROW);
        }

        let mut col = EDGE_COLUMNS;
        while col < body_end {
            let len = rng.random_range(2..=5).min(body_end - col);
            let segment = Segment::ALL[rng.random_range(0..Segment::ALL.len())];
            match segment {
                Segment::Flat => {}
                Segment::Step => {
                    let delta = rng.random_range(1..=2);
                    ground = if rng.random_bool(0.5) {
                        ground.saturating_sub(delta).max(MIN_GROUND_ROW)
                    } else {
                        (ground + delta).min(MAX_GROUND_ROW)
                    };
                }
                Segment::Pit => {
                    // keep one landing column so consecutive pits never merge
                    let width = rng.random_range(1..=3).min(len - 1);
                    for c in col + width..col + len {
                        chunk.fill_ground(c, ground);
                    }
                    col += len;
                    continue;
                }
                Segment::Spikes => {
                    let width = rng.random_range(1..=2).min(len);
                    for c in col..col + width {
                        chunk.rows[ground - 1][c] = TileKind::Spikes;
                    }
                }
                Segment::Platform => {
                    let row = ground - PLATFORM_CLEARANCE;
                    for c in col..col + len {
                        chunk.rows[row][c] = TileKind::Bricks;
                    }
                }
            }
            for c in col..col + len {
                chunk.fill_ground(c, ground);
            }
            col += len;
        }

        for col in body_end..CHUNK_WIDTH {
            chunk.fill_ground(col, GROUND_ROW);
        }
        chunk
    }

    fn fill_ground(&mut self, col: usize, surface_row: usize) {
        self.rows[surface_row][col] = TileKind::Grass;
        for row in &mut self.rows[surface_row + 1..] {
            row[col] = TileKind::Dirt;
        }
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<TileKind> {
        self.rows.get(row)?.get(col).copied()
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, tile: TileKind) {
        self.rows[row][col] = tile;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TileKind; CHUNK_WIDTH]> + '_ {
        self.rows.iter()
    }
}
