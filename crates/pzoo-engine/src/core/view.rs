use std::fmt;

use serde::{Deserialize, Serialize};

use super::tile::TileKind;

/// Dimensions of the window a policy observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewSize {
    pub rows: u16,
    pub cols: u16,
}

impl Default for ViewSize {
    fn default() -> Self {
        Self { rows: 15, cols: 15 }
    }
}

impl ViewSize {
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Number of cells in the window.
    #[must_use]
    pub fn cells(self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }
}

impl fmt::Display for ViewSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Row-major grid of tiles around the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileView {
    size: ViewSize,
    tiles: Vec<TileKind>,
}

impl TileView {
    pub fn from_fn<F>(size: ViewSize, mut f: F) -> Self
    where
        F: FnMut(u16, u16) -> TileKind,
    {
        let mut tiles = Vec::with_capacity(size.cells());
        for r in 0..size.rows {
            for c in 0..size.cols {
                tiles.push(f(r, c));
            }
        }
        Self { size, tiles }
    }

    #[must_use]
    pub fn size(&self) -> ViewSize {
        self.size
    }

    #[must_use]
    pub fn get(&self, row: u16, col: u16) -> Option<TileKind> {
        if row >= self.size.rows || col >= self.size.cols {
            return None;
        }
        let index = usize::from(row) * usize::from(self.size.cols) + usize::from(col);
        Some(self.tiles[index])
    }

    /// Tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }
}

impl fmt::Display for TileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(usize::from(self.size.cols).max(1)) {
            for tile in row {
                write!(f, "{tile}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
