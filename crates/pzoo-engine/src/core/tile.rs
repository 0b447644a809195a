use std::fmt;

use serde::{Deserialize, Serialize};

/// Terrain type of a single level cell.
///
/// The discriminant is the tile code observed by policies, so the order of the
/// variants is part of the view encoding and must not change.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileKind {
    #[default]
    Empty = 0,
    Grass = 1,
    Dirt = 2,
    Bricks = 3,
    Spikes = 4,
    Finish = 5,
    /// Padding for cells outside the world.
    Void = 6,
}

impl TileKind {
    /// Number of distinct tile codes.
    pub const COUNT: usize = 7;

    pub const ALL: [TileKind; Self::COUNT] = [
        TileKind::Empty,
        TileKind::Grass,
        TileKind::Dirt,
        TileKind::Bricks,
        TileKind::Spikes,
        TileKind::Finish,
        TileKind::Void,
    ];

    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether the player's bounding box is blocked by this tile.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Dirt | TileKind::Bricks)
    }

    /// Whether touching this tile kills the player.
    #[must_use]
    pub const fn is_hazard(self) -> bool {
        matches!(self, TileKind::Spikes)
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            TileKind::Empty => '.',
            TileKind::Grass => '"',
            TileKind::Dirt => '#',
            TileKind::Bricks => '=',
            TileKind::Spikes => '^',
            TileKind::Finish => '|',
            TileKind::Void => ' ',
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
