//! Axis-aligned box physics against the tile grid.
//!
//! All quantities are in tile units and ticks: one tile is 1.0 wide, speeds
//! are tiles per tick. The y axis points down.

use arrayvec::ArrayVec;

use crate::{Action, TileKind, World};

pub const PLAYER_WIDTH: f32 = 0.75;
pub const PLAYER_HEIGHT: f32 = 0.9;

pub const MAX_RUN_SPEED: f32 = 0.15;
/// Fraction of the gap to the target run speed closed each tick.
pub const RUN_INERTIA: f32 = 0.25;
pub const GRAVITY: f32 = 0.025;
pub const JUMP_SPEED: f32 = 0.42;
/// Must stay below one tile per tick so a fall cannot skip a floor.
pub const MAX_FALL_SPEED: f32 = 0.5;

const CONTACT_EPSILON: f32 = 1e-4;

/// Cells overlapped by a box smaller than one tile.
pub type TileCells = ArrayVec<(i64, i64), 4>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    /// Grid cells whose interior intersects the box.
    ///
    /// Edges that merely touch a cell do not count, so a box resting on the
    /// floor does not overlap the floor row.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn overlapping_cells(&self) -> TileCells {
        let col_min = (self.x + CONTACT_EPSILON).floor() as i64;
        let col_max = (self.x + self.width - CONTACT_EPSILON).floor() as i64;
        let row_min = (self.y + CONTACT_EPSILON).floor() as i64;
        let row_max = (self.y + self.height - CONTACT_EPSILON).floor() as i64;
        let mut cells = TileCells::new();
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                if cells.try_push((col, row)).is_err() {
                    return cells;
                }
            }
        }
        cells
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
}

impl Player {
    /// A player standing on the topmost solid tile of `col`, or dropped from
    /// the top of the world if the column has no ground.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn spawn(world: &World, col: usize) -> Self {
        let y = world
            .surface_row(col)
            .map_or(0.0, |row| row as f32 - PLAYER_HEIGHT);
        Self {
            x: col as f32,
            y,
            vx: 0.0,
            vy: 0.0,
            grounded: false,
        }
    }

    #[must_use]
    pub fn bbox(&self) -> Aabb {
        Aabb {
            x: self.x,
            y: self.y,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        }
    }

    /// Tile cell containing the centre of the player.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn center_cell(&self) -> (i64, i64) {
        (
            (self.x + PLAYER_WIDTH / 2.0).floor() as i64,
            (self.y + PLAYER_HEIGHT / 2.0).floor() as i64,
        )
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.vx, self.vy]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Advances the player by one tick under `action`.
    pub fn step(&mut self, action: Action, world: &World) {
        let target = action.direction() * MAX_RUN_SPEED;
        self.vx += (target - self.vx) * RUN_INERTIA;
        if action.jump() && self.grounded {
            self.vy = -JUMP_SPEED;
        }
        self.vy = (self.vy + GRAVITY).min(MAX_FALL_SPEED);

        self.move_x(world);
        self.move_y(world);
    }

    #[expect(clippy::cast_precision_loss)]
    fn move_x(&mut self, world: &World) {
        self.x += self.vx;
        for (col, row) in self.bbox().overlapping_cells() {
            if !world.is_solid(col, row) {
                continue;
            }
            if self.vx > 0.0 {
                self.x = self.x.min(col as f32 - PLAYER_WIDTH);
            } else if self.vx < 0.0 {
                self.x = self.x.max(col as f32 + 1.0);
            }
            self.vx = 0.0;
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn move_y(&mut self, world: &World) {
        self.y += self.vy;
        self.grounded = false;
        let falling = self.vy > 0.0;
        let rising = self.vy < 0.0;
        for (col, row) in self.bbox().overlapping_cells() {
            if !world.is_solid(col, row) {
                continue;
            }
            if falling {
                self.y = self.y.min(row as f32 - PLAYER_HEIGHT);
                self.grounded = true;
            } else if rising {
                self.y = self.y.max(row as f32 + 1.0);
            }
            self.vy = 0.0;
        }
    }

    /// Kinds of all tiles the player currently overlaps.
    pub fn touching<'a>(&self, world: &'a World) -> impl Iterator<Item = TileKind> + 'a {
        self.bbox()
            .overlapping_cells()
            .into_iter()
            .map(move |(col, row)| world.tile(col, row))
    }
}
