//! Level data: tiles, chunks, worlds and the encodings shared with policies.
//!
//! - [`TileKind`] - Tile codes (the values a policy observes)
//! - [`Chunk`] - Fixed-size, seed-derived level segment
//! - [`World`] - Concatenated chunks plus the finish column
//! - [`TileView`] - Fixed-size window of tiles around the player
//! - [`Action`] - One boolean per control channel

pub use self::{action::*, chunk::*, seed::*, tile::*, view::*, world::*};

pub(crate) mod action;
pub(crate) mod chunk;
pub(crate) mod seed;
pub(crate) mod tile;
pub(crate) mod view;
pub(crate) mod world;
