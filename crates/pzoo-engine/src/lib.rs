pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum WorldConfigError {
    #[display("a world needs at least one chunk")]
    NoChunks,
    #[display("too many chunks: {num_chunks} (at most {})", MAX_CHUNKS)]
    TooManyChunks { num_chunks: u32 },
    #[display("finish column {finish_col} is outside a world {width} columns wide")]
    FinishOutOfRange { finish_col: usize, width: usize },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("episode already terminated")]
pub struct EpisodeTerminatedError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum InvalidLimitsError {
    #[display("max_ticks must be positive")]
    ZeroMaxTicks,
    #[display("idle_ticks must be positive when set")]
    ZeroIdleTicks,
}
