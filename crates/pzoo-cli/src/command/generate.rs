use std::path::PathBuf;

use pzoo_engine::{GameConfig, World};
use serde::Serialize;

use crate::util;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum WorldFormat {
    #[default]
    Ascii,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateArg {
    #[arg(long, default_value_t = 10101)]
    seed: u64,
    #[arg(long, default_value_t = 10)]
    num_chunks: u32,
    #[arg(long, default_value = "ascii")]
    format: WorldFormat,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct WorldDump {
    game: GameConfig,
    width: usize,
    height: usize,
    finish_col: usize,
    rows: Vec<String>,
}

pub(crate) fn run(arg: &GenerateArg) -> anyhow::Result<()> {
    let game = GameConfig {
        seed: arg.seed,
        num_chunks: arg.num_chunks,
    };
    let world = World::generate(&game)?;
    let text = world.to_string();

    match arg.format {
        WorldFormat::Ascii => util::save_text(&text, arg.output.as_deref())?,
        WorldFormat::Json => {
            let dump = WorldDump {
                game,
                width: world.width(),
                height: world.height(),
                finish_col: world.finish_col(),
                rows: text.lines().map(str::to_owned).collect(),
            };
            util::save_json(&dump, arg.output.as_deref())?;
        }
    }
    Ok(())
}
