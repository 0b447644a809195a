use std::path::PathBuf;

use pzoo_engine::GameSimulation;
use pzoo_policy::{BreedablePolicy as _, FeedForwardDnn, play_episode};
use pzoo_training::AgentSnapshot;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the agent snapshot (JSON format)
    snapshot_file: PathBuf,
    /// Write the episode result as JSON to this file ("-" for stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        snapshot_file,
        output,
    } = arg;

    eprintln!("Loading agent from {}", snapshot_file.display());
    let snapshot = AgentSnapshot::<FeedForwardDnn>::load(snapshot_file)?;
    eprintln!(
        "  Generation {}, recorded fitness {:.2} ({})",
        snapshot.generation, snapshot.fitness, snapshot.death_type
    );
    eprintln!(
        "  World: seed {}, {} chunks",
        snapshot.game.seed, snapshot.game.num_chunks
    );

    let mut simulation = GameSimulation::reset(
        &snapshot.game,
        snapshot.limits,
        snapshot.policy.view_size(),
    )?;
    let result = play_episode(&snapshot.policy, &mut simulation)?;

    eprintln!();
    eprintln!("Replay finished");
    eprintln!("  Fitness:    {:.2}", result.fitness);
    eprintln!("  Death type: {}", result.death_type);
    eprintln!("  Ticks:      {}", result.ticks);
    if result.fitness.to_bits() != snapshot.fitness.to_bits()
        || result.death_type != snapshot.death_type
    {
        log::warn!(
            "replay differs from the recorded episode ({:.2} {} vs {:.2} {})",
            result.fitness,
            result.death_type,
            snapshot.fitness,
            snapshot.death_type
        );
    }

    if let Some(path) = output {
        let path = (path.as_os_str() != "-").then_some(path.as_path());
        util::save_json(&result, path)?;
    }
    Ok(())
}
