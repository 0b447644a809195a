use std::path::PathBuf;

use anyhow::Context;
use pzoo_engine::{Action, EpisodeLimits, GameConfig, GameSimulation, ViewSize};
use pzoo_policy::run_episode;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// File with one action per line, e.g. `R`, `RJ` or `-` (stdin if omitted)
    #[arg(long)]
    script: Option<PathBuf>,
    #[arg(long, default_value_t = 10101)]
    seed: u64,
    #[arg(long, default_value_t = 10)]
    num_chunks: u32,
    #[arg(long, default_value_t = 3600)]
    max_ticks: u32,
    /// Ticks without progress before the episode times out (0 = never)
    #[arg(long, default_value_t = 0)]
    idle_ticks: u32,
    /// Print the view around the player when the episode ends
    #[arg(long)]
    show_view: bool,
}

/// Parses script lines. Blank lines press nothing; `#` starts a comment line.
fn parse_script(lines: &[String]) -> anyhow::Result<Vec<Action>> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with('#'))
        .map(|(i, line)| {
            line.parse::<Action>()
                .with_context(|| format!("Invalid action on line {}", i + 1))
        })
        .collect()
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let lines = util::read_lines(arg.script.as_deref())?;
    let actions = parse_script(&lines)?;
    eprintln!("Loaded {} actions", actions.len());

    let game = GameConfig {
        seed: arg.seed,
        num_chunks: arg.num_chunks,
    };
    let limits = EpisodeLimits {
        max_ticks: arg.max_ticks,
        idle_ticks: (arg.idle_ticks > 0).then_some(arg.idle_ticks),
    };
    limits.validate()?;
    let mut simulation = GameSimulation::reset(&game, limits, ViewSize::default())?;

    // the player stands still once the script runs out
    let mut script = actions.into_iter();
    let result = run_episode(&mut simulation, |_| script.next().unwrap_or(Action::NONE))?;

    eprintln!("Episode finished");
    eprintln!("  Fitness:    {:.2}", result.fitness);
    eprintln!("  Death type: {}", result.death_type);
    eprintln!("  Ticks:      {}", result.ticks);
    if arg.show_view {
        eprintln!();
        eprint!("{}", simulation.view());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let lines = ["R", "", "# jump over the gap", "rj", "-"]
            .map(str::to_owned)
            .to_vec();
        let actions = parse_script(&lines).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::new(false, true, false),
                Action::NONE,
                Action::new(false, true, true),
                Action::NONE,
            ]
        );
    }

    #[test]
    fn test_parse_script_reports_line() {
        let lines = ["R".to_owned(), "Q".to_owned()];
        let err = parse_script(&lines).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
