pub mod scenario;
pub mod simulate;

use crate::scenario::ScenarioFile;
use crate::simulate::{replay_json, simulate, write_csv};
use anyhow::Context;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub scenario_path: PathBuf,
    pub runs: usize,
    pub seed: u64,
    pub output_path: PathBuf,
    /// When set, also dump one seeded battle's replay JSON here.
    pub replay_path: Option<PathBuf>,
}

pub fn load_scenario(path: &Path) -> anyhow::Result<ScenarioFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file at {}", path.display()))?;
    let parsed: ScenarioFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    parsed.validate()?;
    Ok(parsed)
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.runs == 0 {
        anyhow::bail!("--runs must be > 0");
    }
    let scenario = load_scenario(&opts.scenario_path)?;
    let summary = simulate(&scenario, opts.runs, opts.seed)?;
    write_csv(&summary, &opts.output_path)?;
    for (idx, name) in summary.team_names.iter().enumerate() {
        println!("{name}: {:.2}% wins", summary.win_rate(idx) * 100.0);
    }
    println!(
        "{} runs, {} draws, {} timeouts; wrote {}",
        summary.runs,
        summary.draws,
        summary.timeouts,
        opts.output_path.display()
    );
    if let Some(path) = &opts.replay_path {
        let replay = replay_json(&scenario, opts.seed)?;
        let text = serde_json::to_string_pretty(&replay).context("Failed to encode replay")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write replay to {}", path.display()))?;
        println!("Replay written to {}", path.display());
    }
    Ok(())
}
