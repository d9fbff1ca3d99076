use crate::scenario::ScenarioFile;
use battle_core::config::BattleOptions;
use battle_core::engine::{run_to_completion, Battle, BattleOutcome, Collaborators};
use battle_core::replay::ReplayRecorder;
use battle_core::sinks::RecordedLedger;
use battle_core::variants;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Aggregate of many seeded runs of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub runs: usize,
    pub team_names: Vec<String>,
    pub wins: Vec<u64>,
    pub draws: u64,
    pub timeouts: u64,
    pub mean_actions: f64,
}

impl SimulationSummary {
    pub fn win_rate(&self, team: usize) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.wins.get(team).copied().unwrap_or(0) as f64 / self.runs as f64
    }
}

fn collaborators_for(scenario: &ScenarioFile) -> Collaborators {
    let ledger = RecordedLedger::new(scenario.paid_entry.iter().copied());
    Collaborators::default().with_ledger(Arc::new(ledger))
}

fn build_battle(
    scenario: &ScenarioFile,
    seed: u64,
    collaborators: Collaborators,
) -> anyhow::Result<Box<dyn Battle + Send>> {
    let battle = variants::build(
        scenario.variant,
        scenario.build_teams(),
        &scenario.context,
        scenario.config.clone(),
        BattleOptions::with_seed(seed),
        collaborators,
    )?;
    Ok(battle)
}

/// Runs one battle of `scenario` to completion.
pub fn run_once(scenario: &ScenarioFile, seed: u64) -> anyhow::Result<BattleOutcome> {
    let mut battle = build_battle(scenario, seed, collaborators_for(scenario))?;
    Ok(run_to_completion(battle.as_mut(), scenario.max_actions))
}

/// Runs `runs` independent battles in parallel. Battle seeds derive from `seed`.
pub fn simulate(
    scenario: &ScenarioFile,
    runs: usize,
    seed: u64,
) -> anyhow::Result<SimulationSummary> {
    scenario.validate()?;
    let outcomes: Vec<BattleOutcome> = (0..runs)
        .into_par_iter()
        .map(|run| {
            let mut run_rng = SmallRng::seed_from_u64(seed ^ ((run as u64) << 16));
            run_once(scenario, run_rng.gen())
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let team_names = scenario.team_names();
    let mut wins = vec![0u64; team_names.len()];
    let mut draws = 0;
    let mut timeouts = 0;
    let mut total_actions = 0u64;
    for outcome in &outcomes {
        match outcome.winner() {
            Some(team) => wins[team] += 1,
            None => draws += 1,
        }
        if outcome.timed_out {
            timeouts += 1;
        }
        total_actions += outcome.actions;
    }
    let mean_actions = if runs == 0 {
        0.0
    } else {
        total_actions as f64 / runs as f64
    };
    tracing::info!(runs, draws, timeouts, mean_actions, "simulation finished");
    Ok(SimulationSummary {
        runs,
        team_names,
        wins,
        draws,
        timeouts,
        mean_actions,
    })
}

/// Quotes a CSV field when it holds a delimiter, a quote or a line break.
fn csv_field(raw: &str) -> String {
    if raw.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

pub fn write_csv(summary: &SimulationSummary, path: &std::path::Path) -> anyhow::Result<()> {
    let mut out = String::from("team,wins,win_rate\n");
    for (idx, name) in summary.team_names.iter().enumerate() {
        out.push_str(&format!(
            "{},{},{:.4}\n",
            csv_field(name),
            summary.wins[idx],
            summary.win_rate(idx)
        ));
    }
    let draw_rate = summary.draws as f64 / summary.runs.max(1) as f64;
    out.push_str(&format!("draws,{},{:.4}\n", summary.draws, draw_rate));
    out.push_str(&format!("mean_actions,{:.2}\n", summary.mean_actions));
    std::fs::write(path, out)?;
    Ok(())
}

/// One seeded battle with full snapshot capture, as JSON.
pub fn replay_json(scenario: &ScenarioFile, seed: u64) -> anyhow::Result<serde_json::Value> {
    scenario.validate()?;
    let recorder = Arc::new(ReplayRecorder::with_snapshots());
    let collaborators = collaborators_for(scenario).with_replay(recorder.clone());
    let mut battle = build_battle(scenario, seed, collaborators)?;
    let outcome = run_to_completion(battle.as_mut(), scenario.max_actions);
    Ok(json!({
        "outcome": outcome,
        "participants": battle.get_participants(),
        "battle": battle.serialize_battle_data(),
        "replay": recorder.to_json(battle.battle_id()),
    }))
}
