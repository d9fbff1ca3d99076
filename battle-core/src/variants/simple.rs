//! Single stat-roll resolution for simple-mode brawls and PvP.

use crate::engine::{BattleCore, BattleResult};
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

/// Rolls every team once and logs the numbers.
pub(crate) fn roll_all(core: &mut BattleCore) -> Vec<Decimal> {
    let rolls: Vec<Decimal> = (0..core.teams().len()).map(|t| core.stat_roll(t)).collect();
    for (team, roll) in rolls.iter().enumerate() {
        let name = core.teams()[team].name.clone();
        core.log_action(format!("{name} rolls **{roll}**."));
    }
    rolls
}

/// Highest roll wins; a tie is a coin flip between the leaders.
pub(crate) fn decide(core: &mut BattleCore, rolls: &[Decimal]) -> BattleResult {
    let Some(best) = rolls.iter().max().copied() else {
        return BattleResult::Draw;
    };
    let leaders: Vec<usize> = rolls
        .iter()
        .enumerate()
        .filter(|(_, roll)| **roll == best)
        .map(|(team, _)| team)
        .collect();
    if leaders.len() > 1 {
        core.log_action("The rolls are tied! A coin flip decides.");
    }
    match leaders.choose(core.rng()).copied() {
        Some(winner) => core.victory(winner),
        None => BattleResult::Draw,
    }
}
