use super::simple;
use crate::config::{BattleConfig, BattleOptions};
use crate::engine::{
    Battle, BattleCore, BattleOutcome, Collaborators, RewardPlan, UniformRandom, VariantKind,
};
use crate::error::Result;
use crate::team::Team;
use rust_decimal::Decimal;

/// Player (plus optional pet) against player, optionally for money.
pub struct PvpBattle {
    core: BattleCore,
    targeting: UniformRandom,
    entry_fee: Option<Decimal>,
    rolls: Option<Vec<Decimal>>,
}

impl PvpBattle {
    pub fn new(
        challenger: Team,
        opponent: Team,
        config: BattleConfig,
        options: BattleOptions,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let teams = vec![challenger, opponent];
        let core = BattleCore::new(VariantKind::Pvp, teams, config, options, collaborators)?;
        Ok(Self {
            core,
            targeting: UniformRandom,
            entry_fee: None,
            rolls: None,
        })
    }

    /// Both sides staked `fee`; the winner takes whatever the ledger confirms.
    pub fn with_entry_fee(mut self, fee: Decimal) -> Self {
        self.entry_fee = Some(fee).filter(|f| *f > Decimal::ZERO);
        self
    }

    pub fn entry_fee(&self) -> Option<Decimal> {
        self.entry_fee
    }
}

impl Battle for PvpBattle {
    fn core(&self) -> &BattleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BattleCore {
        &mut self.core
    }

    fn start_battle(&mut self) -> bool {
        let teams = self.core.teams();
        let mut opening = format!("{} challenges {} to a duel!", teams[0].name, teams[1].name);
        if let Some(fee) = self.entry_fee {
            opening.push_str(&format!(" **${fee}** is on the line."));
        }
        if !self.core.start(opening) {
            return false;
        }
        if self.core.config().simple {
            self.rolls = Some(simple::roll_all(&mut self.core));
        }
        true
    }

    fn process_turn(&mut self) -> bool {
        if self.rolls.is_some() {
            return false;
        }
        self.core.take_turn(&self.targeting)
    }

    fn end_battle(&mut self) -> BattleOutcome {
        let (outcome, first) = match &self.rolls {
            Some(rolls) if !self.core.is_finished() => {
                let rolls = rolls.clone();
                let result = simple::decide(&mut self.core, &rolls);
                self.core.finish_with(result)
            }
            _ => self.core.finish(false),
        };
        if first {
            let plan = match self.entry_fee {
                Some(fee) => self.core.wager_plan(fee, &outcome),
                None => RewardPlan::None,
            };
            self.core.settle(&outcome, plan);
        }
        outcome
    }

    fn is_battle_over(&self) -> bool {
        self.rolls.is_some() || self.core.is_battle_over()
    }
}
