use crate::config::{BattleConfig, BattleOptions};
use crate::engine::{
    Battle, BattleCore, BattleOutcome, Collaborators, FocusWeakest, RewardPlan, VariantKind,
};
use crate::error::Result;
use crate::team::Team;
use rust_decimal::Decimal;

/// Free-for-all between two or more teams; attackers focus the weakest enemy.
pub struct TeamBattle {
    core: BattleCore,
    targeting: FocusWeakest,
    entry_fee: Option<Decimal>,
}

impl TeamBattle {
    pub fn new(
        teams: Vec<Team>,
        config: BattleConfig,
        options: BattleOptions,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let core = BattleCore::new(VariantKind::Team, teams, config, options, collaborators)?;
        Ok(Self {
            core,
            targeting: FocusWeakest::default(),
            entry_fee: None,
        })
    }

    pub fn with_entry_fee(mut self, fee: Decimal) -> Self {
        self.entry_fee = Some(fee).filter(|f| *f > Decimal::ZERO);
        self
    }
}

impl Battle for TeamBattle {
    fn core(&self) -> &BattleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BattleCore {
        &mut self.core
    }

    fn start_battle(&mut self) -> bool {
        let names: Vec<&str> = self.core.teams().iter().map(|t| t.name.as_str()).collect();
        let opening = format!("Team battle: {}!", names.join(" vs "));
        self.core.start(opening)
    }

    fn process_turn(&mut self) -> bool {
        self.core.take_turn(&self.targeting)
    }

    fn end_battle(&mut self) -> BattleOutcome {
        let (outcome, first) = self.core.finish(false);
        if first {
            let plan = match self.entry_fee {
                Some(fee) => self.core.wager_plan(fee, &outcome),
                None => RewardPlan::None,
            };
            self.core.settle(&outcome, plan);
        }
        outcome
    }
}
