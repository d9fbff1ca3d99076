use crate::config::{BattleConfig, BattleOptions};
use crate::engine::{
    Battle, BattleCore, BattleOutcome, Collaborators, RaidWeighted, RewardPlan, VariantKind,
};
use crate::error::Result;
use crate::team::Team;
use rust_decimal::Decimal;

/// Two parties of players and their pets.
pub struct RaidBattle {
    core: BattleCore,
    targeting: RaidWeighted,
    entry_fee: Option<Decimal>,
}

impl RaidBattle {
    pub fn new(
        attackers: Team,
        defenders: Team,
        config: BattleConfig,
        options: BattleOptions,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let teams = vec![attackers, defenders];
        let core = BattleCore::new(VariantKind::Raid, teams, config, options, collaborators)?;
        Ok(Self {
            core,
            targeting: RaidWeighted::default(),
            entry_fee: None,
        })
    }

    pub fn with_entry_fee(mut self, fee: Decimal) -> Self {
        self.entry_fee = Some(fee).filter(|f| *f > Decimal::ZERO);
        self
    }
}

impl Battle for RaidBattle {
    fn core(&self) -> &BattleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BattleCore {
        &mut self.core
    }

    fn start_battle(&mut self) -> bool {
        let teams = self.core.teams();
        let opening = format!(
            "Raid battle: {} ({}) vs {} ({})!",
            teams[0].name,
            teams[0].len(),
            teams[1].name,
            teams[1].len()
        );
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
