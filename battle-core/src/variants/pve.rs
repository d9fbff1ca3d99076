use crate::config::{BattleConfig, BattleOptions};
use crate::engine::outcome::macro_penalty;
use crate::engine::{
    Battle, BattleCore, BattleOutcome, Collaborators, RewardPlan, UniformRandom, VariantKind,
};
use crate::error::Result;
use crate::team::Team;
use serde::{Deserialize, Serialize};

/// Reward inputs that live outside the battle itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PveContext {
    pub monster_tier: u8,
    /// Suspicious-activity counter; high values shrink rewards.
    #[serde(default)]
    pub macro_counter: u32,
}

/// Players against monsters. Team 0 is always the players.
pub struct PveBattle {
    core: BattleCore,
    targeting: UniformRandom,
    context: PveContext,
}

impl PveBattle {
    pub fn new(
        players: Team,
        monsters: Team,
        context: PveContext,
        config: BattleConfig,
        options: BattleOptions,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let teams = vec![players, monsters];
        let core = BattleCore::new(VariantKind::Pve, teams, config, options, collaborators)?;
        Ok(Self {
            core,
            targeting: UniformRandom,
            context,
        })
    }

    pub fn context(&self) -> PveContext {
        self.context
    }
}

impl Battle for PveBattle {
    fn core(&self) -> &BattleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BattleCore {
        &mut self.core
    }

    fn start_battle(&mut self) -> bool {
        let teams = self.core.teams();
        let monsters: Vec<&str> = teams[1].members.iter().map(|m| m.name.as_str()).collect();
        let opening = format!("{} encounters {}!", teams[0].name, monsters.join(", "));
        self.core.start(opening)
    }

    fn process_turn(&mut self) -> bool {
        self.core.take_turn(&self.targeting)
    }

    /// A stalemate or timeout is a draw with nothing paid out.
    fn end_battle(&mut self) -> BattleOutcome {
        let (outcome, first) = self.core.finish(true);
        if first {
            let plan = match outcome.winner() {
                Some(0) => RewardPlan::Pve {
                    monster_tier: self.context.monster_tier,
                    reward_multiplier: macro_penalty(self.context.macro_counter),
                },
                _ => RewardPlan::None,
            };
            self.core.settle(&outcome, plan);
        }
        outcome
    }
}
