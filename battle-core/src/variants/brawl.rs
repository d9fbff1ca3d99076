use super::simple;
use crate::combatant::Combatant;
use crate::config::{BattleConfig, BattleOptions};
use crate::engine::{
    Battle, BattleCore, BattleOutcome, Collaborators, RewardPlan, SoleOpponent, VariantKind,
};
use crate::error::{BattleError, Result};
use crate::team::Team;
use rust_decimal::Decimal;

/// One combatant against one combatant, no stakes.
pub struct BrawlBattle {
    core: BattleCore,
    targeting: SoleOpponent,
    rolls: Option<Vec<Decimal>>,
}

impl BrawlBattle {
    pub fn new(
        teams: Vec<Team>,
        config: BattleConfig,
        options: BattleOptions,
        collaborators: Collaborators,
    ) -> Result<Self> {
        if teams.len() > 2 {
            return Err(BattleError::TooManyTeams {
                variant: VariantKind::Brawl.as_str(),
                allowed: 2,
                actual: teams.len(),
            });
        }
        let uneven = teams
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.len()))
            .find(|(_, len)| *len != 1);
        if let Some((team, size)) = uneven {
            if size == 0 {
                return Err(BattleError::EmptyTeam(team));
            }
            return Err(BattleError::NotOneVersusOne { team, size });
        }
        let core = BattleCore::new(VariantKind::Brawl, teams, config, options, collaborators)?;
        Ok(Self {
            core,
            targeting: SoleOpponent,
            rolls: None,
        })
    }

    pub fn between(
        first: Combatant,
        second: Combatant,
        config: BattleConfig,
        options: BattleOptions,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let teams = vec![
            Team::new(first.name.clone(), vec![first]),
            Team::new(second.name.clone(), vec![second]),
        ];
        Self::new(teams, config, options, collaborators)
    }
}

impl Battle for BrawlBattle {
    fn core(&self) -> &BattleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BattleCore {
        &mut self.core
    }

    fn start_battle(&mut self) -> bool {
        let teams = self.core.teams();
        let opening = format!("Brawl! {} squares up against {}.", teams[0].name, teams[1].name);
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
            self.core.settle(&outcome, RewardPlan::None);
        }
        outcome
    }

    fn is_battle_over(&self) -> bool {
        self.rolls.is_some() || self.core.is_battle_over()
    }
}
