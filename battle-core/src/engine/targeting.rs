//! Defender selection policies, one per variant family.

use super::turn_order::CombatantRef;
use crate::combatant::Combatant;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

/// A living enemy the attacker may hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub reference: CombatantRef,
    pub hp: Decimal,
    /// Current over maximum HP.
    pub hp_ratio: Decimal,
    pub is_pet: bool,
}

impl Candidate {
    pub fn new(reference: CombatantRef, combatant: &Combatant) -> Self {
        Self {
            reference,
            hp: combatant.hp,
            hp_ratio: combatant.hp_ratio(),
            is_pet: combatant.is_pet(),
        }
    }
}

pub trait TargetingPolicy: Send + Sync {
    /// Picks a defender, or `None` when `candidates` is empty.
    fn select(
        &self,
        attacker: &Combatant,
        candidates: &[Candidate],
        rng: &mut SmallRng,
    ) -> Option<CombatantRef>;
}

/// 1v1: the one enemy left standing.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoleOpponent;

impl TargetingPolicy for SoleOpponent {
    fn select(
        &self,
        _attacker: &Combatant,
        candidates: &[Candidate],
        _rng: &mut SmallRng,
    ) -> Option<CombatantRef> {
        candidates.first().map(|c| c.reference)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UniformRandom;

impl TargetingPolicy for UniformRandom {
    fn select(
        &self,
        _attacker: &Combatant,
        candidates: &[Candidate],
        rng: &mut SmallRng,
    ) -> Option<CombatantRef> {
        candidates.choose(rng).map(|c| c.reference)
    }
}

/// Splits attacks between non-companion targets and companions when both are present.
#[derive(Clone, Copy, Debug)]
pub struct RaidWeighted {
    pub player_bias: f64,
}

impl Default for RaidWeighted {
    fn default() -> Self {
        Self { player_bias: 0.6 }
    }
}

impl TargetingPolicy for RaidWeighted {
    fn select(
        &self,
        _attacker: &Combatant,
        candidates: &[Candidate],
        rng: &mut SmallRng,
    ) -> Option<CombatantRef> {
        let (pets, players): (Vec<&Candidate>, Vec<&Candidate>) =
            candidates.iter().partition(|c| c.is_pet);
        let pool = if players.is_empty() || pets.is_empty() {
            candidates.iter().collect()
        } else if rng.gen_bool(self.player_bias) {
            players
        } else {
            pets
        };
        pool.choose(rng).map(|c| c.reference)
    }
}

/// Goes for the enemy with the lowest HP percentage most of the time, otherwise anyone.
#[derive(Clone, Copy, Debug)]
pub struct FocusWeakest {
    pub focus_chance: f64,
}

impl Default for FocusWeakest {
    fn default() -> Self {
        Self { focus_chance: 0.75 }
    }
}

impl TargetingPolicy for FocusWeakest {
    fn select(
        &self,
        _attacker: &Combatant,
        candidates: &[Candidate],
        rng: &mut SmallRng,
    ) -> Option<CombatantRef> {
        if candidates.is_empty() {
            return None;
        }
        if rng.gen_bool(self.focus_chance) {
            return candidates
                .iter()
                .min_by_key(|c| c.hp_ratio)
                .map(|c| c.reference);
        }
        candidates.choose(rng).map(|c| c.reference)
    }
}
