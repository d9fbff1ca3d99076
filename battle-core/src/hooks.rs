//! Pet-skill capability consumed by attack resolution and the turn loop.

use crate::combatant::Combatant;
use crate::status::EffectRequest;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;

/// Damage after a skill hook ran, plus what it wants said or inflicted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HookResult {
    pub damage: Decimal,
    pub messages: Vec<String>,
    /// Effects to inflict on the other party of the hit.
    pub effects: Vec<EffectRequest>,
}

impl HookResult {
    pub fn unchanged(damage: Decimal) -> Self {
        Self {
            damage,
            ..Self::default()
        }
    }
}

/// Skill behaviour for pets and summons.
///
/// Hooks may mutate both parties: set [`crate::combatant::TransientModifiers`] on the
/// target, attach a summon directive to the attacker, heal, and so on.
pub trait PetSkillHooks: Send + Sync {
    /// Runs when a pet attacks, before armor.
    fn on_attack(
        &self,
        _attacker: &mut Combatant,
        _target: &mut Combatant,
        damage: Decimal,
        _rng: &mut SmallRng,
    ) -> HookResult {
        HookResult::unchanged(damage)
    }

    /// Runs when a pet is hit, after armor.
    fn on_damage_taken(
        &self,
        _target: &mut Combatant,
        _attacker: &mut Combatant,
        damage: Decimal,
        _rng: &mut SmallRng,
    ) -> HookResult {
        HookResult::unchanged(damage)
    }

    /// Per-turn tick for every living pet.
    fn on_turn(&self, _pet: &mut Combatant, _rng: &mut SmallRng) -> Vec<String> {
        Vec::new()
    }

    /// Void affinity: lets the defender dampen an element modifier.
    fn dampen_element_modifier(&self, _defender: &Combatant, modifier: Decimal) -> Decimal {
        modifier
    }
}

/// Pets without skills.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPetSkills;

impl PetSkillHooks for NoPetSkills {}
