//! Attack resolution: element, variance, pet skills and armor for a single hit.

use crate::combatant::{Combatant, TransientModifiers};
use crate::element::ElementTable;
use crate::hooks::PetSkillHooks;
use crate::status::EffectRequest;
use rand::rngs::SmallRng;
use rand::Rng;
use rust_decimal::Decimal;

/// Result of one resolved attack. Consumed immediately by the turn loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttackOutcome {
    pub final_damage: Decimal,
    pub blocked_damage: Decimal,
    /// Element modifier actually applied (after dampening), zero when skipped.
    pub element_modifier: Decimal,
    pub skill_messages: Vec<String>,
    pub defender_messages: Vec<String>,
    /// Effects requested by skills, to be inflicted on the defender.
    pub effects: Vec<EffectRequest>,
}

/// Armor step for one hit.
///
/// Returns `(final_damage, blocked_damage)`.
pub fn apply_armor(
    raw: Decimal,
    armor: Decimal,
    minimum_damage: Decimal,
    transient: &TransientModifiers,
) -> (Decimal, Decimal) {
    let raw = raw.max(Decimal::ZERO);
    let armor = armor.max(Decimal::ZERO);
    if transient.ignores_defenses() {
        return (raw, Decimal::ZERO);
    }
    let true_part = transient
        .partial_true_damage
        .map(|part| part.clamp(Decimal::ZERO, raw))
        .unwrap_or(Decimal::ZERO);
    let armored = raw - true_part;
    let final_damage = (armored - armor).max(minimum_damage) + true_part;
    let blocked = armored.min(armor);
    (final_damage, blocked)
}

/// Attack resolution bound to its collaborators.
pub struct Resolver<'a> {
    pub elements: &'a dyn ElementTable,
    pub hooks: &'a dyn PetSkillHooks,
}

impl<'a> Resolver<'a> {
    pub fn new(elements: &'a dyn ElementTable, hooks: &'a dyn PetSkillHooks) -> Self {
        Self { elements, hooks }
    }

    /// Resolves a hit of `base_damage` from `attacker` on `defender`.
    ///
    /// Transient modifiers on the defender are always cleared before returning.
    pub fn resolve(
        &self,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        base_damage: Decimal,
        apply_element_mod: bool,
        damage_variance: u32,
        minimum_damage: Decimal,
        rng: &mut SmallRng,
    ) -> AttackOutcome {
        let mut outcome = AttackOutcome::default();
        let mut raw = base_damage.max(Decimal::ZERO);

        if apply_element_mod {
            let modifier = self.elements.strength(attacker.element, defender.element);
            let modifier = self.hooks.dampen_element_modifier(defender, modifier);
            raw *= Decimal::ONE + modifier;
            outcome.element_modifier = modifier;
        }

        if damage_variance > 0 {
            raw += Decimal::from(rng.gen_range(0..=damage_variance));
        }

        if attacker.is_pet() {
            let hook = self.hooks.on_attack(attacker, defender, raw, rng);
            raw = hook.damage.max(Decimal::ZERO);
            outcome.skill_messages.extend(hook.messages);
            outcome.effects.extend(hook.effects);
        }

        let (final_damage, blocked) =
            apply_armor(raw, defender.armor, minimum_damage, &defender.transient);
        defender.transient.clear();
        outcome.final_damage = final_damage;
        outcome.blocked_damage = blocked;

        if defender.is_pet() {
            let hook = self.hooks.on_damage_taken(defender, attacker, outcome.final_damage, rng);
            outcome.final_damage = hook.damage.max(Decimal::ZERO);
            outcome.defender_messages.extend(hook.messages);
        }

        outcome
    }
}
