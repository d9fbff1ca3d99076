//! Status effects carried by combatants.

pub mod chance;
pub mod effect;
pub mod registry;

pub use chance::{modified_chance, modified_duration};
pub use effect::{EffectKind, EffectParams, EffectRequest, StatusEffect, MAX_STACKS};
pub use registry::{DefaultEffectRegistry, StatusEffectRegistry};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ordered collection of active effects; at most one entry per effect name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an effect, or stacks onto an existing one with the same name.
    ///
    /// Returns `true` when the effect was not present before.
    pub fn apply(&mut self, effect: StatusEffect) -> bool {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.name == effect.name) {
            existing.stacks = (existing.stacks + 1).min(MAX_STACKS);
            existing.duration = existing.duration.max(effect.duration);
            existing.potency = existing.potency.max(effect.potency);
            return false;
        }
        self.effects.push(effect);
        true
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Damage dealt by each damage-over-time effect at the start of the bearer's turn.
    pub fn turn_start_damage(&self) -> Vec<(String, Decimal)> {
        self.effects
            .iter()
            .filter(|e| e.kind.is_damage_over_time())
            .map(|e| (e.name.clone(), e.magnitude()))
            .collect()
    }

    /// Healing from regeneration effects at the end of the bearer's turn.
    pub fn turn_end_healing(&self) -> Vec<(String, Decimal)> {
        self.effects
            .iter()
            .filter(|e| e.kind == EffectKind::Regeneration)
            .map(|e| (e.name.clone(), e.magnitude()))
            .collect()
    }

    /// Multiplier on outgoing base damage from Weaken, never below 0.1.
    pub fn outgoing_damage_multiplier(&self) -> Decimal {
        let reduction: Decimal = self
            .effects
            .iter()
            .filter(|e| e.kind == EffectKind::Weaken)
            .map(StatusEffect::magnitude)
            .sum();
        Decimal::ONE - reduction.clamp(Decimal::ZERO, Decimal::new(9, 1))
    }

    /// Decrements every duration and drops the expired ones, returning their names.
    pub fn tick(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            effect.duration = effect.duration.saturating_sub(1);
            if effect.duration == 0 {
                expired.push(effect.name.clone());
            }
        }
        self.effects.retain(|e| e.duration > 0);
        expired
    }

    /// Compact `Name(turns)` listing, with `xN` for stacked effects.
    pub fn display(&self) -> String {
        self.effects
            .iter()
            .map(|e| {
                if e.stacks > 1 {
                    format!("{}({}) x{}", e.name, e.duration, e.stacks)
                } else {
                    format!("{}({})", e.name, e.duration)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
