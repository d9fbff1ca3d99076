use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MAX_STACKS: u32 = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Poison,
    Burn,
    Bleed,
    Regeneration,
    Stun,
    Weaken,
}

impl EffectKind {
    pub const fn is_damage_over_time(self) -> bool {
        matches!(self, EffectKind::Poison | EffectKind::Burn | EffectKind::Bleed)
    }
}

/// An active effect on a combatant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub name: String,
    pub kind: EffectKind,
    /// Remaining turns; the effect is removed once this reaches zero.
    pub duration: u32,
    pub stacks: u32,
    /// Per-stack strength: HP per tick for damage/heal effects, a fraction for Weaken.
    pub potency: Decimal,
}

impl StatusEffect {
    pub fn new(name: impl Into<String>, kind: EffectKind, duration: u32, potency: Decimal) -> Self {
        Self {
            name: name.into(),
            kind,
            duration: duration.max(1),
            stacks: 1,
            potency,
        }
    }

    /// Amount applied per tick across all stacks.
    pub fn magnitude(&self) -> Decimal {
        self.potency * Decimal::from(self.stacks)
    }
}

/// Parameters handed to the effect registry after luck modulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectParams {
    pub duration: u32,
    pub potency: Decimal,
}

/// A request to inflict an effect on the target of an attack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectRequest {
    pub effect_type: String,
    /// Chance in 0..=1 before luck modulation.
    pub base_chance: Decimal,
    pub base_duration: u32,
    #[serde(default)]
    pub potency: Decimal,
}

impl EffectRequest {
    pub fn new(
        effect_type: impl Into<String>,
        base_chance: Decimal,
        base_duration: u32,
        potency: Decimal,
    ) -> Self {
        Self {
            effect_type: effect_type.into(),
            base_chance,
            base_duration,
            potency,
        }
    }
}
