use crate::error::{BattleError, Result};
use crate::status::effect::{EffectKind, EffectParams, StatusEffect};

static BUILTIN_EFFECTS: phf::Map<&'static str, (EffectKind, &'static str)> = phf::phf_map! {
    "poison" => (EffectKind::Poison, "Poison"),
    "burn" => (EffectKind::Burn, "Burn"),
    "bleed" => (EffectKind::Bleed, "Bleed"),
    "bleeding" => (EffectKind::Bleed, "Bleed"),
    "regeneration" => (EffectKind::Regeneration, "Regeneration"),
    "regen" => (EffectKind::Regeneration, "Regeneration"),
    "stun" => (EffectKind::Stun, "Stun"),
    "weaken" => (EffectKind::Weaken, "Weaken"),
};

/// Builds status effects from a type name.
///
/// Unknown names must come back as [`BattleError::UnknownEffect`] so the engine can skip them.
pub trait StatusEffectRegistry: Send + Sync {
    fn create(&self, effect_type: &str, params: EffectParams) -> Result<StatusEffect>;
}

/// Registry over the built-in effect kinds.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultEffectRegistry;

impl DefaultEffectRegistry {
    pub fn knows(effect_type: &str) -> bool {
        BUILTIN_EFFECTS.contains_key(normalize_key(effect_type).as_str())
    }
}

impl StatusEffectRegistry for DefaultEffectRegistry {
    fn create(&self, effect_type: &str, params: EffectParams) -> Result<StatusEffect> {
        let key = normalize_key(effect_type);
        let (kind, name) = BUILTIN_EFFECTS
            .get(key.as_str())
            .copied()
            .ok_or_else(|| BattleError::UnknownEffect(effect_type.to_string()))?;
        Ok(StatusEffect::new(name, kind, params.duration, params.potency))
    }
}

fn normalize_key(name: &str) -> String {
    name.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}
