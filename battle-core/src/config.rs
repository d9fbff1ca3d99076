use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_true() -> bool {
    true
}

fn default_fireball_chance() -> Decimal {
    Decimal::new(30, 2)
}

/// Gameplay toggles, resolved once before a battle is built and never re-read mid-battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    #[serde(default = "default_true")]
    pub allow_pets: bool,
    #[serde(default = "default_true")]
    pub class_buffs: bool,
    #[serde(default = "default_true")]
    pub element_effects: bool,
    #[serde(default = "default_true")]
    pub luck_effects: bool,
    #[serde(default = "default_true")]
    pub reflection_damage: bool,
    /// Probability (0..=1) that a mage-line attacker casts a fireball.
    #[serde(default = "default_fireball_chance")]
    pub fireball_chance: Decimal,
    #[serde(default = "default_true")]
    pub cheat_death: bool,
    #[serde(default = "default_true")]
    pub tripping: bool,
    #[serde(default = "default_true")]
    pub status_effects: bool,
    #[serde(default)]
    pub pets_continue_battle: bool,
    /// Decide PvP/brawl by a single stat roll instead of the turn loop.
    #[serde(default)]
    pub simple: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            allow_pets: true,
            class_buffs: true,
            element_effects: true,
            luck_effects: true,
            reflection_damage: true,
            fireball_chance: default_fireball_chance(),
            cheat_death: true,
            tripping: true,
            status_effects: true,
            pets_continue_battle: false,
            simple: false,
        }
    }
}

impl BattleConfig {
    /// Companions (pets, summons) keep a team alive only under this combination.
    pub fn companions_count_for_defeat(&self) -> bool {
        self.allow_pets && self.pets_continue_battle
    }
}

/// Engine tuning that is not a gameplay toggle.
#[derive(Debug, Clone)]
pub struct BattleOptions {
    pub max_duration: Duration,
    /// Number of recent lines kept in the display log.
    pub log_capacity: usize,
    pub seed: u64,
    /// Hard floor for armor-reduced damage.
    pub minimum_damage: Decimal,
    pub pet_damage_variance: u32,
    pub damage_variance: u32,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_secs(300),
            log_capacity: 5,
            seed: 0,
            minimum_damage: Decimal::TEN,
            pet_damage_variance: 50,
            damage_variance: 100,
        }
    }
}

impl BattleOptions {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}
