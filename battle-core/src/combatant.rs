use crate::classes::{fireball_multiplier, tank_reflection};
use crate::element::Element;
use crate::status::{EffectKind, EffectRequest, StatusEffect, StatusEffects};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatantKind {
    Player,
    Monster,
    Pet,
    Summon,
}

/// One-hit flags set by pet skills on a defender; cleared after every resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransientModifiers {
    pub ignore_armor: bool,
    pub true_damage: bool,
    pub bypass_defenses: bool,
    /// Portion of the raw damage that skips armor.
    pub partial_true_damage: Option<Decimal>,
}

impl TransientModifiers {
    pub fn ignores_defenses(&self) -> bool {
        self.ignore_armor || self.true_damage || self.bypass_defenses
    }

    pub fn is_clear(&self) -> bool {
        *self == TransientModifiers::default()
    }

    pub fn clear(&mut self) {
        *self = TransientModifiers::default();
    }
}

/// Stat block for a unit summoned mid-battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummonDirective {
    pub name: String,
    pub hp: Decimal,
    pub damage: Decimal,
    pub armor: Decimal,
    #[serde(default)]
    pub element: Element,
    #[serde(default)]
    pub luck: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    pub name: String,
    pub user_id: Option<u64>,
    pub kind: CombatantKind,
    pub hp: Decimal,
    pub max_hp: Decimal,
    pub damage: Decimal,
    pub armor: Decimal,
    /// 0..=100.
    pub luck: Decimal,
    pub element: Element,
    /// Item-based reflection fraction (0..=1).
    pub damage_reflection: Decimal,
    pub lifesteal_percent: Decimal,
    /// 0..=100.
    pub death_cheat_chance: Decimal,
    pub has_cheated_death: bool,
    pub mage_evolution: u8,
    pub tank_evolution: u8,
    pub perfect_accuracy: bool,
    /// Higher initiative acts earlier after the opening shuffle.
    pub initiative: i32,
    pub inflicts: Vec<EffectRequest>,
    pub status_effects: StatusEffects,
    pub transient: TransientModifiers,
    pub pending_summon: Option<SummonDirective>,
}

impl Combatant {
    pub fn new(
        name: impl Into<String>,
        kind: CombatantKind,
        hp: Decimal,
        damage: Decimal,
        armor: Decimal,
    ) -> Self {
        let hp = hp.max(Decimal::ZERO);
        Self {
            name: name.into(),
            user_id: None,
            kind,
            hp,
            max_hp: hp,
            damage,
            armor,
            luck: Decimal::from(50),
            element: Element::Unknown,
            damage_reflection: Decimal::ZERO,
            lifesteal_percent: Decimal::ZERO,
            death_cheat_chance: Decimal::ZERO,
            has_cheated_death: false,
            mage_evolution: 0,
            tank_evolution: 0,
            perfect_accuracy: false,
            initiative: 0,
            inflicts: Vec::new(),
            status_effects: StatusEffects::new(),
            transient: TransientModifiers::default(),
            pending_summon: None,
        }
    }

    pub fn player(
        name: impl Into<String>,
        user_id: u64,
        hp: Decimal,
        damage: Decimal,
        armor: Decimal,
    ) -> Self {
        let mut combatant = Self::new(name, CombatantKind::Player, hp, damage, armor);
        combatant.user_id = Some(user_id);
        combatant
    }

    pub fn monster(name: impl Into<String>, hp: Decimal, damage: Decimal, armor: Decimal) -> Self {
        Self::new(name, CombatantKind::Monster, hp, damage, armor)
    }

    pub fn pet(name: impl Into<String>, hp: Decimal, damage: Decimal, armor: Decimal) -> Self {
        Self::new(name, CombatantKind::Pet, hp, damage, armor)
    }

    pub fn summoned(directive: SummonDirective) -> Self {
        let mut combatant = Self::new(
            directive.name,
            CombatantKind::Summon,
            directive.hp,
            directive.damage,
            directive.armor,
        );
        combatant.element = directive.element;
        combatant.luck = directive.luck;
        combatant
    }

    pub fn with_luck(mut self, luck: Decimal) -> Self {
        self.luck = luck;
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_max_hp(mut self, max_hp: Decimal) -> Self {
        self.max_hp = max_hp.max(Decimal::ZERO);
        self.hp = self.hp.min(self.max_hp);
        self
    }

    pub fn is_pet(&self) -> bool {
        matches!(self.kind, CombatantKind::Pet | CombatantKind::Summon)
    }

    pub fn is_summoned(&self) -> bool {
        self.kind == CombatantKind::Summon
    }

    pub fn is_player(&self) -> bool {
        self.kind == CombatantKind::Player
    }

    pub fn is_monster(&self) -> bool {
        self.kind == CombatantKind::Monster
    }

    pub fn is_alive(&self) -> bool {
        self.hp > Decimal::ZERO
    }

    /// Over-kill is fine; HP clamps at zero.
    pub fn take_damage(&mut self, amount: Decimal) {
        let amount = amount.max(Decimal::ZERO);
        self.hp = (self.hp - amount).max(Decimal::ZERO);
    }

    pub fn heal(&mut self, amount: Decimal) {
        let amount = amount.max(Decimal::ZERO);
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Remaining HP as a fraction of max HP.
    pub fn hp_ratio(&self) -> Decimal {
        if self.max_hp.is_zero() {
            return Decimal::ZERO;
        }
        self.hp / self.max_hp
    }

    pub fn hp_display(&self) -> String {
        format!("{:.2}/{:.2}", self.hp.round_dp(2), self.max_hp.round_dp(2))
    }

    /// Reflection applied to blocked damage: the larger of item and tank-tier reflection.
    pub fn effective_reflection(&self, class_buffs: bool) -> Decimal {
        let tank = if class_buffs {
            tank_reflection(self.tank_evolution)
        } else {
            Decimal::ZERO
        };
        self.damage_reflection.max(tank)
    }

    /// Fireball multiplier when this combatant belongs to the mage line.
    pub fn fireball_multiplier(&self) -> Option<Decimal> {
        if self.is_pet() {
            return None;
        }
        fireball_multiplier(self.mage_evolution)
    }

    /// Base damage after outgoing modifiers from status effects.
    pub fn outgoing_damage(&self) -> Decimal {
        self.damage * self.status_effects.outgoing_damage_multiplier()
    }

    pub fn is_stunned(&self) -> bool {
        self.status_effects.has(EffectKind::Stun)
    }

    /// Adds an effect, returning the log line describing it.
    pub fn add_status_effect(&mut self, effect: StatusEffect) -> String {
        let name = effect.name.clone();
        if self.status_effects.apply(effect) {
            format!("{} is afflicted with {}!", self.name, name)
        } else {
            format!("{}'s {} intensifies!", self.name, name)
        }
    }

    /// Ticks durations and removes expired effects.
    pub fn process_status_effects(&mut self) -> Vec<String> {
        self.status_effects
            .tick()
            .into_iter()
            .map(|name| format!("{}'s {} wore off.", self.name, name))
            .collect()
    }

    /// Applies damage-over-time effects.
    pub fn process_turn_start_effects(&mut self) -> Vec<String> {
        let mut messages = Vec::new();
        for (name, amount) in self.status_effects.turn_start_damage() {
            if !self.is_alive() {
                break;
            }
            self.take_damage(amount);
            messages.push(format!(
                "{} takes **{}HP** damage from {}.",
                self.name,
                amount.round_dp(2),
                name
            ));
        }
        messages
    }

    /// Applies healing effects.
    pub fn process_turn_end_effects(&mut self) -> Vec<String> {
        let mut messages = Vec::new();
        if !self.is_alive() {
            return messages;
        }
        for (name, amount) in self.status_effects.turn_end_healing() {
            let before = self.hp;
            self.heal(amount);
            let healed = self.hp - before;
            if healed > Decimal::ZERO {
                messages.push(format!(
                    "{} regains **{}HP** from {}.",
                    self.name,
                    healed.round_dp(2),
                    name
                ));
            }
        }
        messages
    }

    pub fn get_status_effects_display(&self) -> String {
        self.status_effects.display()
    }
}
