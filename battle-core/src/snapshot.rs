//! Plain serializable views of battle state. Decimals become floats only here.

use crate::combatant::{Combatant, CombatantKind};
use crate::engine::BattlePhase;
use crate::log::LogEntry;
use crate::team::Team;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombatantSnapshot {
    pub name: String,
    pub user_id: Option<u64>,
    pub kind: CombatantKind,
    pub hp: f64,
    pub max_hp: f64,
    pub damage: f64,
    pub armor: f64,
    pub luck: f64,
    pub element: String,
    pub alive: bool,
    pub status_effects: String,
    pub has_cheated_death: bool,
}

impl From<&Combatant> for CombatantSnapshot {
    fn from(c: &Combatant) -> Self {
        Self {
            name: c.name.clone(),
            user_id: c.user_id,
            kind: c.kind,
            hp: decimal_to_f64(c.hp),
            max_hp: decimal_to_f64(c.max_hp),
            damage: decimal_to_f64(c.damage),
            armor: decimal_to_f64(c.armor),
            luck: decimal_to_f64(c.luck),
            element: c.element.to_string(),
            alive: c.is_alive(),
            status_effects: c.get_status_effects_display(),
            has_cheated_death: c.has_cheated_death,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamSnapshot {
    pub name: String,
    pub defeated: bool,
    pub hp_percent: f64,
    pub members: Vec<CombatantSnapshot>,
}

impl TeamSnapshot {
    pub fn capture(team: &Team, include_companions: bool) -> Self {
        Self {
            name: team.name.clone(),
            defeated: team.is_defeated(include_companions),
            hp_percent: decimal_to_f64(team.hp_ratio(include_companions) * Decimal::ONE_HUNDRED),
            members: team.members.iter().map(CombatantSnapshot::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleSnapshot {
    pub battle_id: String,
    pub variant: String,
    pub phase: BattlePhase,
    pub current_turn: u64,
    pub action_number: u64,
    pub teams: Vec<TeamSnapshot>,
    /// Bounded tail of the log, oldest first.
    pub log: Vec<LogEntry>,
    pub winner: Option<String>,
    pub finished: bool,
}
