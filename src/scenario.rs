use battle_core::combatant::{Combatant, CombatantKind};
use battle_core::config::BattleConfig;
use battle_core::element::Element;
use battle_core::engine::VariantKind;
use battle_core::status::EffectRequest;
use battle_core::team::Team;
use battle_core::variants::VariantContext;
use rust_decimal::Decimal;
use serde::Deserialize;

fn default_luck() -> Decimal {
    Decimal::from(50)
}

fn default_max_actions() -> u64 {
    500
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    #[default]
    Player,
    Monster,
    Pet,
}

/// Stat block of one combatant as written in a scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct CombatantSpec {
    pub name: String,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub kind: UnitKind,
    pub hp: Decimal,
    pub damage: Decimal,
    #[serde(default)]
    pub armor: Decimal,
    #[serde(default = "default_luck")]
    pub luck: Decimal,
    #[serde(default)]
    pub element: Element,
    #[serde(default)]
    pub damage_reflection: Decimal,
    #[serde(default)]
    pub lifesteal_percent: Decimal,
    #[serde(default)]
    pub death_cheat_chance: Decimal,
    #[serde(default)]
    pub mage_evolution: u8,
    #[serde(default)]
    pub tank_evolution: u8,
    #[serde(default)]
    pub perfect_accuracy: bool,
    #[serde(default)]
    pub initiative: i32,
    #[serde(default)]
    pub inflicts: Vec<EffectRequest>,
}

impl CombatantSpec {
    pub fn build(&self) -> Combatant {
        let kind = match self.kind {
            UnitKind::Player => CombatantKind::Player,
            UnitKind::Monster => CombatantKind::Monster,
            UnitKind::Pet => CombatantKind::Pet,
        };
        let mut combatant =
            Combatant::new(self.name.clone(), kind, self.hp, self.damage, self.armor)
                .with_luck(self.luck)
                .with_element(self.element);
        combatant.user_id = self.user_id;
        combatant.damage_reflection = self.damage_reflection;
        combatant.lifesteal_percent = self.lifesteal_percent;
        combatant.death_cheat_chance = self.death_cheat_chance;
        combatant.mage_evolution = self.mage_evolution;
        combatant.tank_evolution = self.tank_evolution;
        combatant.perfect_accuracy = self.perfect_accuracy;
        combatant.initiative = self.initiative;
        combatant.inflicts = self.inflicts.clone();
        combatant
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    pub members: Vec<CombatantSpec>,
}

/// A battle setup loaded from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    pub variant: VariantKind,
    pub teams: Vec<TeamSpec>,
    #[serde(default)]
    pub config: BattleConfig,
    #[serde(default)]
    pub context: VariantContext,
    /// Users the entry-fee ledger treats as paid.
    #[serde(default)]
    pub paid_entry: Vec<u64>,
    #[serde(default = "default_max_actions")]
    pub max_actions: u64,
}

impl ScenarioFile {
    pub fn build_teams(&self) -> Vec<Team> {
        self.teams
            .iter()
            .map(|t| {
                let members = t.members.iter().map(CombatantSpec::build).collect();
                Team::new(t.name.clone(), members)
            })
            .collect()
    }

    pub fn team_names(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.name.clone()).collect()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.teams.len() < 2 {
            anyhow::bail!("Expected at least 2 teams, found {}", self.teams.len());
        }
        if let Some(team) = self.teams.iter().find(|t| t.members.is_empty()) {
            anyhow::bail!("Team {} has no members", team.name);
        }
        if self.max_actions == 0 {
            anyhow::bail!("max_actions must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_scenario() {
        let raw = r#"{
            "variant": "pve",
            "teams": [
                {"name": "Heroes", "members": [
                    {"name": "Aria", "user_id": 7, "hp": 250, "damage": 40, "armor": 10,
                     "element": "Fire"}
                ]},
                {"name": "Wilds", "members": [
                    {"name": "Dire Wolf", "kind": "monster", "hp": "180.5", "damage": 30}
                ]}
            ],
            "context": {"pve": {"monster_tier": 2}}
        }"#;
        let scenario: ScenarioFile = serde_json::from_str(raw).expect("valid scenario");
        scenario.validate().expect("passes validation");
        let teams = scenario.build_teams();
        assert_eq!(teams[0].members[0].element, Element::Fire);
        assert_eq!(teams[0].members[0].user_id, Some(7));
        assert_eq!(teams[1].members[0].hp, Decimal::new(1805, 1));
        assert!(teams[1].members[0].is_monster());
        assert_eq!(scenario.context.pve.monster_tier, 2);
        assert_eq!(scenario.max_actions, 500);
        assert!(scenario.config.allow_pets);
    }

    #[test]
    fn rejects_empty_teams() {
        let raw = r#"{
            "variant": "team",
            "teams": [{"name": "A", "members": []}, {"name": "B", "members": []}]
        }"#;
        let scenario: ScenarioFile = serde_json::from_str(raw).expect("valid json");
        assert!(scenario.validate().is_err());
    }
}
