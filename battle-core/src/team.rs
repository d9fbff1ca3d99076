use crate::combatant::Combatant;
use rust_decimal::Decimal;

/// An ordered side of a battle. Members are never removed; the dead stay in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Team {
    pub name: String,
    pub members: Vec<Combatant>,
}

impl Team {
    pub fn new(name: impl Into<String>, members: Vec<Combatant>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_alive(&self) -> bool {
        self.members.iter().any(Combatant::is_alive)
    }

    /// Every counted member is down. Companions count only when `include_companions`.
    pub fn is_defeated(&self, include_companions: bool) -> bool {
        !self
            .members
            .iter()
            .filter(|m| include_companions || !m.is_pet())
            .any(Combatant::is_alive)
    }

    pub fn living(&self) -> impl Iterator<Item = (usize, &Combatant)> {
        self.members.iter().enumerate().filter(|(_, m)| m.is_alive())
    }

    /// Remaining HP over max HP of counted members; zero for an empty selection.
    pub fn hp_ratio(&self, include_companions: bool) -> Decimal {
        let (hp, max_hp) = self
            .members
            .iter()
            .filter(|m| include_companions || !m.is_pet())
            .fold((Decimal::ZERO, Decimal::ZERO), |(hp, max_hp), m| {
                (hp + m.hp, max_hp + m.max_hp)
            });
        if max_hp.is_zero() {
            Decimal::ZERO
        } else {
            hp / max_hp
        }
    }

    /// Removes pets when pets are not allowed in the battle.
    pub(crate) fn without_pets(mut self) -> Self {
        self.members.retain(|m| !m.is_pet());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_with_pet() -> Team {
        Team::new(
            "A",
            vec![
                Combatant::player(
                    "Hero",
                    1,
                    Decimal::from(100),
                    Decimal::from(20),
                    Decimal::from(5),
                ),
                Combatant::pet("Wolf", Decimal::from(50), Decimal::from(10), Decimal::ZERO),
            ],
        )
    }

    #[test]
    fn defeat_depends_on_companion_rule() {
        let mut team = team_with_pet();
        team.members[0].take_damage(Decimal::from(100));
        assert!(team.is_defeated(false));
        assert!(!team.is_defeated(true));
        assert!(team.is_alive());
        team.members[1].take_damage(Decimal::from(50));
        assert!(team.is_defeated(true));
        assert!(!team.is_alive());
    }

    #[test]
    fn hp_ratio_aggregates_members() {
        let mut team = team_with_pet();
        team.members[0].take_damage(Decimal::from(50));
        assert_eq!(team.hp_ratio(false), Decimal::new(5, 1));
        assert_eq!(team.hp_ratio(true), Decimal::from(100) / Decimal::from(150));
    }

    #[test]
    fn dead_members_stay_in_place() {
        let mut team = team_with_pet();
        team.members[0].take_damage(Decimal::from(999));
        assert_eq!(team.len(), 2);
        let living: Vec<usize> = team.living().map(|(idx, _)| idx).collect();
        assert_eq!(living, vec![1]);
    }
}
