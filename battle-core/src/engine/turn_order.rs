use crate::team::Team;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::cmp::Reverse;

/// Position of a combatant: team index, then slot within the team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CombatantRef {
    pub team: usize,
    pub slot: usize,
}

impl CombatantRef {
    pub fn new(team: usize, slot: usize) -> Self {
        Self { team, slot }
    }
}

/// Shared acting sequence across all teams.
///
/// Shuffled once at start, then stably sorted by initiative so faster units lead while
/// equal initiative keeps the shuffled order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnOrder {
    order: Vec<CombatantRef>,
}

impl TurnOrder {
    pub fn shuffled(teams: &[Team], rng: &mut SmallRng) -> Self {
        let mut order: Vec<CombatantRef> = teams
            .iter()
            .enumerate()
            .flat_map(|(t, team)| (0..team.len()).map(move |s| CombatantRef::new(t, s)))
            .collect();
        order.shuffle(rng);
        let mut turn_order = Self { order };
        turn_order.prioritize(teams);
        turn_order
    }

    fn prioritize(&mut self, teams: &[Team]) {
        self.order
            .sort_by_key(|r| Reverse(teams[r.team].members[r.slot].initiative));
    }

    /// Adds a combatant mid-battle and re-applies the priority sort.
    pub fn append(&mut self, reference: CombatantRef, teams: &[Team]) {
        self.order.push(reference);
        self.prioritize(teams);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[CombatantRef] {
        &self.order
    }

    /// Walks from `current_turn` until `eligible` accepts a slot, advancing the counter past it.
    ///
    /// Gives up after `2 * len` attempts so a field of corpses cannot spin forever.
    pub fn next_eligible(
        &self,
        current_turn: &mut u64,
        mut eligible: impl FnMut(CombatantRef) -> bool,
    ) -> Option<CombatantRef> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len() as u64;
        for _ in 0..len * 2 {
            let candidate = self.order[(*current_turn % len) as usize];
            *current_turn += 1;
            if eligible(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}
