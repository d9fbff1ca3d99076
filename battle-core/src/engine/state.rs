//! State and turn pipeline shared by every battle variant.

use super::outcome::{settle_wager, BattleOutcome, BattleResult, RewardPlan, SettlementRequest};
use super::targeting::{Candidate, TargetingPolicy};
use super::turn_order::{CombatantRef, TurnOrder};
use super::{BattleId, BattlePhase, Collaborators, VariantKind};
use crate::combatant::Combatant;
use crate::config::{BattleConfig, BattleOptions};
use crate::error::{BattleError, Result};
use crate::log::{BattleLog, LogEntry};
use crate::resolution::{AttackOutcome, Resolver};
use crate::snapshot::{BattleSnapshot, TeamSnapshot};
use crate::status::{
    modified_chance, modified_duration, EffectParams, EffectRequest, StatusEffectRegistry,
};
use crate::team::Team;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

const TRIP_DAMAGE: Decimal = Decimal::TEN;
const CHEAT_DEATH_HP: i64 = 75;
const FLAT_MISS_CHANCE: f64 = 0.1;
const FIREBALL_VARIANCE: u32 = 100;

pub struct BattleCore {
    battle_id: BattleId,
    variant: VariantKind,
    teams: Vec<Team>,
    turn_order: TurnOrder,
    current_turn: u64,
    action_number: u64,
    log: BattleLog,
    phase: BattlePhase,
    start_time: Option<Instant>,
    config: BattleConfig,
    options: BattleOptions,
    collaborators: Collaborators,
    rng: SmallRng,
    outcome: Option<BattleOutcome>,
}

impl BattleCore {
    /// Validates the roster and builds a battle in the `NotStarted` phase.
    ///
    /// Pets are removed up front when the config disallows them.
    pub fn new(
        variant: VariantKind,
        teams: Vec<Team>,
        config: BattleConfig,
        options: BattleOptions,
        collaborators: Collaborators,
    ) -> Result<Self> {
        if teams.len() < 2 {
            return Err(BattleError::NotEnoughTeams {
                required: 2,
                actual: teams.len(),
            });
        }
        let teams: Vec<Team> = if config.allow_pets {
            teams
        } else {
            teams.into_iter().map(Team::without_pets).collect()
        };
        if let Some(idx) = teams.iter().position(Team::is_empty) {
            return Err(BattleError::EmptyTeam(idx));
        }
        Ok(Self {
            battle_id: BattleId::new(),
            variant,
            teams,
            turn_order: TurnOrder::default(),
            current_turn: 0,
            action_number: 0,
            log: BattleLog::new(options.log_capacity),
            phase: BattlePhase::NotStarted,
            start_time: None,
            rng: SmallRng::seed_from_u64(options.seed),
            config,
            options,
            collaborators,
            outcome: None,
        })
    }

    pub fn battle_id(&self) -> BattleId {
        self.battle_id
    }

    pub fn variant(&self) -> VariantKind {
        self.variant
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn options(&self) -> &BattleOptions {
        &self.options
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BattlePhase::Finished
    }

    pub fn current_turn(&self) -> u64 {
        self.current_turn
    }

    pub fn action_number(&self) -> u64 {
        self.action_number
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn turn_order(&self) -> &TurnOrder {
        &self.turn_order
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn winner(&self) -> Option<usize> {
        self.outcome.as_ref().and_then(BattleOutcome::winner)
    }

    pub fn combatant(&self, at: CombatantRef) -> Option<&Combatant> {
        self.teams.get(at.team)?.members.get(at.slot)
    }

    pub fn combatant_mut(&mut self, at: CombatantRef) -> Option<&mut Combatant> {
        self.teams.get_mut(at.team)?.members.get_mut(at.slot)
    }

    pub(crate) fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    fn member(&self, at: CombatantRef) -> &Combatant {
        &self.teams[at.team].members[at.slot]
    }

    fn member_mut(&mut self, at: CombatantRef) -> &mut Combatant {
        &mut self.teams[at.team].members[at.slot]
    }

    fn include_companions(&self) -> bool {
        self.config.companions_count_for_defeat()
    }

    pub fn is_team_defeated(&self, team: usize) -> bool {
        self.teams
            .get(team)
            .map_or(true, |t| t.is_defeated(self.include_companions()))
    }

    pub fn undefeated_teams(&self) -> Vec<usize> {
        (0..self.teams.len()).filter(|&t| !self.is_team_defeated(t)).collect()
    }

    /// Moves to `Started`. Returns false when the battle already left `NotStarted`.
    pub fn start(&mut self, opening: impl Into<String>) -> bool {
        if self.phase != BattlePhase::NotStarted {
            return false;
        }
        self.phase = BattlePhase::Started;
        self.start_time = Some(self.collaborators.clock.now());
        self.turn_order = TurnOrder::shuffled(&self.teams, &mut self.rng);
        tracing::info!(
            battle_id = %self.battle_id,
            variant = %self.variant,
            teams = self.teams.len(),
            combatants = self.turn_order.len(),
            "battle started"
        );
        self.log_action(opening);
        self.render();
        true
    }

    pub fn is_timed_out(&self) -> bool {
        self.start_time.map_or(false, |start| {
            let elapsed = self.collaborators.clock.now().saturating_duration_since(start);
            elapsed > self.options.max_duration
        })
    }

    /// Pure check over phase, timeout and team defeat.
    pub fn is_battle_over(&self) -> bool {
        match self.phase {
            BattlePhase::Finished => true,
            BattlePhase::NotStarted => false,
            BattlePhase::Started => self.is_timed_out() || self.undefeated_teams().len() <= 1,
        }
    }

    /// Every user id on the field, in team order, without duplicates.
    pub fn participants(&self) -> Vec<u64> {
        let mut seen = Vec::new();
        for id in self.teams.iter().flat_map(|t| t.members.iter()).filter_map(|m| m.user_id) {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }

    pub fn team_user_ids(&self, team: usize) -> Vec<u64> {
        self.teams
            .get(team)
            .map(|t| t.members.iter().filter_map(|m| m.user_id).collect())
            .unwrap_or_default()
    }

    /// Appends a line to the display log and mirrors it to the replay sink.
    pub fn log_action(&mut self, message: impl Into<String>) {
        self.action_number += 1;
        let entry = LogEntry {
            action: self.action_number,
            message: message.into(),
        };
        if let Err(err) = self.collaborators.replay.append(self.battle_id, &entry) {
            tracing::warn!(battle_id = %self.battle_id, error = %err, "replay append failed");
        }
        self.log.push(entry);
        if self.collaborators.replay.wants_snapshots() {
            let snapshot = self.snapshot();
            if let Err(err) = self.collaborators.replay.capture(self.battle_id, &snapshot) {
                tracing::warn!(
                    battle_id = %self.battle_id,
                    error = %err,
                    "snapshot capture failed"
                );
            }
        }
    }

    pub fn render(&self) {
        if let Err(err) = self.collaborators.renderer.render(&self.snapshot()) {
            tracing::warn!(battle_id = %self.battle_id, error = %err, "render failed");
        }
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        let include = self.include_companions();
        BattleSnapshot {
            battle_id: self.battle_id.to_string(),
            variant: self.variant.to_string(),
            phase: self.phase,
            current_turn: self.current_turn,
            action_number: self.action_number,
            teams: self.teams.iter().map(|t| TeamSnapshot::capture(t, include)).collect(),
            log: self.log.entries().cloned().collect(),
            winner: self.winner().and_then(|w| self.teams.get(w)).map(|t| t.name.clone()),
            finished: self.is_finished(),
        }
    }

    pub fn serialize_battle_data(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_else(|err| {
            tracing::warn!(
                battle_id = %self.battle_id,
                error = %err,
                "snapshot serialization failed"
            );
            serde_json::Value::Null
        })
    }

    pub fn serialize_battle_log(&self) -> serde_json::Value {
        let entries: Vec<serde_json::Value> = self
            .log
            .entries()
            .map(|e| json!({ "action": e.action, "message": e.message }))
            .collect();
        json!({
            "battle_id": self.battle_id.to_string(),
            "variant": self.variant.as_str(),
            "entries": entries,
        })
    }

    fn next_attacker(&mut self) -> Option<CombatantRef> {
        let include = self.include_companions();
        let teams = &self.teams;
        self.turn_order.next_eligible(&mut self.current_turn, |at| {
            let team = &teams[at.team];
            !team.is_defeated(include) && team.members[at.slot].is_alive()
        })
    }

    fn candidates_for(&self, attacker_team: usize) -> Vec<Candidate> {
        let include = self.include_companions();
        self.teams
            .iter()
            .enumerate()
            .filter(|(t, team)| *t != attacker_team && !team.is_defeated(include))
            .flat_map(|(t, team)| {
                team.living()
                    .map(move |(slot, member)| Candidate::new(CombatantRef::new(t, slot), member))
            })
            .collect()
    }

    /// Runs one attacker action through the full pipeline.
    ///
    /// Returns false when the battle is over, nobody can act, or the actor has no target.
    pub fn take_turn(&mut self, targeting: &dyn TargetingPolicy) -> bool {
        if self.phase != BattlePhase::Started || self.is_battle_over() {
            return false;
        }
        let Some(attacker_ref) = self.next_attacker() else {
            return false;
        };

        if self.config.status_effects {
            let messages = self.member_mut(attacker_ref).process_turn_start_effects();
            self.log_all(messages);
            let attacker = self.member(attacker_ref);
            let name = attacker.name.clone();
            if !attacker.is_alive() {
                self.log_action(format!("{name} succumbed to their afflictions!"));
                self.finish_turn(attacker_ref);
                return true;
            }
            if attacker.is_stunned() {
                self.log_action(format!("{name} is stunned and cannot act!"));
                self.finish_turn(attacker_ref);
                return true;
            }
        }

        let candidates = self.candidates_for(attacker_ref.team);
        let defender_ref = targeting.select(
            &self.teams[attacker_ref.team].members[attacker_ref.slot],
            &candidates,
            &mut self.rng,
        );
        let Some(defender_ref) = defender_ref else {
            return false;
        };

        self.perform_attack(attacker_ref, defender_ref);
        self.finish_turn(attacker_ref);
        true
    }

    fn roll_hit(&mut self, at: CombatantRef) -> bool {
        let attacker = &self.teams[at.team].members[at.slot];
        if attacker.perfect_accuracy {
            return true;
        }
        if attacker.is_player() && self.config.luck_effects {
            let roll = self.rng.gen_range(1..=100u32);
            return Decimal::from(roll) <= attacker.luck;
        }
        !self.rng.gen_bool(FLAT_MISS_CHANCE)
    }

    fn resolve_miss(&mut self, at: CombatantRef) {
        let tripping = self.config.tripping;
        let attacker = self.member_mut(at);
        let name = attacker.name.clone();
        if !tripping {
            self.log_action(format!("{name}'s attack missed!"));
            return;
        }
        attacker.take_damage(TRIP_DAMAGE);
        let fell = !attacker.is_alive();
        self.log_action(format!("{name} tripped and took **{TRIP_DAMAGE}HP** damage!"));
        if fell {
            self.log_action(format!("{name} was defeated by their own clumsiness!"));
        }
    }

    fn perform_attack(&mut self, attacker_ref: CombatantRef, defender_ref: CombatantRef) {
        if !self.roll_hit(attacker_ref) {
            self.resolve_miss(attacker_ref);
            return;
        }

        let config = &self.config;
        let options = &self.options;
        let rng = &mut self.rng;
        let elements = self.collaborators.elements.as_ref();
        let hooks = self.collaborators.pet_skills.as_ref();
        let registry = self.collaborators.effects.as_ref();
        let Some((attacker, defender)) = pair_mut(&mut self.teams, attacker_ref, defender_ref)
        else {
            return;
        };

        let mut messages = Vec::new();
        let fireball = if config.class_buffs {
            attacker
                .fireball_multiplier()
                .filter(|_| roll_chance(rng, config.fireball_chance))
        } else {
            None
        };
        let outcome = match fireball {
            Some(multiplier) => {
                let variance = Decimal::from(rng.gen_range(0..=FIREBALL_VARIANCE));
                let raw = attacker.outgoing_damage() + variance - defender.armor;
                messages.push(format!("{} casts a Fireball!", attacker.name));
                AttackOutcome {
                    final_damage: (raw * multiplier).max(options.minimum_damage),
                    ..AttackOutcome::default()
                }
            }
            None => {
                let variance = if attacker.is_pet() {
                    options.pet_damage_variance
                } else {
                    options.damage_variance
                };
                let base = attacker.outgoing_damage();
                Resolver::new(elements, hooks).resolve(
                    attacker,
                    defender,
                    base,
                    config.element_effects,
                    variance,
                    options.minimum_damage,
                    rng,
                )
            }
        };

        messages.extend(outcome.skill_messages.iter().cloned());
        defender.take_damage(outcome.final_damage);
        messages.push(format!(
            "{} attacks! {} takes **{}HP** damage.",
            attacker.name,
            defender.name,
            outcome.final_damage.round_dp(2)
        ));
        messages.extend(outcome.defender_messages.iter().cloned());

        if !defender.is_alive() {
            if config.cheat_death && try_cheat_death(defender, rng) {
                messages.push(format!(
                    "{} cheats death and survives with **{CHEAT_DEATH_HP}HP**!",
                    defender.name
                ));
            } else {
                messages.push(format!("{} has been defeated!", defender.name));
            }
        }

        if !attacker.is_pet() && attacker.lifesteal_percent > Decimal::ZERO && attacker.is_alive() {
            let before = attacker.hp;
            attacker.heal(outcome.final_damage * attacker.lifesteal_percent / Decimal::ONE_HUNDRED);
            let gained = attacker.hp - before;
            if gained > Decimal::ZERO {
                messages.push(format!(
                    "{} steals **{}HP** of life.",
                    attacker.name,
                    gained.round_dp(2)
                ));
            }
        }

        if config.reflection_damage && outcome.blocked_damage > Decimal::ZERO {
            let reflection = defender.effective_reflection(config.class_buffs);
            if reflection > Decimal::ZERO {
                let reflected = outcome.blocked_damage * reflection;
                attacker.take_damage(reflected);
                messages.push(format!(
                    "{} reflects **{}HP** damage back to {}.",
                    defender.name,
                    reflected.round_dp(2),
                    attacker.name
                ));
                if !attacker.is_alive() {
                    messages.push(format!("{} was slain by reflected damage!", attacker.name));
                }
            }
        }

        if config.status_effects && defender.is_alive() {
            let requests: Vec<EffectRequest> =
                attacker.inflicts.iter().cloned().chain(outcome.effects).collect();
            for request in &requests {
                let luck = attacker.luck;
                if let Some(message) = try_inflict(request, luck, defender, config, registry, rng) {
                    messages.push(message);
                }
            }
        }

        tracing::debug!(
            battle_id = %self.battle_id,
            attacker = %attacker.name,
            defender = %defender.name,
            damage = %outcome.final_damage,
            blocked = %outcome.blocked_damage,
            defender_hp = %defender.hp,
            "attack resolved"
        );
        self.log_all(messages);
    }

    /// End-of-action bookkeeping: turn-end effects, pet ticks, summons, render.
    fn finish_turn(&mut self, attacker_ref: CombatantRef) {
        if self.config.status_effects {
            let attacker = self.member_mut(attacker_ref);
            let mut messages = attacker.process_turn_end_effects();
            messages.extend(attacker.process_status_effects());
            self.log_all(messages);
        }
        self.tick_pets();
        self.process_summons();
        self.render();
    }

    fn tick_pets(&mut self) {
        let hooks = Arc::clone(&self.collaborators.pet_skills);
        let mut messages = Vec::new();
        for pet in self
            .teams
            .iter_mut()
            .flat_map(|t| t.members.iter_mut())
            .filter(|m| m.is_pet() && m.is_alive())
        {
            messages.extend(hooks.on_turn(pet, &mut self.rng));
        }
        self.log_all(messages);
    }

    fn process_summons(&mut self) {
        let mut pending = Vec::new();
        for (team, t) in self.teams.iter_mut().enumerate() {
            for member in t.members.iter_mut() {
                if let Some(directive) = member.pending_summon.take() {
                    pending.push((team, member.name.clone(), directive));
                }
            }
        }
        for (team, summoner, directive) in pending {
            let unit = Combatant::summoned(directive);
            let message = format!("{summoner} summons {}!", unit.name);
            self.teams[team].members.push(unit);
            let slot = self.teams[team].members.len() - 1;
            self.turn_order.append(CombatantRef::new(team, slot), &self.teams);
            self.log_action(message);
        }
    }

    fn log_all(&mut self, messages: Vec<String>) {
        for message in messages {
            self.log_action(message);
        }
    }

    /// Sum of non-companion damage and armor plus a 1..=7 bonus, for single-roll battles.
    pub(crate) fn stat_roll(&mut self, team: usize) -> Decimal {
        let base: Decimal = self.teams[team]
            .members
            .iter()
            .filter(|m| !m.is_pet())
            .map(|m| m.damage + m.armor)
            .sum();
        base + Decimal::from(self.rng.gen_range(1..=7u32))
    }

    fn tie_break(&mut self, contenders: &[usize]) -> usize {
        let include = self.include_companions();
        let ratios: Vec<(usize, Decimal)> = contenders
            .iter()
            .map(|&t| (t, self.teams[t].hp_ratio(include)))
            .collect();
        let best = ratios.iter().map(|(_, r)| *r).max().unwrap_or(Decimal::ZERO);
        let tied: Vec<usize> = ratios.iter().filter(|(_, r)| *r == best).map(|(t, _)| *t).collect();
        tied.choose(&mut self.rng).copied().unwrap_or(contenders[0])
    }

    /// Decides the result from the current field.
    ///
    /// Several teams still standing go to the HP tie-break unless `stalemate_is_draw`.
    pub fn decide(&mut self, stalemate_is_draw: bool) -> BattleResult {
        match self.undefeated_teams().as_slice() {
            [] => BattleResult::Draw,
            [winner] => self.victory(*winner),
            _ if stalemate_is_draw => BattleResult::Draw,
            contenders => {
                let contenders = contenders.to_vec();
                let winner = self.tie_break(&contenders);
                self.victory(winner)
            }
        }
    }

    pub(crate) fn victory(&self, winner: usize) -> BattleResult {
        BattleResult::Victory {
            winner,
            losers: (0..self.teams.len()).filter(|&t| t != winner).collect(),
        }
    }

    /// Moves to `Finished` with `result`. Returns the stored outcome and whether this call
    /// was the one that finished the battle.
    pub fn finish_with(&mut self, result: BattleResult) -> (BattleOutcome, bool) {
        if let Some(outcome) = &self.outcome {
            return (outcome.clone(), false);
        }
        let timed_out = self.is_timed_out();
        let announcement = match &result {
            BattleResult::Victory { winner, .. } => {
                format!("{} wins the battle!", self.teams[*winner].name)
            }
            BattleResult::Draw => "The battle ended in a draw.".to_string(),
        };
        if timed_out {
            self.log_action(format!("Time is up! {announcement}"));
        } else {
            self.log_action(announcement);
        }
        self.phase = BattlePhase::Finished;
        let outcome = BattleOutcome {
            battle_id: self.battle_id,
            result,
            timed_out,
            actions: self.action_number,
        };
        tracing::info!(
            battle_id = %self.battle_id,
            variant = %self.variant,
            winner = ?outcome.winner(),
            timed_out,
            actions = outcome.actions,
            "battle finished"
        );
        self.outcome = Some(outcome.clone());
        self.render();
        (outcome, true)
    }

    pub fn finish(&mut self, stalemate_is_draw: bool) -> (BattleOutcome, bool) {
        if let Some(outcome) = &self.outcome {
            return (outcome.clone(), false);
        }
        let result = self.decide(stalemate_is_draw);
        self.finish_with(result)
    }

    /// Wager payouts for a decided battle; draws pay nothing.
    pub fn wager_plan(&self, entry_fee: Decimal, outcome: &BattleOutcome) -> RewardPlan {
        let Some(winner) = outcome.winner() else {
            return RewardPlan::None;
        };
        let winners = self.team_user_ids(winner);
        let losers: Vec<u64> = outcome
            .losers()
            .iter()
            .flat_map(|&t| self.team_user_ids(t))
            .collect();
        settle_wager(
            self.battle_id,
            entry_fee,
            &winners,
            &losers,
            self.collaborators.ledger.as_ref(),
        )
    }

    pub fn settle(&self, outcome: &BattleOutcome, plan: RewardPlan) {
        let request = SettlementRequest {
            variant: self.variant,
            outcome: outcome.clone(),
            participants: self.participants(),
            plan,
        };
        if let Err(err) = self.collaborators.settlement.settle(&request) {
            tracing::warn!(battle_id = %self.battle_id, error = %err, "reward settlement failed");
        }
    }
}

/// Borrows two distinct combatants mutably.
fn pair_mut(
    teams: &mut [Team],
    a: CombatantRef,
    b: CombatantRef,
) -> Option<(&mut Combatant, &mut Combatant)> {
    if a == b {
        return None;
    }
    if a.team == b.team {
        let members = &mut teams.get_mut(a.team)?.members;
        if a.slot.max(b.slot) >= members.len() {
            return None;
        }
        return if a.slot < b.slot {
            let (left, right) = members.split_at_mut(b.slot);
            Some((&mut left[a.slot], &mut right[0]))
        } else {
            let (left, right) = members.split_at_mut(a.slot);
            Some((&mut right[0], &mut left[b.slot]))
        };
    }
    if a.team.max(b.team) >= teams.len() {
        return None;
    }
    let (team_a, team_b) = if a.team < b.team {
        let (left, right) = teams.split_at_mut(b.team);
        (&mut left[a.team], &mut right[0])
    } else {
        let (left, right) = teams.split_at_mut(a.team);
        (&mut right[0], &mut left[b.team])
    };
    Some((team_a.members.get_mut(a.slot)?, team_b.members.get_mut(b.slot)?))
}

/// True with probability `chance` (0..=1), at four decimal places of resolution.
fn roll_chance(rng: &mut SmallRng, chance: Decimal) -> bool {
    Decimal::new(rng.gen_range(0..10_000i64), 4) < chance
}

/// One-shot revival for a non-companion that just dropped to zero.
fn try_cheat_death(defender: &mut Combatant, rng: &mut SmallRng) -> bool {
    if defender.is_pet()
        || defender.has_cheated_death
        || defender.death_cheat_chance <= Decimal::ZERO
    {
        return false;
    }
    let roll = Decimal::from(rng.gen_range(1..=100u32));
    if roll > defender.death_cheat_chance {
        return false;
    }
    defender.hp = Decimal::from(CHEAT_DEATH_HP);
    defender.has_cheated_death = true;
    true
}

fn try_inflict(
    request: &EffectRequest,
    source_luck: Decimal,
    target: &mut Combatant,
    config: &BattleConfig,
    registry: &dyn StatusEffectRegistry,
    rng: &mut SmallRng,
) -> Option<String> {
    let (chance, duration) = if config.luck_effects {
        (
            modified_chance(request.base_chance, source_luck, target.luck),
            modified_duration(request.base_duration, source_luck),
        )
    } else {
        (request.base_chance, request.base_duration.max(1))
    };
    if !roll_chance(rng, chance) {
        return None;
    }
    let params = EffectParams {
        duration,
        potency: request.potency,
    };
    match registry.create(&request.effect_type, params) {
        Ok(effect) => Some(target.add_status_effect(effect)),
        Err(err) => {
            tracing::debug!(effect = %request.effect_type, error = %err, "skipping status effect");
            None
        }
    }
}
