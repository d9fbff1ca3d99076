//! Battle state machine shared by every variant.

pub mod outcome;
pub mod state;
pub mod targeting;
pub mod turn_order;

pub use self::outcome::{BattleOutcome, BattleResult, Payout, RewardPlan, SettlementRequest};
pub use self::state::BattleCore;
pub use self::targeting::{
    Candidate, FocusWeakest, RaidWeighted, SoleOpponent, TargetingPolicy, UniformRandom,
};
pub use self::turn_order::{CombatantRef, TurnOrder};

use crate::element::{ElementTable, StandardElementTable};
use crate::hooks::{NoPetSkills, PetSkillHooks};
use crate::sinks::{
    BattleRenderer, Clock, EntryFeeLedger, NullSink, RecordedLedger, ReplaySink, RewardSettlement,
    SystemClock,
};
use crate::status::{DefaultEffectRegistry, StatusEffectRegistry};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Process-unique identifier minted when a battle is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BattleId(Uuid);

impl BattleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BattleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    NotStarted,
    Started,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Brawl,
    Pvp,
    Pve,
    Raid,
    Team,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Brawl => "brawl",
            VariantKind::Pvp => "pvp",
            VariantKind::Pve => "pve",
            VariantKind::Raid => "raid",
            VariantKind::Team => "team",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities injected into a battle at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub elements: Arc<dyn ElementTable>,
    pub pet_skills: Arc<dyn PetSkillHooks>,
    pub effects: Arc<dyn StatusEffectRegistry>,
    pub renderer: Arc<dyn BattleRenderer>,
    pub replay: Arc<dyn ReplaySink>,
    pub settlement: Arc<dyn RewardSettlement>,
    pub ledger: Arc<dyn EntryFeeLedger>,
    pub clock: Arc<dyn Clock>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            elements: Arc::new(StandardElementTable),
            pet_skills: Arc::new(NoPetSkills),
            effects: Arc::new(DefaultEffectRegistry),
            renderer: Arc::new(NullSink),
            replay: Arc::new(NullSink),
            settlement: Arc::new(NullSink),
            ledger: Arc::new(RecordedLedger::default()),
            clock: Arc::new(SystemClock),
        }
    }
}

impl Collaborators {
    pub fn with_elements(mut self, elements: Arc<dyn ElementTable>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_pet_skills(mut self, pet_skills: Arc<dyn PetSkillHooks>) -> Self {
        self.pet_skills = pet_skills;
        self
    }

    pub fn with_effects(mut self, effects: Arc<dyn StatusEffectRegistry>) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn BattleRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_replay(mut self, replay: Arc<dyn ReplaySink>) -> Self {
        self.replay = replay;
        self
    }

    pub fn with_settlement(mut self, settlement: Arc<dyn RewardSettlement>) -> Self {
        self.settlement = settlement;
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn EntryFeeLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Lifecycle every battle variant implements.
///
/// One call to [`Battle::process_turn`] resolves at most one attacker action. Callers must
/// not drive the same battle from two places at once.
pub trait Battle {
    fn core(&self) -> &BattleCore;

    fn core_mut(&mut self) -> &mut BattleCore;

    /// Moves to `Started`, shuffles the turn order and renders. False if already started.
    fn start_battle(&mut self) -> bool;

    /// Resolves one action. False once the battle is over or nobody can act.
    fn process_turn(&mut self) -> bool;

    /// Moves to `Finished`, settles rewards once, and returns the outcome.
    fn end_battle(&mut self) -> BattleOutcome;

    fn is_battle_over(&self) -> bool {
        self.core().is_battle_over()
    }

    fn is_timed_out(&self) -> bool {
        self.core().is_timed_out()
    }

    fn render(&self) {
        self.core().render();
    }

    fn battle_id(&self) -> BattleId {
        self.core().battle_id()
    }

    fn get_participants(&self) -> Vec<u64> {
        self.core().participants()
    }

    fn serialize_battle_data(&self) -> serde_json::Value {
        self.core().serialize_battle_data()
    }

    fn serialize_battle_log(&self) -> serde_json::Value {
        self.core().serialize_battle_log()
    }
}

/// Drives a battle the way a command handler would: start, turn until over, end.
///
/// `max_actions` caps the loop independently of the wall-clock timeout.
pub fn run_to_completion(battle: &mut dyn Battle, max_actions: u64) -> BattleOutcome {
    if battle.core().phase() == BattlePhase::NotStarted {
        battle.start_battle();
    }
    let mut actions = 0;
    while actions < max_actions && !battle.is_battle_over() {
        if !battle.process_turn() {
            break;
        }
        actions += 1;
    }
    battle.end_battle()
}
