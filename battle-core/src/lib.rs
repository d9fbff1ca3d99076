//! Turn-based battle engine for the RPG bot: combatants, teams, attack resolution,
//! status effects and the battle state machine behind every variant.
//!
//! Variants live in [`variants`]; all of them implement [`engine::Battle`] and can be
//! driven with [`engine::run_to_completion`].

pub mod classes;
pub mod combatant;
pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod log;
pub mod replay;
pub mod resolution;
pub mod sinks;
pub mod snapshot;
pub mod status;
pub mod team;
pub mod variants;

/// Commonly used exports for external consumers.
pub mod prelude {
    pub use crate::combatant::{Combatant, CombatantKind, SummonDirective};
    pub use crate::config::{BattleConfig, BattleOptions};
    pub use crate::element::{Element, ElementTable, StandardElementTable};
    pub use crate::engine::{
        run_to_completion, Battle, BattleCore, BattleId, BattleOutcome, BattlePhase, BattleResult,
        Collaborators, CombatantRef, RewardPlan, SettlementRequest, VariantKind,
    };
    pub use crate::error::{BattleError, SinkError};
    pub use crate::hooks::{HookResult, NoPetSkills, PetSkillHooks};
    pub use crate::replay::ReplayRecorder;
    pub use crate::sinks::{
        BattleRenderer, Clock, EntryFeeLedger, ManualClock, RecordedLedger, RewardSettlement,
    };
    pub use crate::status::{EffectRequest, StatusEffect, StatusEffectRegistry};
    pub use crate::team::Team;
    pub use crate::variants::{
        BrawlBattle, PveBattle, PveContext, PvpBattle, RaidBattle, TeamBattle, VariantContext,
    };
}
