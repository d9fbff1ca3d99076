//! Error types raised by the battle engine and its collaborators.

use thiserror::Error;

/// Errors surfaced while assembling or running a battle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("a battle needs at least {required} teams, got {actual}")]
    NotEnoughTeams { required: usize, actual: usize },

    #[error("{variant} battles take exactly {allowed} teams, got {actual}")]
    TooManyTeams {
        variant: &'static str,
        allowed: usize,
        actual: usize,
    },

    #[error("team {0} has no combatants")]
    EmptyTeam(usize),

    #[error("brawl requires exactly one combatant per side, team {team} has {size}")]
    NotOneVersusOne { team: usize, size: usize },

    #[error("unknown status effect type '{0}'")]
    UnknownEffect(String),
}

/// Failure reported by a side-channel collaborator (render, replay, settlement, ledger).
///
/// The engine never propagates these; they are logged and dropped at the call site.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("render sink failed: {0}")]
    Render(String),

    #[error("replay sink failed: {0}")]
    Replay(String),

    #[error("reward settlement failed: {0}")]
    Settlement(String),

    #[error("transaction ledger unavailable: {0}")]
    Ledger(String),
}

pub type Result<T> = std::result::Result<T, BattleError>;
