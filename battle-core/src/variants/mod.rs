//! Concrete battle variants over the shared engine.

pub mod brawl;
pub mod pve;
pub mod pvp;
pub mod raid;
mod simple;
pub mod team;

pub use brawl::BrawlBattle;
pub use pve::{PveBattle, PveContext};
pub use pvp::PvpBattle;
pub use raid::RaidBattle;
pub use team::TeamBattle;

use crate::config::{BattleConfig, BattleOptions};
use crate::engine::{Battle, Collaborators, VariantKind};
use crate::error::{BattleError, Result};
use crate::team::Team;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-variant inputs that are not part of the roster or config.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantContext {
    #[serde(default)]
    pub pve: PveContext,
    #[serde(default)]
    pub entry_fee: Option<Decimal>,
}

fn into_pair(kind: VariantKind, teams: Vec<Team>) -> Result<(Team, Team)> {
    let actual = teams.len();
    let mut teams = teams.into_iter();
    match (teams.next(), teams.next(), teams.next()) {
        (Some(first), Some(second), None) => Ok((first, second)),
        (_, _, Some(_)) => Err(BattleError::TooManyTeams {
            variant: kind.as_str(),
            allowed: 2,
            actual,
        }),
        _ => Err(BattleError::NotEnoughTeams { required: 2, actual }),
    }
}

/// Builds any variant behind the [`Battle`] interface.
pub fn build(
    kind: VariantKind,
    teams: Vec<Team>,
    context: &VariantContext,
    config: BattleConfig,
    options: BattleOptions,
    collaborators: Collaborators,
) -> Result<Box<dyn Battle + Send>> {
    let fee = context.entry_fee.unwrap_or(Decimal::ZERO);
    let battle: Box<dyn Battle + Send> = match kind {
        VariantKind::Brawl => Box::new(BrawlBattle::new(teams, config, options, collaborators)?),
        VariantKind::Pvp => {
            let (a, b) = into_pair(kind, teams)?;
            Box::new(PvpBattle::new(a, b, config, options, collaborators)?.with_entry_fee(fee))
        }
        VariantKind::Pve => {
            let (players, monsters) = into_pair(kind, teams)?;
            let pve = context.pve;
            Box::new(PveBattle::new(players, monsters, pve, config, options, collaborators)?)
        }
        VariantKind::Raid => {
            let (a, b) = into_pair(kind, teams)?;
            Box::new(RaidBattle::new(a, b, config, options, collaborators)?.with_entry_fee(fee))
        }
        VariantKind::Team => {
            Box::new(TeamBattle::new(teams, config, options, collaborators)?.with_entry_fee(fee))
        }
    };
    Ok(battle)
}
