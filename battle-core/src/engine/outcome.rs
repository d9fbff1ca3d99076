//! Terminal outcomes and the reward plans handed to settlement.

use super::{BattleId, VariantKind};
use crate::sinks::EntryFeeLedger;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BattleResult {
    /// Team indices.
    Victory { winner: usize, losers: Vec<usize> },
    Draw,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BattleOutcome {
    pub battle_id: BattleId,
    pub result: BattleResult,
    pub timed_out: bool,
    /// Log actions recorded over the whole battle.
    pub actions: u64,
}

impl BattleOutcome {
    pub fn winner(&self) -> Option<usize> {
        match &self.result {
            BattleResult::Victory { winner, .. } => Some(*winner),
            BattleResult::Draw => None,
        }
    }

    pub fn losers(&self) -> &[usize] {
        match &self.result {
            BattleResult::Victory { losers, .. } => losers,
            BattleResult::Draw => &[],
        }
    }

    pub fn is_draw(&self) -> bool {
        self.result == BattleResult::Draw
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub user_id: u64,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardPlan {
    None,
    Pve {
        monster_tier: u8,
        reward_multiplier: Decimal,
    },
    Wager {
        entry_fee: Decimal,
        /// Losers the ledger confirmed as paid.
        verified: Vec<u64>,
        /// Losers left out of the pot because payment could not be confirmed.
        excluded: Vec<u64>,
        payouts: Vec<Payout>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SettlementRequest {
    pub variant: VariantKind,
    pub outcome: BattleOutcome,
    pub participants: Vec<u64>,
    pub plan: RewardPlan,
}

/// Reward multiplier for a suspicious-activity counter.
pub fn macro_penalty(counter: u32) -> Decimal {
    match counter {
        0..=9 => Decimal::ONE,
        10..=19 => Decimal::new(75, 2),
        _ => Decimal::new(5, 1),
    }
}

/// Builds the payout plan for a wagered battle.
///
/// Only losers the ledger confirms contribute to the pot. Shares are rounded down to
/// cents and the leftover cents go to the first winner, so payouts sum to the pot.
pub fn settle_wager(
    battle_id: BattleId,
    entry_fee: Decimal,
    winners: &[u64],
    losers: &[u64],
    ledger: &dyn EntryFeeLedger,
) -> RewardPlan {
    let mut verified = Vec::new();
    let mut excluded = Vec::new();
    for &user_id in losers {
        match ledger.has_paid(battle_id, user_id, entry_fee) {
            Ok(true) => verified.push(user_id),
            Ok(false) => excluded.push(user_id),
            Err(err) => {
                tracing::warn!(%battle_id, user_id, error = %err, "entry fee check failed");
                excluded.push(user_id);
            }
        }
    }

    let payouts = if winners.is_empty() || verified.is_empty() {
        Vec::new()
    } else {
        let pot = entry_fee * Decimal::from(verified.len());
        let count = Decimal::from(winners.len());
        let share = (pot / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
        let remainder = pot - share * count;
        winners
            .iter()
            .enumerate()
            .map(|(idx, &user_id)| Payout {
                user_id,
                amount: if idx == 0 { share + remainder } else { share },
            })
            .collect()
    };

    RewardPlan::Wager {
        entry_fee,
        verified,
        excluded,
        payouts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::sinks::RecordedLedger;

    #[test]
    fn macro_penalty_steps_down() {
        assert_eq!(macro_penalty(0), Decimal::ONE);
        assert_eq!(macro_penalty(9), Decimal::ONE);
        assert_eq!(macro_penalty(10), Decimal::new(75, 2));
        assert_eq!(macro_penalty(19), Decimal::new(75, 2));
        assert_eq!(macro_penalty(20), Decimal::new(5, 1));
    }

    #[test]
    fn unpaid_losers_are_left_out_of_the_pot() {
        let ledger = RecordedLedger::new([10, 11]);
        let plan = settle_wager(
            BattleId::new(),
            Decimal::from(100),
            &[1, 2, 3],
            &[10, 11, 12],
            &ledger,
        );
        let RewardPlan::Wager {
            verified,
            excluded,
            payouts,
            ..
        } = plan
        else {
            panic!("expected a wager plan");
        };
        assert_eq!(verified, vec![10, 11]);
        assert_eq!(excluded, vec![12]);
        assert_eq!(payouts.len(), 3);
        assert_eq!(payouts[0].amount, Decimal::new(6668, 2));
        assert!(payouts[1..].iter().all(|p| p.amount == Decimal::new(6666, 2)));
    }

    #[test]
    fn payouts_never_exceed_the_verified_pot() {
        let fee = Decimal::new(3333, 2);
        for winners in 1..=7u64 {
            for paid in 1..=5u64 {
                let winner_ids: Vec<u64> = (1..=winners).collect();
                let loser_ids: Vec<u64> = (100..100 + paid).collect();
                let ledger = RecordedLedger::new(loser_ids.iter().copied());
                let plan = settle_wager(BattleId::new(), fee, &winner_ids, &loser_ids, &ledger);
                let RewardPlan::Wager { payouts, .. } = plan else {
                    panic!("expected a wager plan");
                };
                let paid_out: Decimal = payouts.iter().map(|p| p.amount).sum();
                assert_eq!(paid_out, fee * Decimal::from(paid), "{winners} winners, {paid} paid");
                assert!(payouts.iter().all(|p| p.amount.scale() <= 2));
            }
        }
    }

    struct BrokenLedger;

    impl EntryFeeLedger for BrokenLedger {
        fn has_paid(&self, _: BattleId, _: u64, _: Decimal) -> Result<bool, SinkError> {
            Err(SinkError::Ledger("offline".to_string()))
        }
    }

    #[test]
    fn ledger_failures_pay_nobody() {
        let plan = settle_wager(BattleId::new(), Decimal::from(50), &[1], &[2], &BrokenLedger);
        assert_eq!(
            plan,
            RewardPlan::Wager {
                entry_fee: Decimal::from(50),
                verified: Vec::new(),
                excluded: vec![2],
                payouts: Vec::new(),
            }
        );
    }
}
