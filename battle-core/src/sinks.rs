//! Side-channel collaborators: rendering, replay capture, settlement, fee ledger and time.
//!
//! Every call into these is fire-and-forget from the engine's point of view: errors are
//! logged and dropped, never allowed to interrupt a battle.

use crate::engine::outcome::SettlementRequest;
use crate::engine::BattleId;
use crate::error::SinkError;
use crate::log::LogEntry;
use crate::snapshot::BattleSnapshot;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Redraws whatever display the battle is shown on.
pub trait BattleRenderer: Send + Sync {
    fn render(&self, snapshot: &BattleSnapshot) -> Result<(), SinkError>;
}

/// Receives every log line, and optionally a full snapshot per action.
pub trait ReplaySink: Send + Sync {
    fn append(&self, battle_id: BattleId, entry: &LogEntry) -> Result<(), SinkError>;

    /// Snapshots are only built when this returns true.
    fn wants_snapshots(&self) -> bool {
        false
    }

    fn capture(&self, _battle_id: BattleId, _snapshot: &BattleSnapshot) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Applies the economic consequences of a finished battle.
pub trait RewardSettlement: Send + Sync {
    fn settle(&self, request: &SettlementRequest) -> Result<(), SinkError>;
}

/// Answers whether a participant actually paid a battle's entry fee.
pub trait EntryFeeLedger: Send + Sync {
    fn has_paid(
        &self,
        battle_id: BattleId,
        user_id: u64,
        amount: Decimal,
    ) -> Result<bool, SinkError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl BattleRenderer for NullSink {
    fn render(&self, _snapshot: &BattleSnapshot) -> Result<(), SinkError> {
        Ok(())
    }
}

impl ReplaySink for NullSink {
    fn append(&self, _battle_id: BattleId, _entry: &LogEntry) -> Result<(), SinkError> {
        Ok(())
    }
}

impl RewardSettlement for NullSink {
    fn settle(&self, _request: &SettlementRequest) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Ledger backed by a fixed set of users known to have paid.
#[derive(Clone, Debug, Default)]
pub struct RecordedLedger {
    paid: HashSet<u64>,
}

impl RecordedLedger {
    pub fn new(paid: impl IntoIterator<Item = u64>) -> Self {
        Self {
            paid: paid.into_iter().collect(),
        }
    }
}

impl EntryFeeLedger for RecordedLedger {
    fn has_paid(
        &self,
        _battle_id: BattleId,
        user_id: u64,
        _amount: Decimal,
    ) -> Result<bool, SinkError> {
        Ok(self.paid.contains(&user_id))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Collects settlement requests in memory.
#[derive(Debug, Default)]
pub struct SettlementRecorder {
    requests: Mutex<Vec<SettlementRequest>>,
}

impl SettlementRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<SettlementRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl RewardSettlement for SettlementRecorder {
    fn settle(&self, request: &SettlementRequest) -> Result<(), SinkError> {
        self.requests
            .lock()
            .map_err(|_| SinkError::Settlement("recorder lock poisoned".to_string()))?
            .push(request.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        let start = clock.now();
        assert_eq!(clock.now(), start);
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now(), start + Duration::from_secs(5));
    }

    #[test]
    fn recorded_ledger_checks_membership() {
        let ledger = RecordedLedger::new([1, 2]);
        let id = BattleId::new();
        assert_eq!(ledger.has_paid(id, 1, Decimal::TEN), Ok(true));
        assert_eq!(ledger.has_paid(id, 3, Decimal::TEN), Ok(false));
    }
}
