use crate::engine::BattleId;
use crate::error::SinkError;
use crate::log::LogEntry;
use crate::sinks::ReplaySink;
use crate::snapshot::BattleSnapshot;
use serde_json::json;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedEntry {
    pub battle_id: BattleId,
    pub entry: LogEntry,
}

/// In-memory replay sink keeping the complete log (and optionally every snapshot).
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    capture_snapshots: bool,
    entries: Mutex<Vec<RecordedEntry>>,
    snapshots: Mutex<Vec<BattleSnapshot>>,
}

impl ReplayRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots() -> Self {
        Self {
            capture_snapshots: true,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<RecordedEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn snapshots(&self) -> Vec<BattleSnapshot> {
        self.snapshots.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn log_lines(&self, battle_id: BattleId) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|r| r.battle_id == battle_id)
            .map(|r| r.entry.message)
            .collect()
    }

    pub fn to_json(&self, battle_id: BattleId) -> serde_json::Value {
        let log: Vec<serde_json::Value> = self
            .entries()
            .into_iter()
            .filter(|r| r.battle_id == battle_id)
            .map(|r| json!({ "action": r.entry.action, "message": r.entry.message }))
            .collect();
        let turn_states: Vec<BattleSnapshot> = self
            .snapshots()
            .into_iter()
            .filter(|s| s.battle_id == battle_id.to_string())
            .collect();
        json!({
            "battle_id": battle_id.to_string(),
            "log": log,
            "turn_states": turn_states,
        })
    }
}

impl ReplaySink for ReplayRecorder {
    fn append(&self, battle_id: BattleId, entry: &LogEntry) -> Result<(), SinkError> {
        self.entries
            .lock()
            .map_err(|_| SinkError::Replay("replay log lock poisoned".to_string()))?
            .push(RecordedEntry {
                battle_id,
                entry: entry.clone(),
            });
        Ok(())
    }

    fn wants_snapshots(&self) -> bool {
        self.capture_snapshots
    }

    fn capture(&self, _battle_id: BattleId, snapshot: &BattleSnapshot) -> Result<(), SinkError> {
        self.snapshots
            .lock()
            .map_err(|_| SinkError::Replay("snapshot lock poisoned".to_string()))?
            .push(snapshot.clone());
        Ok(())
    }
}
