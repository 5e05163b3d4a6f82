//! Participant data model and per-session context.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CoreError, Result};

/// Number of seals (puzzles) in a race.
pub const TOTAL_SEALS: u8 = 7;

/// Human player or synthetic competitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Human,
    Simulated,
}

/// Connection/run status of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Active,
    Completed,
    Disconnected,
}

/// Seal completion progress for one run.
///
/// `completed_at` is set exactly once, when the seventh seal lands, and only
/// through [`ParticipantRecord::record_seal`]. Feed payloads that already
/// carry a completion stamp are validated in the feed layer before they
/// reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealProgress {
    /// Indices of completed seals, 1..=7, deduplicated and ordered.
    pub seals_completed: BTreeSet<u8>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl SealProgress {
    pub fn seal_count(&self) -> usize {
        self.seals_completed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.seals_completed.len() == TOTAL_SEALS as usize
    }
}

/// One competitor in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub id: String,
    pub display_name: String,
    pub kind: ParticipantKind,
    pub status: ParticipantStatus,
    pub progress: SealProgress,
}

impl ParticipantRecord {
    /// New active human participant whose run starts now.
    pub fn new_human(id: String, display_name: String, started_at: i64) -> Self {
        Self {
            id,
            display_name,
            kind: ParticipantKind::Human,
            status: ParticipantStatus::Active,
            progress: SealProgress {
                seals_completed: BTreeSet::new(),
                started_at: Some(started_at),
                completed_at: None,
            },
        }
    }

    /// Record a completed seal. Seal count only ever grows; completing the
    /// final seal seals the run (status and completion stamp together, so
    /// the completion invariant holds).
    pub fn record_seal(&mut self, seal_index: u8, now_millis: i64) -> Result<bool> {
        if seal_index == 0 || seal_index > TOTAL_SEALS {
            return Err(CoreError::InvalidRecord(format!(
                "seal index {} out of range 1..={}",
                seal_index, TOTAL_SEALS
            )));
        }
        if self.status == ParticipantStatus::Completed {
            return Err(CoreError::InvalidRecord(format!(
                "participant {} already completed",
                self.id
            )));
        }

        self.progress.seals_completed.insert(seal_index);

        let finished = self.progress.is_complete();
        if finished {
            self.status = ParticipantStatus::Completed;
            self.progress.completed_at = Some(now_millis);
        }
        Ok(finished)
    }

    pub fn is_complete(&self) -> bool {
        self.progress.is_complete()
    }
}

/// Per-session state owned by the sync coordinator.
///
/// `start()` on the coordinator replaces the whole context, so two sessions'
/// participants can never coexist. The participant map is ordered by id so
/// that repeated ranking passes see the same input sequence (the ranking
/// sort is stable; a deterministic input keeps tie order deterministic).
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_id: Option<String>,
    pub started_at: i64,
    pub active_participants: BTreeMap<String, ParticipantRecord>,
}

impl SessionContext {
    pub fn new(session_id: String, started_at: i64) -> Self {
        Self {
            session_id: Some(session_id),
            started_at,
            active_participants: BTreeMap::new(),
        }
    }

    /// Replace participants wholesale from a feed snapshot.
    pub fn replace_participants(&mut self, participants: BTreeMap<String, ParticipantRecord>) {
        self.active_participants = participants;
    }

    /// Insert or overwrite a single record.
    pub fn upsert(&mut self, record: ParticipantRecord) {
        self.active_participants.insert(record.id.clone(), record);
    }

    pub fn get(&self, participant_id: &str) -> Option<&ParticipantRecord> {
        self.active_participants.get(participant_id)
    }

    pub fn participant_count(&self) -> usize {
        self.active_participants.len()
    }
}
