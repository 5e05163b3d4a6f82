//! Real-time feed contract and wire payload parsing.
//!
//! The feed itself (transport, reconnection, auth) lives in the host; the
//! core only names channels, holds subscription handles, and turns raw
//! snapshot payloads into validated [`ParticipantRecord`]s. Parsing is
//! tolerant: a structurally valid payload with out-of-range or inconsistent
//! fields is normalized and logged rather than rejected wholesale.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::Result;
use crate::participant::{
    ParticipantKind, ParticipantRecord, ParticipantStatus, SealProgress, TOTAL_SEALS,
};

/// Opaque handle to an open feed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Boundary to the host's real-time feed.
///
/// Snapshot delivery is push-based: the host pumps each payload into
/// [`crate::sync::SyncCoordinator::handle_snapshot`]. `fetch_once` exists
/// for one-shot reads (global leaderboard refresh).
pub trait Feed {
    fn subscribe(&mut self, channel: &str) -> Result<SubscriptionId>;

    /// Close a subscription. Unknown or already-closed handles are a no-op.
    fn unsubscribe(&mut self, subscription: SubscriptionId);

    fn fetch_once(&mut self, channel: &str) -> Result<serde_json::Value>;
}

/// Channel carrying the participant map for one session.
pub fn session_channel(session_id: &str) -> String {
    format!("sessions/{}/participants", session_id)
}

/// Wire shape of one participant's progress.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProgress {
    #[serde(default)]
    pub seals_completed: Vec<i64>,
    pub start_time: Option<i64>,
    pub completion_time: Option<i64>,
}

/// Wire shape of one participant record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub kind: Option<ParticipantKind>,
    pub status: ParticipantStatus,
    pub progress: RawProgress,
}

/// Parse a snapshot payload (participant id -> raw record) into validated
/// records.
///
/// Normalization rules:
/// - seal indices outside 1..=7 are dropped (logged);
/// - a completion stamp without all seven seals is discarded, and a
///   `completed` status without them is demoted to `active`, so the
///   completion invariant holds for everything entering the session;
/// - missing `displayName` falls back to the participant id, missing `kind`
///   to human (simulated records never cross the wire in multiplayer).
pub fn parse_snapshot(payload: &serde_json::Value) -> Result<BTreeMap<String, ParticipantRecord>> {
    let raw: HashMap<String, RawParticipant> = serde_json::from_value(payload.clone())?;

    let mut records = BTreeMap::new();
    for (id, participant) in raw {
        records.insert(id.clone(), normalize(id, participant));
    }
    Ok(records)
}

fn normalize(id: String, raw: RawParticipant) -> ParticipantRecord {
    let mut seals = BTreeSet::new();
    for seal in &raw.progress.seals_completed {
        if (1..=TOTAL_SEALS as i64).contains(seal) {
            seals.insert(*seal as u8);
        } else {
            log::warn!("[FEED] participant {}: dropping out-of-range seal {}", id, seal);
        }
    }
    let complete = seals.len() == TOTAL_SEALS as usize;

    let status = match raw.status {
        ParticipantStatus::Completed if !complete => {
            log::warn!("[FEED] participant {}: completed status without all seals, demoting", id);
            ParticipantStatus::Active
        }
        status => status,
    };

    let completed_at = if complete && status == ParticipantStatus::Completed {
        raw.progress.completion_time
    } else {
        if raw.progress.completion_time.is_some() {
            log::warn!("[FEED] participant {}: discarding stray completion stamp", id);
        }
        None
    };

    ParticipantRecord {
        display_name: raw.display_name.unwrap_or_else(|| id.clone()),
        id,
        kind: raw.kind.unwrap_or(ParticipantKind::Human),
        status,
        progress: SealProgress {
            seals_completed: seals,
            started_at: raw.progress.start_time,
            completed_at,
        },
    }
}
