//! Global leaderboard over completed, persisted runs.
//!
//! The store itself (query transport, persistence format) belongs to the
//! host; the core reuses the include-all ranking mode over what the store
//! returns, keeps finished runs only, and truncates to the display size.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::Result;
use crate::participant::ParticipantRecord;
use crate::ranking::{rank, RankMode, RankedEntry};

/// Rows shown on the global board.
pub const LEADERBOARD_TOP_N: usize = 20;

/// Historical query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    All,
    Today,
    Week,
    Month,
}

/// Boundary to the historical store. Window filtering happens store-side.
pub trait LeaderboardStore {
    fn fetch_completed(&mut self, window: TimeWindow) -> Result<Vec<ParticipantRecord>>;
}

/// Build the global board for one window: completed runs only, include-all
/// ranking (frozen completion times), truncated to [`LEADERBOARD_TOP_N`].
pub fn global_leaderboard(
    store: &mut impl LeaderboardStore,
    window: TimeWindow,
    clock: &impl Clock,
) -> Result<Vec<RankedEntry>> {
    let records = store.fetch_completed(window)?;
    let total = records.len();

    let completed: Vec<ParticipantRecord> =
        records.into_iter().filter(|r| r.is_complete()).collect();
    if completed.len() < total {
        log::debug!(
            "[BOARD] store returned {} records, {} incomplete filtered out",
            total,
            total - completed.len()
        );
    }

    let mut ranked = rank(&completed, RankMode::IncludeAll, clock.now_millis());
    ranked.truncate(LEADERBOARD_TOP_N);
    Ok(ranked)
}
