//! Pure ranking over participant records.
//!
//! Ordering, highest priority first:
//! 1. Seal count, descending.
//! 2. Elapsed time, ascending. Completed runs use their frozen completion
//!    time (a completed run with no stamp sorts as infinite); in-progress
//!    runs use time elapsed so far, so at equal progress the most recent
//!    entrant ranks highest. That tie-break is intentional and load-bearing
//!    for the product; do not "fix" it to descending.
//!
//! The sort is stable: records that compare equal keep their input order.

use serde::Serialize;

use crate::participant::{ParticipantRecord, ParticipantStatus};

/// Which records take part in a ranking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Active session: disconnected participants are dropped.
    Live,
    /// Historical/global leaderboards and offline play: everyone ranks.
    IncludeAll,
}

/// One row of a computed ranking. Derived on every pass, never stored;
/// mutating an entry has no effect on future passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// 1-based position; contiguous, no tie compression.
    pub rank: usize,
    pub record: ParticipantRecord,
    /// Sort-key elapsed time. `i64::MAX` when it cannot be determined
    /// (missing start, or completed without a stamp).
    pub elapsed_millis: i64,
}

/// Elapsed time used as the ranking sort key. Never fails: records with
/// unusable timing data sort as infinite rather than being dropped.
fn sort_elapsed(record: &ParticipantRecord, now_millis: i64) -> i64 {
    let Some(started_at) = record.progress.started_at else {
        return i64::MAX;
    };
    if record.is_complete() {
        match record.progress.completed_at {
            Some(completed_at) => (completed_at - started_at).max(0),
            None => i64::MAX,
        }
    } else {
        (now_millis - started_at).max(0)
    }
}

/// Compute a total order over `records`.
///
/// Output length equals input length, minus disconnected records in
/// [`RankMode::Live`]. Ranks are assigned 1..=N after a stable sort.
pub fn rank(records: &[ParticipantRecord], mode: RankMode, now_millis: i64) -> Vec<RankedEntry> {
    let mut keyed: Vec<(i64, &ParticipantRecord)> = records
        .iter()
        .filter(|r| mode == RankMode::IncludeAll || r.status != ParticipantStatus::Disconnected)
        .map(|r| (sort_elapsed(r, now_millis), r))
        .collect();

    // Vec::sort_by is stable, which carries input order through ties.
    keyed.sort_by(|(elapsed_a, a), (elapsed_b, b)| {
        b.progress
            .seal_count()
            .cmp(&a.progress.seal_count())
            .then(elapsed_a.cmp(elapsed_b))
    });

    keyed
        .into_iter()
        .enumerate()
        .map(|(idx, (elapsed_millis, record))| RankedEntry {
            rank: idx + 1,
            record: record.clone(),
            elapsed_millis,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{ParticipantKind, SealProgress};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn record(
        id: &str,
        seals: u8,
        started_at: i64,
        completed_at: Option<i64>,
        status: ParticipantStatus,
    ) -> ParticipantRecord {
        ParticipantRecord {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            kind: ParticipantKind::Human,
            status,
            progress: SealProgress {
                seals_completed: (1..=seals).collect::<BTreeSet<u8>>(),
                started_at: Some(started_at),
                completed_at,
            },
        }
    }

    fn active(id: &str, seals: u8, started_at: i64) -> ParticipantRecord {
        record(id, seals, started_at, None, ParticipantStatus::Active)
    }

    fn completed(id: &str, started_at: i64, completed_at: i64) -> ParticipantRecord {
        record(id, 7, started_at, Some(completed_at), ParticipantStatus::Completed)
    }

    #[test]
    fn test_more_seals_rank_higher() {
        // A: 3 seals, started 100s ago. B: 2 seals, started 50s ago.
        let now = 1_000_000;
        let records = vec![active("b", 2, now - 50_000), active("a", 3, now - 100_000)];
        let ranked = rank(&records, RankMode::Live, now);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].record.id, "a");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].record.id, "b");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_completed_ranked_by_frozen_time() {
        let records = vec![
            completed("slow", 0, 2_160_000),
            completed("fast", 0, 1_980_000),
        ];
        let ranked = rank(&records, RankMode::IncludeAll, 9_999_999);

        assert_eq!(ranked[0].record.id, "fast");
        assert_eq!(ranked[0].elapsed_millis, 1_980_000);
        assert_eq!(ranked[1].record.id, "slow");
        assert_eq!(ranked[1].elapsed_millis, 2_160_000);
    }

    #[test]
    fn test_newer_entrant_outranks_at_equal_progress() {
        let now = 500_000;
        let records = vec![active("old", 4, now - 400_000), active("new", 4, now - 10_000)];
        let ranked = rank(&records, RankMode::Live, now);
        assert_eq!(ranked[0].record.id, "new");
    }

    #[test]
    fn test_completed_without_stamp_sorts_last_among_complete() {
        let mut stampless = completed("stampless", 0, 0);
        stampless.progress.completed_at = None;
        let records = vec![stampless, completed("stamped", 0, 3_000_000)];
        let ranked = rank(&records, RankMode::IncludeAll, 10_000_000);

        assert_eq!(ranked[0].record.id, "stamped");
        assert_eq!(ranked[1].record.id, "stampless");
        assert_eq!(ranked[1].elapsed_millis, i64::MAX);
    }

    #[test]
    fn test_live_mode_drops_disconnected() {
        let records = vec![
            active("a", 1, 0),
            record("gone", 5, 0, None, ParticipantStatus::Disconnected),
        ];
        assert_eq!(rank(&records, RankMode::Live, 1_000).len(), 1);
        assert_eq!(rank(&records, RankMode::IncludeAll, 1_000).len(), 2);
        // In include-all mode the disconnected record still ranks normally.
        assert_eq!(rank(&records, RankMode::IncludeAll, 1_000)[0].record.id, "gone");
    }

    #[test]
    fn test_stability_preserves_input_order_on_exact_ties() {
        let records =
            vec![active("first", 3, 100), active("second", 3, 100), active("third", 3, 100)];
        for _ in 0..3 {
            let ranked = rank(&records, RankMode::Live, 50_000);
            let ids: Vec<&str> = ranked.iter().map(|e| e.record.id.as_str()).collect();
            assert_eq!(ids, vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn test_reranking_frozen_record_is_idempotent() {
        let records = vec![completed("done", 1_000, 61_000)];
        let a = rank(&records, RankMode::IncludeAll, 100_000);
        let b = rank(&records, RankMode::IncludeAll, 200_000);
        assert_eq!(a, b);
        assert_eq!(a[0].elapsed_millis, 60_000);
    }

    prop_compose! {
        fn arb_record(idx: usize)(
            seals in 0u8..=7,
            started_offset in 0i64..3_600_000,
            disconnected in prop::bool::weighted(0.2),
        ) -> ParticipantRecord {
            let status = if disconnected {
                ParticipantStatus::Disconnected
            } else if seals == 7 {
                ParticipantStatus::Completed
            } else {
                ParticipantStatus::Active
            };
            let completed_at =
                (seals == 7).then_some(7_200_000 - started_offset / 2);
            record(&format!("p{}", idx), seals, 3_600_000 - started_offset, completed_at, status)
        }
    }

    fn arb_records() -> impl Strategy<Value = Vec<ParticipantRecord>> {
        (0usize..30).prop_flat_map(|n| {
            (0..n).map(arb_record).collect::<Vec<_>>()
        })
    }

    proptest! {
        #[test]
        fn prop_include_all_drops_nothing(records in arb_records()) {
            let ranked = rank(&records, RankMode::IncludeAll, 7_200_000);
            prop_assert_eq!(ranked.len(), records.len());
        }

        #[test]
        fn prop_ranks_are_contiguous_from_one(records in arb_records()) {
            for mode in [RankMode::Live, RankMode::IncludeAll] {
                let ranked = rank(&records, mode, 7_200_000);
                for (idx, entry) in ranked.iter().enumerate() {
                    prop_assert_eq!(entry.rank, idx + 1);
                }
            }
        }

        #[test]
        fn prop_order_is_seal_major_elapsed_minor(records in arb_records()) {
            let ranked = rank(&records, RankMode::IncludeAll, 7_200_000);
            for pair in ranked.windows(2) {
                let (hi, lo) = (&pair[0], &pair[1]);
                let hi_seals = hi.record.progress.seal_count();
                let lo_seals = lo.record.progress.seal_count();
                prop_assert!(hi_seals >= lo_seals);
                if hi_seals == lo_seals {
                    prop_assert!(hi.elapsed_millis <= lo.elapsed_millis);
                }
            }
        }

        #[test]
        fn prop_repeated_calls_agree(records in arb_records()) {
            let a = rank(&records, RankMode::Live, 7_200_000);
            let b = rank(&records, RankMode::Live, 7_200_000);
            prop_assert_eq!(a, b);
        }
    }
}
