//! Synthetic opponents for single-player sessions.
//!
//! When a player races alone there is no feed to rank against, so the
//! coordinator fabricates a small field of simulated competitors keyed off
//! the player's own progress. Generation is intentionally non-deterministic
//! in production (fresh records per invocation); the RNG is injected so
//! tests can seed it.

use rand::Rng;
use std::collections::BTreeSet;

use crate::participant::{
    ParticipantKind, ParticipantRecord, ParticipantStatus, SealProgress, TOTAL_SEALS,
};

/// Fixed roster of simulated-opponent names.
const OPPONENT_NAMES: [&str; 8] =
    ["Korrin", "Maeve", "Tobin", "Isolde", "Fenn", "Bryda", "Orrin", "Sable"];

/// Maximum backdating of a simulated opponent's start (10 minutes).
const MAX_START_BACKDATE_MS: i64 = 600_000;

/// Maximum simulated run time for an already-finished opponent (5 minutes).
const MAX_COMPLETION_OFFSET_MS: i64 = 300_000;

fn opponent_name(index: usize) -> String {
    let base = OPPONENT_NAMES[index % OPPONENT_NAMES.len()];
    if index < OPPONENT_NAMES.len() {
        base.to_string()
    } else {
        format!("{} {}", base, index / OPPONENT_NAMES.len() + 1)
    }
}

/// Seal count for opponent `index`, shaped around the player's progress.
///
/// Opponent 0 is biased one ahead, opponent 1 one behind, the rest drift
/// -1..=1 around the reference. Everything clamps to 0..=7.
fn opponent_progress(index: usize, reference: u8, rng: &mut impl Rng) -> u8 {
    let reference = reference.min(TOTAL_SEALS) as i8;
    let drift: i8 = match index {
        0 => rng.gen_range(0..=1),
        1 => -rng.gen_range(0..=1),
        _ => rng.gen_range(-1..=1),
    };
    (reference + drift).clamp(0, TOTAL_SEALS as i8) as u8
}

/// Generate `count` simulated opponents around `reference_progress`.
///
/// Starts are backdated up to ten minutes so the field does not read as
/// having all spawned this instant. Opponents that already hold all seven
/// seals get a completion stamp after their start (never in the future);
/// everyone else is mid-run.
pub fn generate_opponents(
    reference_progress: u8,
    count: usize,
    rng: &mut impl Rng,
    now_millis: i64,
) -> Vec<ParticipantRecord> {
    (0..count)
        .map(|index| {
            let progress = opponent_progress(index, reference_progress, rng);
            let started_at = now_millis - rng.gen_range(0..=MAX_START_BACKDATE_MS);

            let (status, completed_at) = if progress == TOTAL_SEALS {
                let stamp = (started_at + rng.gen_range(0..=MAX_COMPLETION_OFFSET_MS))
                    .min(now_millis);
                (ParticipantStatus::Completed, Some(stamp))
            } else {
                (ParticipantStatus::Active, None)
            };

            ParticipantRecord {
                id: format!("sim_{:02}", index + 1),
                display_name: opponent_name(index),
                kind: ParticipantKind::Simulated,
                status,
                progress: SealProgress {
                    seals_completed: (1..=progress).collect::<BTreeSet<u8>>(),
                    started_at: Some(started_at),
                    completed_at,
                },
            }
        })
        .collect()
}
