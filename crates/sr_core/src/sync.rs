//! Live sync coordinator.
//!
//! Owns the [`SessionContext`] and wires three event sources into the
//! ranking engine: feed snapshots (push), periodic ticks (so elapsed-time
//! rank changes surface even with no new data), and local solo-play
//! updates. Every pass emits an independent ranked snapshot to the sink;
//! the coordinator never blocks on either boundary.
//!
//! All entry points are plain method calls driven by the host's event loop;
//! handlers run to completion, so there is no shared state to lock.

use rand::Rng;
use serde::Serialize;

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::feed::{parse_snapshot, session_channel, Feed, SubscriptionId};
use crate::participant::{ParticipantRecord, SessionContext};
use crate::ranking::{rank, RankMode, RankedEntry};
use crate::simulation::generate_opponents;

/// Ranking refresh cadence while the tab is in the foreground.
pub const TICK_INTERVAL_MS: i64 = 1_000;

/// Relaxed cadence while backgrounded.
pub const BACKGROUND_TICK_INTERVAL_MS: i64 = 5_000;

/// Field size for solo sessions (player plus three simulated rivals).
pub const SOLO_OPPONENT_COUNT: usize = 3;

/// Opaque handle to a scheduled periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Host-side periodic timer. The host calls
/// [`SyncCoordinator::handle_tick`] at the scheduled interval.
pub trait TickScheduler {
    fn schedule(&mut self, interval_ms: i64) -> TickHandle;

    /// Cancel a scheduled tick. Unknown handles are a no-op.
    fn cancel(&mut self, handle: TickHandle);
}

/// Rendering collaborator. Pure sink: the coordinator makes no assumption
/// about how or whether emissions are consumed.
pub trait RankSink {
    fn publish(&mut self, entries: &[RankedEntry]);
}

/// Point-in-time coordinator counters, for diagnostics overlays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub session_id: Option<String>,
    pub participants: usize,
    pub emissions: u64,
    /// Last successful snapshot apply; `None` means the current state has
    /// never synced. Consumers can surface staleness from this.
    pub last_synced_at: Option<i64>,
    pub backgrounded: bool,
}

pub struct SyncCoordinator<F, T, S, C> {
    feed: F,
    scheduler: T,
    sink: S,
    clock: C,
    session: SessionContext,
    subscription: Option<SubscriptionId>,
    tick: Option<TickHandle>,
    backgrounded: bool,
    emissions: u64,
    last_synced_at: Option<i64>,
}

impl<F, T, S, C> SyncCoordinator<F, T, S, C>
where
    F: Feed,
    T: TickScheduler,
    S: RankSink,
    C: Clock,
{
    pub fn new(feed: F, scheduler: T, sink: S, clock: C) -> Self {
        Self {
            feed,
            scheduler,
            sink,
            clock,
            session: SessionContext::default(),
            subscription: None,
            tick: None,
            backgrounded: false,
            emissions: 0,
            last_synced_at: None,
        }
    }

    /// Begin syncing a session. Any previous session (same or different id)
    /// is stopped first, so session state never overlaps.
    pub fn start(&mut self, session_id: &str) -> Result<()> {
        self.stop();

        let now = self.clock.now_millis();
        self.session = SessionContext::new(session_id.to_string(), now);

        let subscription = match self.feed.subscribe(&session_channel(session_id)) {
            Ok(subscription) => subscription,
            Err(err) => {
                // Leave no half-started session behind.
                self.session = SessionContext::default();
                return Err(err);
            }
        };
        self.subscription = Some(subscription);
        self.tick = Some(self.scheduler.schedule(self.tick_interval()));

        log::info!("[SYNC] session {} started (sub {:?})", session_id, subscription);
        Ok(())
    }

    /// Tear down the current session. Idempotent and safe when never
    /// started; subscription and tick handles are released exactly once.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.feed.unsubscribe(subscription);
        }
        if let Some(tick) = self.tick.take() {
            self.scheduler.cancel(tick);
        }
        if let Some(session_id) = self.session.session_id.take() {
            log::info!("[SYNC] session {} stopped", session_id);
        }
        self.session = SessionContext::default();
        self.last_synced_at = None;
    }

    /// Switch between foreground and background tick cadence.
    pub fn set_backgrounded(&mut self, backgrounded: bool) {
        if self.backgrounded == backgrounded {
            return;
        }
        self.backgrounded = backgrounded;
        if let Some(handle) = self.tick.take() {
            self.scheduler.cancel(handle);
            self.tick = Some(self.scheduler.schedule(self.tick_interval()));
        }
    }

    fn tick_interval(&self) -> i64 {
        if self.backgrounded {
            BACKGROUND_TICK_INTERVAL_MS
        } else {
            TICK_INTERVAL_MS
        }
    }

    /// Apply one feed snapshot: wholesale participant replacement, then a
    /// live-mode ranking pass. A malformed payload keeps the last-known
    /// state (the leaderboard goes stale rather than blank; see
    /// [`SyncStats::last_synced_at`]).
    pub fn handle_snapshot(&mut self, payload: &serde_json::Value) {
        if self.session.session_id.is_none() {
            log::debug!("[SYNC] snapshot ignored, no active session");
            return;
        }
        match parse_snapshot(payload) {
            Ok(records) => {
                self.session.replace_participants(records);
                self.last_synced_at = Some(self.clock.now_millis());
                self.emit(RankMode::Live);
            }
            Err(err) => {
                log::warn!("[SYNC] snapshot rejected, keeping last-known state: {}", err);
            }
        }
    }

    /// Report a feed-transport failure. The coordinator keeps its state and
    /// keeps re-ranking on ticks; staleness stays observable through
    /// `last_synced_at`.
    pub fn handle_feed_failure(&mut self, error: &CoreError) {
        log::warn!("[SYNC] feed failure, continuing on last-known state: {}", error);
    }

    /// Periodic re-rank of in-memory state only (no fetch). Elapsed-time
    /// ordering shifts between snapshots surface here.
    pub fn handle_tick(&mut self) {
        if self.session.session_id.is_none() && self.session.participant_count() == 0 {
            return;
        }
        self.emit(RankMode::Live);
    }

    /// Solo-play update: fold the human record in, regenerate the simulated
    /// field around its progress, and re-rank everyone. Include-all mode:
    /// with no network there is nothing to disconnect from.
    pub fn update_from_local_state(&mut self, record: ParticipantRecord, rng: &mut impl Rng) {
        let reference = record.progress.seal_count() as u8;
        let now = self.clock.now_millis();

        self.session.upsert(record);
        for opponent in generate_opponents(reference, SOLO_OPPONENT_COUNT, rng, now) {
            self.session.upsert(opponent);
        }
        self.emit(RankMode::IncludeAll);
    }

    fn emit(&mut self, mode: RankMode) {
        let records: Vec<ParticipantRecord> =
            self.session.active_participants.values().cloned().collect();
        let ranked = rank(&records, mode, self.clock.now_millis());
        self.emissions += 1;
        self.sink.publish(&ranked);
    }

    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.session_id.as_deref()
    }

    pub fn last_synced_at(&self) -> Option<i64> {
        self.last_synced_at
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            session_id: self.session.session_id.clone(),
            participants: self.session.participant_count(),
            emissions: self.emissions,
            last_synced_at: self.last_synced_at,
            backgrounded: self.backgrounded,
        }
    }
}
