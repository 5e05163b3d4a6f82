//! # sr_core - Seal Race ranking and synchronization core
//!
//! Real-time engine behind the Seal Race puzzle game: teams race to solve
//! seven puzzles ("seals"), progress is mirrored through a shared real-time
//! feed, and participants are ranked live and on a historical board.
//!
//! ## What lives here
//! - Pure ranking over participant records (live and include-all modes)
//! - Elapsed-time arithmetic and `MM:SS` formatting
//! - Simulated opponents for solo sessions
//! - The live sync coordinator (feed snapshots + periodic re-ranking)
//! - The dependency-readiness bootstrap with timeout fallback
//! - Feature gating for optional-subsystem entry points
//!
//! Transport, rendering and persistence are host concerns behind the
//! [`feed::Feed`], [`sync::RankSink`] and [`leaderboard::LeaderboardStore`]
//! traits. Everything runs on the host's event loop; the only clock any
//! component sees is an injected [`clock::Clock`].

pub mod bootstrap;
pub mod clock;
pub mod error;
pub mod feed;
pub mod gate;
pub mod leaderboard;
pub mod participant;
pub mod ranking;
pub mod simulation;
pub mod sync;

pub use bootstrap::{
    BootstrapSignal, BootstrapState, DependencyDescriptor, DependencyStatus, ReadinessBootstrap,
};
pub use clock::{elapsed_millis, format_duration, Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use feed::{Feed, SubscriptionId};
pub use gate::{GateExtension, GatedHooks, SessionHooks};
pub use leaderboard::{global_leaderboard, LeaderboardStore, TimeWindow, LEADERBOARD_TOP_N};
pub use participant::{
    ParticipantKind, ParticipantRecord, ParticipantStatus, SealProgress, SessionContext,
    TOTAL_SEALS,
};
pub use ranking::{rank, RankMode, RankedEntry};
pub use simulation::generate_opponents;
pub use sync::{RankSink, SyncCoordinator, SyncStats, TickHandle, TickScheduler};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct NullFeed;

    impl Feed for NullFeed {
        fn subscribe(&mut self, _channel: &str) -> Result<SubscriptionId> {
            Ok(SubscriptionId(1))
        }
        fn unsubscribe(&mut self, _subscription: SubscriptionId) {}
        fn fetch_once(&mut self, _channel: &str) -> Result<serde_json::Value> {
            Ok(json!({}))
        }
    }

    struct NullScheduler;

    impl TickScheduler for NullScheduler {
        fn schedule(&mut self, _interval_ms: i64) -> TickHandle {
            TickHandle(1)
        }
        fn cancel(&mut self, _handle: TickHandle) {}
    }

    #[derive(Clone, Default)]
    struct LastEmission(Rc<RefCell<Vec<RankedEntry>>>);

    impl RankSink for LastEmission {
        fn publish(&mut self, entries: &[RankedEntry]) {
            *self.0.borrow_mut() = entries.to_vec();
        }
    }

    /// Full happy path: bootstrap readiness gates the coordinator, then a
    /// live snapshot produces a ranked emission.
    #[test]
    fn test_bootstrap_then_live_ranking() {
        let clock = ManualClock::new(1_000_000);

        let feed_loaded = Rc::new(Cell::new(false));
        let probe_flag = Rc::clone(&feed_loaded);
        let deps = vec![DependencyDescriptor::required(
            "feed_sdk",
            Box::new(move || Ok(probe_flag.get())),
        )];
        let mut boot = ReadinessBootstrap::new(deps, clock.clone());

        clock.advance(200);
        assert_eq!(boot.poll(), None);

        feed_loaded.set(true);
        clock.advance(200);
        let signal = boot.poll().expect("bootstrap should become usable");
        assert!(!signal.degraded);

        // Now the coordinator is allowed to start.
        let sink = LastEmission::default();
        let mut coord = SyncCoordinator::new(NullFeed, NullScheduler, sink.clone(), clock.clone());
        coord.start("weekly-race").unwrap();

        let now = clock.now_millis();
        coord.handle_snapshot(&json!({
            "a": {
                "displayName": "A",
                "status": "active",
                "progress": { "sealsCompleted": [1, 2, 3], "startTime": now - 100_000 }
            },
            "b": {
                "displayName": "B",
                "status": "active",
                "progress": { "sealsCompleted": [1, 2], "startTime": now - 50_000 }
            }
        }));

        let emission = sink.0.borrow();
        assert_eq!(emission.len(), 2);
        assert_eq!(emission[0].record.id, "a");
        assert_eq!(emission[0].rank, 1);
        assert_eq!(emission[0].elapsed_millis, 100_000);
        assert_eq!(emission[1].record.id, "b");
        assert_eq!(emission[1].rank, 2);
        assert_eq!(format_duration(emission[0].elapsed_millis), "01:40");
    }

    /// Degraded path: the bootstrap times out, yet the system proceeds and
    /// the timeout signal is the same outward "usable" event.
    #[test]
    fn test_timed_out_bootstrap_still_unblocks_the_system() {
        let clock = ManualClock::new(0);
        let deps =
            vec![DependencyDescriptor::required("never_loads", Box::new(|| Ok(false)))];
        let mut boot =
            ReadinessBootstrap::new(deps, clock.clone()).with_deadline_ms(2_000);

        clock.set(2_000);
        let signal = boot.poll().expect("deadline must force the usable signal");
        assert!(signal.degraded);
        assert_eq!(boot.state(), BootstrapState::TimedOut);

        // Coordinator still functions on whatever arrives later.
        let sink = LastEmission::default();
        let mut coord = SyncCoordinator::new(NullFeed, NullScheduler, sink.clone(), clock.clone());
        coord.start("degraded-race").unwrap();
        coord.handle_tick();
        assert!(coord.is_running());
    }
}
