//! Dependency-readiness bootstrap.
//!
//! A polling state machine that holds the rest of the system back until the
//! host environment's capabilities (feed SDK loaded, auth resolved, fonts,
//! whatever the host declares) report ready. `Loading -> Ready` when every
//! required dependency is satisfied; `Loading -> TimedOut` when the deadline
//! passes first, in which case the system proceeds degraded instead of
//! hanging on a capability that may never arrive. Both terminal states emit
//! the same one-shot usable signal.
//!
//! The host drives [`ReadinessBootstrap::poll`] on a timer at
//! [`POLL_INTERVAL_MS`]; the machine itself only reads the injected clock,
//! so tests run on simulated time.

use serde::Serialize;

use crate::clock::Clock;
use crate::error::Result;

/// Default spacing between readiness polls.
pub const POLL_INTERVAL_MS: i64 = 200;

/// Default hard deadline for the bootstrap as a whole.
pub const DEADLINE_MS: i64 = 10_000;

/// Host-supplied capability probe. An `Err` is logged and counts as
/// unsatisfied; it never aborts the bootstrap.
pub type ProbeFn = Box<dyn Fn() -> Result<bool>>;

/// One named capability the bootstrap waits on.
///
/// Created once at configuration time and never removed; only `satisfied`
/// changes, and only from the polling loop.
pub struct DependencyDescriptor {
    pub name: String,
    probe: ProbeFn,
    pub required: bool,
    pub satisfied: bool,
}

impl DependencyDescriptor {
    /// A dependency that blocks the `Ready` transition.
    pub fn required(name: impl Into<String>, probe: ProbeFn) -> Self {
        Self { name: name.into(), probe, required: true, satisfied: false }
    }

    /// A dependency that is tracked and reported but never blocks.
    pub fn optional(name: impl Into<String>, probe: ProbeFn) -> Self {
        Self { name: name.into(), probe, required: false, satisfied: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapState {
    Loading,
    Ready,
    TimedOut,
}

/// Per-dependency satisfaction snapshot, probe excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStatus {
    pub name: String,
    pub required: bool,
    pub satisfied: bool,
}

/// One-shot "system is usable" signal. `degraded` distinguishes a timeout
/// from full readiness for callers that care; most treat them the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapSignal {
    pub degraded: bool,
}

pub struct ReadinessBootstrap<C> {
    dependencies: Vec<DependencyDescriptor>,
    state: BootstrapState,
    clock: C,
    started_at: i64,
    deadline_ms: i64,
    poll_interval_ms: i64,
}

impl<C: Clock> ReadinessBootstrap<C> {
    /// Start the bootstrap clock now, with default deadline and cadence.
    pub fn new(dependencies: Vec<DependencyDescriptor>, clock: C) -> Self {
        let started_at = clock.now_millis();
        Self {
            dependencies,
            state: BootstrapState::Loading,
            clock,
            started_at,
            deadline_ms: DEADLINE_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
        }
    }

    pub fn with_deadline_ms(mut self, deadline_ms: i64) -> Self {
        self.deadline_ms = deadline_ms;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: i64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Run one poll tick.
    ///
    /// Every descriptor's probe is re-evaluated (level-triggered: a
    /// previously satisfied dependency may revert while still loading).
    /// Returns the usable signal on the poll that crosses into a terminal
    /// state, `None` otherwise. Terminal states never poll again.
    pub fn poll(&mut self) -> Option<BootstrapSignal> {
        if self.state != BootstrapState::Loading {
            return None;
        }

        for dependency in &mut self.dependencies {
            dependency.satisfied = match (dependency.probe)() {
                Ok(satisfied) => satisfied,
                Err(err) => {
                    log::warn!("[BOOT] probe '{}' failed: {}", dependency.name, err);
                    false
                }
            };
        }

        let required_satisfied =
            self.dependencies.iter().filter(|d| d.required).all(|d| d.satisfied);
        if required_satisfied {
            self.state = BootstrapState::Ready;
            log::info!("[BOOT] ready after {}ms", self.elapsed_millis());
            return Some(BootstrapSignal { degraded: false });
        }

        if self.elapsed_millis() >= self.deadline_ms {
            let missing: Vec<&str> = self
                .dependencies
                .iter()
                .filter(|d| d.required && !d.satisfied)
                .map(|d| d.name.as_str())
                .collect();
            self.state = BootstrapState::TimedOut;
            log::warn!(
                "[BOOT] deadline {}ms reached, proceeding degraded (missing: {})",
                self.deadline_ms,
                missing.join(", ")
            );
            return Some(BootstrapSignal { degraded: true });
        }

        None
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state != BootstrapState::Loading
    }

    /// Time since the bootstrap started.
    pub fn elapsed_millis(&self) -> i64 {
        self.clock.now_millis() - self.started_at
    }

    pub fn poll_interval_ms(&self) -> i64 {
        self.poll_interval_ms
    }

    pub fn dependency_status(&self) -> Vec<DependencyStatus> {
        self.dependencies
            .iter()
            .map(|d| DependencyStatus {
                name: d.name.clone(),
                required: d.required,
                satisfied: d.satisfied,
            })
            .collect()
    }
}
