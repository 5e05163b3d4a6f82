//! Feature gating for optional-subsystem entry points.
//!
//! Some deployments carry an optional local-leaderboard subsystem that
//! wants a word before the authoritative progress-update and session-start
//! calls go out (optimistic local mutation, prefetch). Instead of patching
//! shared function slots at call time, the composition happens exactly once
//! when the session is wired up: [`GatedHooks`] decorates a base
//! [`SessionHooks`] with an optional [`GateExtension`]. With no extension
//! it is a transparent passthrough, and the base result is always returned
//! unchanged. Because wiring is the only place a gate is built, the
//! double-wrap hazard of runtime patching cannot occur.

use crate::error::Result;

/// The gated entry points.
pub trait SessionHooks {
    /// Report a completed seal to the authoritative store.
    fn update_progress(&mut self, participant_id: &str, seal_index: u8) -> Result<()>;

    /// Begin a session against the authoritative store.
    fn start_session(&mut self, session_id: &str) -> Result<()>;
}

/// Optional-subsystem behavior that runs before each base entry point.
///
/// Extensions are best-effort: they get no veto and no view of the base
/// result, and must swallow their own failures.
pub trait GateExtension {
    fn before_update_progress(&mut self, participant_id: &str, seal_index: u8);
    fn before_start_session(&mut self, session_id: &str);
}

/// Base hooks decorated with an optional extension.
pub struct GatedHooks<H, E> {
    base: H,
    extension: Option<E>,
}

impl<H: SessionHooks, E: GateExtension> GatedHooks<H, E> {
    pub fn new(base: H, extension: Option<E>) -> Self {
        Self { base, extension }
    }

    pub fn has_extension(&self) -> bool {
        self.extension.is_some()
    }
}

impl<H: SessionHooks, E: GateExtension> SessionHooks for GatedHooks<H, E> {
    fn update_progress(&mut self, participant_id: &str, seal_index: u8) -> Result<()> {
        if let Some(extension) = &mut self.extension {
            extension.before_update_progress(participant_id, seal_index);
        }
        self.base.update_progress(participant_id, seal_index)
    }

    fn start_session(&mut self, session_id: &str) -> Result<()> {
        if let Some(extension) = &mut self.extension {
            extension.before_start_session(session_id);
        }
        self.base.start_session(session_id)
    }
}
