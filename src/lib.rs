//! Companion core for the 3Covery contrast-therapy device.
//!
//! The session state machine in [`session`] owns the lifecycle of a
//! therapy run (idle → running → paused → idle), the countdown, segment
//! progression, and live parameter overrides. Everything around it is a
//! collaborator: the program catalog, the session history, the mocked
//! device link, the sign-in flow, the learning content, and the scripted
//! chat helper. All I/O is simulated in-memory.

pub mod auth;
pub mod catalog;
pub mod content;
pub mod copilot;
pub mod device;
pub mod history;
pub mod models;
pub mod session;
pub mod settings;

use chrono::Utc;

use auth::AuthService;
use catalog::ProgramCatalog;
use device::DeviceManager;
use history::HistoryStore;
use session::SessionController;
use settings::PreferencesStore;

pub use session::{
    LiveAdjustment, ManualPlan, ProgramPlan, SessionError, SessionEvent, SessionMode, SessionPlan,
    SessionSnapshot, SessionState, SessionStatus,
};

/// Wires the stores and controllers together. Collaborators receive their
/// dependencies from here; nothing reaches for ambient globals.
pub struct CompanionApp {
    pub auth: AuthService,
    pub catalog: ProgramCatalog,
    pub device: DeviceManager,
    pub history: HistoryStore,
    pub session: SessionController,
    pub settings: PreferencesStore,
}

impl CompanionApp {
    pub fn new() -> Self {
        Self::with_history(HistoryStore::new())
    }

    /// Visitor mode: browse with the sample history and no paired device.
    pub fn demo() -> Self {
        Self::with_history(HistoryStore::seeded(history::sample_history(Utc::now())))
    }

    pub fn with_history(history: HistoryStore) -> Self {
        Self {
            auth: AuthService::new(),
            catalog: ProgramCatalog::new(),
            device: DeviceManager::new(),
            session: SessionController::new(history.clone()),
            history,
            settings: PreferencesStore::new(),
        }
    }
}

impl Default for CompanionApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn app_wires_session_and_history_together() {
        let app = CompanionApp::new();
        assert!(app.history.is_empty());

        app.session.start_manual(ManualPlan::default()).await.unwrap();
        app.session.stop(false).await.unwrap();

        assert_eq!(app.history.len(), 1);
        assert!(app.history.last_completed().is_some());
    }

    #[test]
    fn demo_mode_ships_sample_history() {
        let app = CompanionApp::demo();
        assert_eq!(app.history.len(), 7);
        assert!(app.history.last_completed().is_none());
    }
}
