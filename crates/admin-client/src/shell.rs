//! Top-level view routing
//!
//! Decides which screen is shown from the authentication state and the
//! currently open module. Routing itself is a pure function of
//! [`ShellState`]; [`ViewShell`] owns the state and its transitions.

use tracing::{debug, info};

use coop_core::session::{Session, SessionStore};

use crate::error::Result;

/// Modules reachable from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Associates,
}

impl ModuleKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Associates => "Associates",
        }
    }
}

/// Screen to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    Login,
    Dashboard,
    Module(ModuleKind),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellState {
    /// Still restoring the persisted session
    pub loading: bool,
    pub session: Option<Session>,
    pub active_module: Option<ModuleKind>,
}

/// Map shell state to the screen to show
pub fn route(state: &ShellState) -> View {
    if state.loading {
        return View::Loading;
    }
    if state.session.is_none() {
        return View::Login;
    }
    match state.active_module {
        Some(module) => View::Module(module),
        None => View::Dashboard,
    }
}

pub struct ViewShell {
    sessions: SessionStore,
    state: ShellState,
}

impl ViewShell {
    pub fn new(sessions: SessionStore) -> Self {
        Self {
            sessions,
            state: ShellState {
                loading: true,
                ..Default::default()
            },
        }
    }

    /// Restore any persisted session and leave the loading state
    pub async fn bootstrap(&mut self) -> Result<View> {
        let restored = self.sessions.load().await;
        self.state.loading = false;

        let session = restored?;
        if let Some(session) = &session {
            debug!("Restored session for {}", session.user.username);
        }
        self.state.session = session;
        Ok(self.view())
    }

    pub fn on_login(&mut self, session: Session) -> View {
        info!("Opened dashboard for {}", session.user.display_name());
        self.state.loading = false;
        self.state.session = Some(session);
        self.state.active_module = None;
        self.view()
    }

    /// Clear the persisted session and return to the login screen
    pub async fn on_logout(&mut self) -> Result<View> {
        self.sessions.clear().await?;
        self.state.session = None;
        self.state.active_module = None;
        Ok(self.view())
    }

    /// Open a module; ignored while signed out
    pub fn open_module(&mut self, module: ModuleKind) -> View {
        if self.state.session.is_some() {
            self.state.active_module = Some(module);
        }
        self.view()
    }

    /// Return to the dashboard
    pub fn close_module(&mut self) -> View {
        self.state.active_module = None;
        self.view()
    }

    pub fn view(&self) -> View {
        route(&self.state)
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }
}
