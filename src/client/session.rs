//! Session lifecycle state and notifications.
//!
//! The HTTP wrapper never navigates anywhere on its own. When the backend
//! rejects our credentials it flips the session to `Anonymous` and broadcasts
//! [`SessionEvent::Expired`]; whatever shell embeds the client decides how to
//! send the user back to login.

// Author: kelexine (https://github.com/kelexine)

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of the event channel. Slow subscribers lag rather than block.
const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Login or registration succeeded and tokens were persisted.
    Authenticated,
    /// The user logged out; tokens are gone.
    LoggedOut,
    /// A request to `path` came back 401; tokens are gone.
    Expired { path: String },
}

/// Endpoints whose 401 means "wrong credentials" rather than an ended session.
const CREDENTIAL_PATHS: &[&str] = &["/auth/login/", "/auth/register/"];

impl SessionEvent {
    /// The line to show the user for this event, if any.
    ///
    /// Only an expiry of an established session asks the user to log in again;
    /// rejected credentials on the login and register endpoints get no notice
    /// because the failing command already reports them.
    pub fn expiry_notice(&self) -> Option<String> {
        match self {
            SessionEvent::Expired { path }
                if !CREDENTIAL_PATHS.iter().any(|p| path.starts_with(p)) =>
            {
                Some(format!(
                    "Session expired while calling {}. Run `fintrack login` to sign in again.",
                    path
                ))
            }
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SessionEvent::Authenticated => "authenticated",
            SessionEvent::LoggedOut => "logged_out",
            SessionEvent::Expired { .. } => "expired",
        }
    }
}

pub struct Session {
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(initial: SessionState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(initial),
            events,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Receive every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn begin_authentication(&self) {
        self.transition(SessionState::Authenticating);
    }

    pub(crate) fn authentication_failed(&self) {
        let mut state = self.state.write();
        if *state == SessionState::Authenticating {
            debug!("Authentication failed; session back to anonymous");
            *state = SessionState::Anonymous;
        }
    }

    pub(crate) fn authenticated(&self) {
        self.transition(SessionState::Authenticated);
        info!("Session authenticated");
        self.emit(SessionEvent::Authenticated);
    }

    pub(crate) fn logged_out(&self) {
        self.transition(SessionState::Anonymous);
        info!("Logged out");
        self.emit(SessionEvent::LoggedOut);
    }

    pub(crate) fn expired(&self, path: &str) {
        self.transition(SessionState::Anonymous);
        warn!("Session expired (401 from {})", path);
        self.emit(SessionEvent::Expired {
            path: path.to_string(),
        });
    }

    fn transition(&self, next: SessionState) {
        let mut state = self.state.write();
        if *state != next {
            debug!("Session {:?} -> {:?}", *state, next);
            *state = next;
        }
    }

    fn emit(&self, event: SessionEvent) {
        crate::metrics::record_session_event(event.label());
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

/// Forward expiry notices from `events` to `notify` until every sender is gone.
///
/// Events already queued when the session is dropped are still delivered, so a
/// shell can drop its services and await this to flush pending notices.
pub async fn watch_expiry<F>(mut events: broadcast::Receiver<SessionEvent>, mut notify: F)
where
    F: FnMut(String),
{
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(notice) = event.expiry_notice() {
                    notify(notice);
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Missed {} session events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
