//! Connection Manager
//!
//! Sequences one connection attempt: resolve a terminal for the host's
//! protocol tag, bind it to the display, drive `connect`, and record the
//! outcome. The network part runs outside the manager so it can be driven
//! from the [`actor`] without blocking other commands; every outcome is
//! tagged with the session it belongs to so late results can be dropped.
//!
//! ```text
//!  Unattached ──connect──▶ Connecting ──ok──▶ Connected ──disconnect──▶ Unattached
//!                              │
//!                              └──err──▶ FailedConnect ──connect──▶ Connecting
//! ```

pub mod actor;

pub use actor::{spawn, ConnectionEvent, ConnectionHandle};

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::display::{DisplayPreferences, DisplaySurface};
use crate::error::{Error, Result};
use crate::models::Host;
use crate::terminal::{SessionId, Terminal, TerminalFactoryRegistry};

/// Where the manager is in the connection lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No live session
    #[default]
    Unattached,
    /// A terminal is bound and its connect is in flight
    Connecting { host: Host, session: SessionId },
    /// The active terminal is connected
    Connected { host: Host, session: SessionId },
    /// The last attempt failed; the failed terminal (if one was created)
    /// stays bound to the display
    FailedConnect {
        host: Host,
        session: Option<SessionId>,
        reason: String,
    },
}

impl ConnectionState {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Unattached => "unattached",
            ConnectionState::Connecting { .. } => "connecting",
            ConnectionState::Connected { .. } => "connected",
            ConnectionState::FailedConnect { .. } => "failed",
        }
    }

    pub fn host(&self) -> Option<&Host> {
        match self {
            ConnectionState::Unattached => None,
            ConnectionState::Connecting { host, .. }
            | ConnectionState::Connected { host, .. }
            | ConnectionState::FailedConnect { host, .. } => Some(host),
        }
    }

    pub fn session(&self) -> Option<SessionId> {
        match self {
            ConnectionState::Unattached => None,
            ConnectionState::Connecting { session, .. }
            | ConnectionState::Connected { session, .. } => Some(*session),
            ConnectionState::FailedConnect { session, .. } => *session,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Unattached => write!(f, "Not connected"),
            ConnectionState::Connecting { host, .. } => write!(f, "Connecting to {}", host),
            ConnectionState::Connected { host, .. } => write!(f, "Connected to {}", host),
            ConnectionState::FailedConnect { host, reason, .. } => {
                write!(f, "Failed to connect to {}: {}", host, reason)
            }
        }
    }
}

/// The terminal the manager currently owns
#[derive(Debug, Clone)]
pub struct ActiveSession {
    terminal: Arc<dyn Terminal>,
    host: Host,
    connected_at: Option<DateTime<Utc>>,
}

impl ActiveSession {
    pub fn terminal(&self) -> &Arc<dyn Terminal> {
        &self.terminal
    }

    pub fn id(&self) -> SessionId {
        self.terminal.id()
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// When the last successful connect completed
    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.connected_at
    }
}

/// Point-in-time view of the manager for status output
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSnapshot {
    pub state: ConnectionState,
    pub title: String,
    pub session: Option<SessionId>,
    pub connected_at: Option<DateTime<Utc>>,
}

/// A connect that has been set up and not yet driven
#[derive(Debug)]
pub struct PendingConnect {
    host: Host,
    terminal: Arc<dyn Terminal>,
}

impl PendingConnect {
    pub fn session(&self) -> SessionId {
        self.terminal.id()
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Perform the network connect. Touches nothing but the terminal.
    pub async fn run(self) -> ConnectOutcome {
        let result = self
            .terminal
            .connect(
                self.host.host_name(),
                self.host.port(),
                self.host.is_encryption(),
            )
            .await;

        ConnectOutcome {
            session: self.terminal.id(),
            host: self.host,
            terminal: self.terminal,
            result,
        }
    }
}

/// Result of [`PendingConnect::run`], tagged with its session
#[derive(Debug)]
pub struct ConnectOutcome {
    pub session: SessionId,
    pub host: Host,
    terminal: Arc<dyn Terminal>,
    pub result: Result<()>,
}

/// Owns the active terminal and the display it is bound to
pub struct ConnectionManager<D: DisplaySurface> {
    factories: Arc<TerminalFactoryRegistry>,
    display: D,
    active: Option<ActiveSession>,
    state: ConnectionState,
    product_name: String,
    title: String,
}

impl<D: DisplaySurface> ConnectionManager<D> {
    pub fn new(
        factories: Arc<TerminalFactoryRegistry>,
        display: D,
        product_name: impl Into<String>,
    ) -> Self {
        Self {
            factories,
            display,
            active: None,
            state: ConnectionState::Unattached,
            product_name: product_name.into(),
            title: String::new(),
        }
    }

    /// Create and bind a terminal for `host`; the caller drives the
    /// returned [`PendingConnect`] and hands its outcome back to
    /// [`ConnectionManager::complete_connect`].
    ///
    /// The previously bound terminal is released but not disconnected here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProtocolType`] if no terminal is registered
    /// for the host's protocol tag.
    pub fn begin_connect(&mut self, host: &Host) -> Result<PendingConnect> {
        info!("Connecting to {}", host);
        self.set_title(&format!("Connecting to {}", host));

        let terminal = match self.factories.create(host.protocol_type()) {
            Ok(terminal) => terminal,
            Err(e) => {
                error!("Cannot connect to {}: {}", host, e);
                self.state = ConnectionState::FailedConnect {
                    host: host.clone(),
                    session: None,
                    reason: e.user_message(),
                };
                return Err(e);
            }
        };

        self.display.set_terminal(Arc::downgrade(&terminal));
        if let Some(previous) = self.active.replace(ActiveSession {
            terminal: Arc::clone(&terminal),
            host: host.clone(),
            connected_at: None,
        }) {
            debug!("Session {} replaced by {}", previous.id(), terminal.id());
        }

        self.state = ConnectionState::Connecting {
            host: host.clone(),
            session: terminal.id(),
        };

        Ok(PendingConnect {
            host: host.clone(),
            terminal,
        })
    }

    /// Apply the outcome of a connect.
    ///
    /// Outcomes for anything other than the session currently connecting
    /// are discarded; a discarded session that did connect is closed again.
    ///
    /// # Errors
    ///
    /// - [`Error::Superseded`] for a discarded outcome
    /// - [`Error::ConnectionFailed`] when the connect itself failed
    pub async fn complete_connect(&mut self, outcome: ConnectOutcome) -> Result<()> {
        let ConnectOutcome {
            session,
            host,
            terminal,
            result,
        } = outcome;

        let current = matches!(
            &self.state,
            ConnectionState::Connecting { session: s, .. } if *s == session
        );
        if !current {
            warn!(
                "Discarding stale connect result for session {} ({})",
                session, host
            );
            if result.is_ok() {
                terminal.disconnect().await;
            }
            return Err(Error::Superseded {
                host: host.to_string(),
            });
        }

        match result {
            Ok(()) => {
                if let Some(active) = self.active.as_mut() {
                    active.connected_at = Some(Utc::now());
                }
                info!("Session {} connected to {}", session, host);
                self.set_title(&format!("Connected to {}", host));
                self.state = ConnectionState::Connected { host, session };
                Ok(())
            }
            Err(e) => {
                let err = match e {
                    Error::ConnectionFailed { .. } => e,
                    other => Error::ConnectionFailed {
                        host: host.to_string(),
                        reason: other.user_message(),
                    },
                };
                error!("Session {}: {}", session, err);
                self.state = ConnectionState::FailedConnect {
                    host,
                    session: Some(session),
                    reason: err.user_message(),
                };
                Err(err)
            }
        }
    }

    /// Connect to `host`, waiting for the outcome
    pub async fn connect(&mut self, host: &Host) -> Result<()> {
        let pending = self.begin_connect(host)?;
        let outcome = pending.run().await;
        self.complete_connect(outcome).await
    }

    /// Disconnect the active terminal. Does nothing without one.
    pub async fn disconnect(&mut self) {
        let terminal = match &self.active {
            Some(active) => Arc::clone(&active.terminal),
            None => return,
        };

        if self.state != ConnectionState::Unattached {
            info!("Disconnecting session {}", terminal.id());
        }
        terminal.disconnect().await;

        if let Some(active) = self.active.as_mut() {
            active.connected_at = None;
        }
        self.state = ConnectionState::Unattached;
        self.set_not_connected_title();
    }

    /// Disconnect and release the active terminal.
    ///
    /// Returns whether the process should exit afterwards.
    pub async fn shutdown(&mut self, force_process_exit: bool) -> bool {
        self.disconnect().await;
        if let Some(active) = self.active.take() {
            debug!("Released session {}", active.id());
        }
        info!(
            "Connection manager shut down (process exit: {})",
            force_process_exit
        );
        force_process_exit
    }

    pub fn set_not_connected_title(&mut self) {
        self.set_title("Not Connected");
    }

    fn set_title(&mut self, status: &str) {
        self.title = format!("{} - {}", self.product_name, status);
        self.display.set_title(&self.title);
    }

    /// Push new preferences to the display and redraw
    pub fn apply_preferences(&mut self, preferences: &DisplayPreferences) {
        self.display.apply_preferences(preferences);
        self.display.refresh();
    }

    pub fn refresh(&mut self) {
        self.display.refresh();
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn active_session(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            state: self.state.clone(),
            title: self.title.clone(),
            session: self.active.as_ref().map(ActiveSession::id),
            connected_at: self.active.as_ref().and_then(|a| a.connected_at),
        }
    }
}

impl<D: DisplaySurface> fmt::Debug for ConnectionManager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state)
            .field("title", &self.title)
            .field("session", &self.active.as_ref().map(ActiveSession::id))
            .finish()
    }
}
