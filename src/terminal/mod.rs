//! Terminal Sessions
//!
//! A [`Terminal`] is one protocol session: it is created fresh for every
//! connection attempt, attached to the display surface, connected, and
//! finally disconnected and released when a newer session replaces it.
//!
//! The screen protocol spoken over the connection is opaque to this crate.
//! Implementations only have to provide the connect/disconnect capability.
//!
//! - [`registry`] - protocol tag to constructor lookup
//! - [`tcp`] - built-in TCP transport terminal

pub mod registry;
pub mod tcp;

pub use registry::{TerminalConstructor, TerminalFactoryRegistry};
pub use tcp::TcpTerminal;

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

/// Identity of one terminal instance.
///
/// Completions of asynchronous connects are tagged with it so that a
/// result for a session that is no longer active can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Allocate a new random session id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First group is enough to tell sessions apart in logs
        let full = self.0.to_string();
        f.write_str(full.split('-').next().unwrap_or(&full))
    }
}

/// Capability set shared by every protocol session
///
/// Methods take `&self` because the connection manager keeps the owning
/// `Arc` while a spawned task drives `connect`. Implementations use
/// interior mutability for their connection state.
#[async_trait]
pub trait Terminal: Send + Sync + fmt::Debug {
    /// Identity of this instance
    fn id(&self) -> SessionId;

    /// Protocol tag this terminal was created for
    fn protocol_type(&self) -> &str;

    /// Open the session against a remote endpoint
    ///
    /// # Errors
    ///
    /// Returns an error describing the network or handshake failure.
    async fn connect(&self, address: &str, port: u16, use_encryption: bool) -> Result<()>;

    /// Close the session. Must be safe to call repeatedly or before connect.
    async fn disconnect(&self);

    /// Whether the session is currently open
    fn is_connected(&self) -> bool;
}
