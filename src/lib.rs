//! openterm - host connection core of a remote terminal client
//!
//! This library manages the lifecycle of terminal sessions against remote
//! hosts: which hosts are known, which protocol session to build for each,
//! binding sessions to the display, and remembering favourite hosts across
//! restarts.
//!
//! ## Module Organization
//!
//! ### Core Functionality
//!
//! - [`terminal`] - Terminal session trait, factory registry, TCP transport
//! - [`connection`] - Connection manager state machine and its actor
//! - [`hosts`] - Ordered host registry
//! - [`favourites`] - Persisting favourite hosts
//! - [`models`] - Host value type
//! - [`mod@error`] - Error types and Result aliases
//!
//! ### Shell
//!
//! - [`app`] - Application shell: menu actions, console commands
//! - [`display`] - Display surface boundary and display preferences
//! - [`config`] - Config file loading and the preference store
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use openterm::{Application, HeadlessDisplay, MemoryPreferenceStore, TerminalFactoryRegistry};
//!
//! # async fn run() -> openterm::Result<()> {
//! let (config, _prefs_path) = openterm::init(None)?;
//! let factories = Arc::new(TerminalFactoryRegistry::with_builtin_terminals(
//!     config.connect_timeout(),
//! ));
//! let started = Application::start(
//!     config,
//!     MemoryPreferenceStore::new(),
//!     factories,
//!     HeadlessDisplay::new(),
//!     None,
//! );
//! started.app.auto_connect().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! A single actor task owns the connection manager. Network connects run on
//! spawned tasks and report back through the actor's queue tagged with the
//! session id, so a late result for a replaced session cannot clobber the
//! current one.

#[macro_use]
extern crate tracing;

pub mod app;
pub mod config;
pub mod connection;
pub mod display;
pub mod error;
pub mod favourites;
pub mod hosts;
pub mod models;
pub mod terminal;

use std::path::{Path, PathBuf};

// Re-exports for core functionality
pub use app::{Application, CommandOutcome, ConsoleCommand};
pub use config::{
    AppConfig, ConfigLoader, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore,
};
pub use connection::{ConnectionEvent, ConnectionHandle, ConnectionManager, ConnectionState};
pub use display::{DisplayPreferences, DisplaySurface, HeadlessDisplay};
pub use error::{Error, Result};
pub use favourites::{FavouritesStore, FAVOURITES_KEY};
pub use hosts::HostRegistry;
pub use models::Host;
pub use terminal::{SessionId, TcpTerminal, Terminal, TerminalFactoryRegistry};

/// The current version of openterm from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration and locate the preference store.
///
/// An explicit path must load cleanly. Without one the default locations
/// are searched and defaults are used when nothing usable is found.
///
/// # Errors
///
/// Returns an error if an explicit config file cannot be read or parsed,
/// or if the loaded values fail validation.
pub fn init(config_path: Option<&Path>) -> Result<(AppConfig, PathBuf)> {
    info!("Initializing {} v{}", NAME, VERSION);

    let mut loader = ConfigLoader::new();
    let config = match config_path {
        Some(path) => loader.load_explicit(path)?,
        None => loader.load()?,
    };

    let prefs_path = loader.prefs_path();
    debug!("Preferences stored at {}", prefs_path.display());
    Ok((config, prefs_path))
}
