//! Terminal Factory Registry
//!
//! Maps a protocol tag to a constructor for the matching [`Terminal`]
//! implementation. The registry is filled once at startup and shared
//! read-only afterwards; lookups of unknown tags fail closed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::tcp::TcpTerminal;
use super::Terminal;
use crate::error::{Error, Result};

/// Builds a fresh terminal instance on every call
pub type TerminalConstructor = Arc<dyn Fn() -> Arc<dyn Terminal> + Send + Sync>;

/// Protocol tags served by the built-in TCP transport terminal
pub const BUILTIN_PROTOCOLS: &[&str] = &["tn3270", "tn5250", "vt100", "telnet"];

/// Lookup from protocol tag to terminal constructor
#[derive(Clone, Default)]
pub struct TerminalFactoryRegistry {
    constructors: HashMap<String, TerminalConstructor>,
}

impl TerminalFactoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the stock protocol tags bound to [`TcpTerminal`]
    pub fn with_builtin_terminals(connect_timeout: Duration) -> Self {
        let mut registry = Self::new();
        for tag in BUILTIN_PROTOCOLS {
            let protocol = tag.to_string();
            registry.register(*tag, move || {
                Arc::new(TcpTerminal::new(protocol.clone(), connect_timeout)) as Arc<dyn Terminal>
            });
        }
        registry
    }

    /// Bind a protocol tag to a constructor.
    ///
    /// Registering the same tag twice replaces the earlier constructor.
    pub fn register<F>(&mut self, tag: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<dyn Terminal> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if self
            .constructors
            .insert(tag.clone(), Arc::new(constructor))
            .is_some()
        {
            warn!("Terminal constructor for '{}' replaced", tag);
        } else {
            debug!("Registered terminal constructor for '{}'", tag);
        }
    }

    /// Whether a constructor is bound to the tag
    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Registered protocol tags in sorted order
    pub fn protocol_types(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.constructors.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Construct a new terminal for the tag
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProtocolType`] when no constructor is bound.
    pub fn create(&self, tag: &str) -> Result<Arc<dyn Terminal>> {
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| Error::UnknownProtocolType {
                tag: tag.to_string(),
            })?;

        let terminal = constructor();
        debug!("Created {} terminal session {}", tag, terminal.id());
        Ok(terminal)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for TerminalFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalFactoryRegistry")
            .field("protocol_types", &self.protocol_types())
            .finish()
    }
}
