//! Host Model
//!
//! Describes one remote endpoint a terminal session can be opened against.
//! Hosts are values: once placed in the host registry they are never
//! changed in place, the registry is replaced as a whole instead.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Protocol tags are registry keys such as `tn3270` or `vt100`
static PROTOCOL_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+-]*$").expect("valid protocol tag regex"));

/// A configured remote endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    host_name: String,
    port: u16,
    protocol_type: String,
    encryption: bool,
    favourite: bool,
}

/// The fields that decide whether two hosts are the same favourite entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostKey {
    pub host_name: String,
    pub port: u16,
    pub protocol_type: String,
}

impl Host {
    /// Create a validated, non-favourite host.
    ///
    /// The protocol tag is only checked for shape here. Whether a terminal
    /// is registered for it is decided when a connection is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHost`] if the host name is blank, the port is
    /// zero or the protocol tag is empty or malformed.
    pub fn new(
        host_name: impl Into<String>,
        port: u16,
        protocol_type: impl Into<String>,
        encryption: bool,
    ) -> Result<Self> {
        let host_name = host_name.into().trim().to_string();
        let protocol_type = protocol_type.into().trim().to_string();

        if host_name.is_empty() {
            return Err(Error::InvalidHost {
                field: "host name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if host_name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidHost {
                field: "host name".to_string(),
                reason: format!("'{}' contains whitespace", host_name),
            });
        }

        if port == 0 {
            return Err(Error::InvalidHost {
                field: "port".to_string(),
                reason: "must be between 1 and 65535".to_string(),
            });
        }

        if !PROTOCOL_TAG_PATTERN.is_match(&protocol_type) {
            return Err(Error::InvalidHost {
                field: "protocol type".to_string(),
                reason: format!("'{}' is not a valid protocol tag", protocol_type),
            });
        }

        Ok(Self {
            host_name,
            port,
            protocol_type,
            encryption,
            favourite: false,
        })
    }

    /// Return a copy of this host with the favourite flag set
    pub fn with_favourite(mut self, favourite: bool) -> Self {
        self.favourite = favourite;
        self
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Registry key selecting the terminal implementation
    pub fn protocol_type(&self) -> &str {
        &self.protocol_type
    }

    pub fn is_encryption(&self) -> bool {
        self.encryption
    }

    pub fn is_favourite(&self) -> bool {
        self.favourite
    }

    /// Identity of this host as a favourite entry
    pub fn key(&self) -> HostKey {
        HostKey {
            host_name: self.host_name.clone(),
            port: self.port,
            protocol_type: self.protocol_type.clone(),
        }
    }

    /// Whether both hosts describe the same favourite entry.
    ///
    /// Encryption and favourite flags are ignored.
    pub fn same_entry(&self, other: &Host) -> bool {
        self.host_name == other.host_name
            && self.port == other.port
            && self.protocol_type == other.protocol_type
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.host_name, self.port, self.protocol_type)?;
        if self.encryption {
            write!(f, " [TLS]")?;
        }
        Ok(())
    }
}
