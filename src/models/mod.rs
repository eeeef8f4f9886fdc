//! Core data models for openterm
//!
//! This module contains the value types shared by the connection core
//! and the application shell.

pub mod host;

// Re-exports for convenience
pub use host::{Host, HostKey};
