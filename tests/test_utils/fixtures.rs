//! Test Fixtures
//!
//! Common hosts and configuration for testing

use openterm::config::{AppConfig, MemoryPreferenceStore};
use openterm::models::Host;

/// Non-favourite host
pub fn host(name: &str, port: u16, tag: &str) -> Host {
    Host::new(name, port, tag, false).unwrap()
}

/// Favourite host
pub fn favourite(name: &str, port: u16, tag: &str) -> Host {
    host(name, port, tag).with_favourite(true)
}

/// Configuration with auto-connect off unless a test turns it on
pub fn test_config() -> AppConfig {
    AppConfig {
        auto_connect: false,
        ..AppConfig::default()
    }
}

pub fn memory_prefs() -> MemoryPreferenceStore {
    MemoryPreferenceStore::new()
}
