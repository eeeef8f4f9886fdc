//! Test Utilities and Mocks
//!
//! Scripted terminals, a recording display surface and host fixtures shared
//! by the contract and integration tests.

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_terminal;

// Re-exports for convenience
pub use fixtures::{favourite, host, memory_prefs, test_config};
pub use mock_display::RecordingDisplay;
pub use mock_terminal::{Behaviour, MockTerminal, MockTerminalFactory};
