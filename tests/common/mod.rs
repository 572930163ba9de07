//! Shared test utilities for screenlog
//!
//! - A scripted screen source with a fixed number of successful grabs
//! - Scheduler fixtures rooted in a temporary directory
//! - TUI terminal testing helpers

pub mod fixtures;
pub mod screen;
pub mod terminal;
