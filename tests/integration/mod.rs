//! Integration tests for screenlog
//!
//! These tests drive the scheduler, the control surface and the binary
//! together against a scripted screen source.

#[path = "../common/mod.rs"]
pub mod common;

pub mod cli;
pub mod session_flow;
