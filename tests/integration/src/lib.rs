//! Integration test utilities for the signal gateway
//!
//! This crate provides a scripted in-memory gateway for driving the session
//! client end to end without a network.

pub mod fixtures;

pub use fixtures::*;
pub use helpers::*;
