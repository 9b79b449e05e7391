//! # berth-common
//!
//! Shared types, error definitions, and configuration models used across
//! the berth workspace.
//!
//! This crate is the leaf of the dependency graph — it depends on no other
//! internal crate and provides the foundational primitives that the engine
//! adapter and fixture crates build upon.

pub mod config;
pub mod error;
pub mod types;
