//! # berth-engine
//!
//! Adapter over a Docker-compatible container engine's command-line
//! surface. Every operation is a synchronous subprocess invocation with
//! captured output, normalized into the workspace error taxonomy.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod cli;
pub mod image;
pub mod machine;

pub use cli::EngineCli;
