// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # scgen-observability
//!
//! Logging infrastructure shared by the scgen crates and tools.
//!
//! Provides consistent `tracing` setup with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: Daily-rotated log files under a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;
pub mod retention;

pub use cli::*;
pub use init::*;
pub use retention::cleanup_old_logs;

/// Known scgen crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "scgen",
    "scgen-kernel",
    "scgen-device",
    "scgen-config",
    "scgen-observability",
];

/// `tracing` target of a crate: package names use dashes, module paths underscores
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
