//! # Printer Module
//!
//! This module provides printer-family configurations.
//!
//! ## Modules
//!
//! - [`config`]: Per-family constants (line terminator, command prefix)

pub mod config;

pub use config::FamilyConfig;
