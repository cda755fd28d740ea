//! Azfleet Library
//!
//! Operator tooling for Azure virtual machine fleets: bulk tagging with a
//! generated undo path, and zone-based disaster-recovery shutdown with a
//! generated restart script.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
