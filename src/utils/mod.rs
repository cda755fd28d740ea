//! Utility helpers.

pub mod fs;
pub mod runlog;
pub mod shell;
