//! Generated script templates.

pub mod restart_script;
pub mod undo_script;
