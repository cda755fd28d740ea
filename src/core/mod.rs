//! Core business logic modules.

pub mod exporter;
pub mod selection;
pub mod sequencer;
pub mod tagger;
pub mod undo;
pub mod zones;
