//! Data models.

pub mod config;
pub mod inventory;
pub mod shutdown;
pub mod tags;
