//! External service clients.

pub mod azure;
pub mod provider;
