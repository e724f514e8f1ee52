//! External service clients.

pub mod arr;
pub mod plex;
