//! Plex Dupe Finder Library
//!
//! Finds duplicate media in a Plex library, scores every copy and removes
//! the lower-scoring ones.

pub mod cli;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
