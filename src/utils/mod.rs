//! Utility helpers.

pub mod format;
pub mod fs;
