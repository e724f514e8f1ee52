//! Core business logic modules.

pub mod activity;
pub mod cleanup;
pub mod decision;
pub mod executor;
pub mod scanner;
pub mod scorer;
