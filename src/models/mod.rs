//! Data models.

pub mod activity;
pub mod config;
pub mod decision;
pub mod media;
