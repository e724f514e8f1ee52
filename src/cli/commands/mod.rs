//! CLI command implementations.

pub mod cleanup;
pub mod find;
pub mod init;
pub mod libraries;

use crate::models::config::{self, Config, ConfigLoad};
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Load the config with environment overrides applied.
///
/// Returns `None` when the file was upgraded with new options, which the
/// user should review before the next run.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Option<(Config, PathBuf)>> {
    let path = config::resolve_config_path(explicit);
    println!("[INFO] Loading config: {}", path.display());

    match config::load_config(&path)? {
        ConfigLoad::Ready(mut config) => {
            config.apply_env_overrides()?;
            Ok(Some((config, path)))
        }
        ConfigLoad::Upgraded { added } => {
            println!("{}", "[CONFIG] New options were added to your config:".bold().yellow());
            for entry in &added {
                println!("  + {}", entry);
            }
            println!();
            println!("Please check {} and run again.", path.display().to_string().bold());
            Ok(None)
        }
    }
}
