//! Init command implementation.
//!
//! Creates `config.json` interactively: server URL, auth token (pasted or
//! obtained by signing in to plex.tv) and the auto-delete choice.

use crate::models::config::{self, Config};
use crate::services::plex::PlexClient;
use crate::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select};
use std::path::Path;

/// Create a new config file.
pub async fn init(config_path: Option<&Path>) -> Result<()> {
    println!("{}", "[INIT] Create configuration".bold().cyan());
    println!();

    let path = config::resolve_config_path(config_path);
    if path.exists() {
        return Err(crate::Error::ConfigExists(path.display().to_string()));
    }
    println!("[INFO] Config will be written to: {}", path.display());
    println!();

    let server_url: String = Input::new()
        .with_prompt("Plex server URL")
        .default("https://plex.your-server.com".to_string())
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.starts_with("http://") || input.starts_with("https://") {
                Ok(())
            } else {
                Err("URL must start with http:// or https://")
            }
        })
        .interact_text()?;

    let method = Select::new()
        .with_prompt("Authentication")
        .items(&["Sign in to plex.tv", "Paste an existing token"])
        .default(0)
        .interact()?;

    let auth_token = if method == 0 {
        let username: String = Input::new().with_prompt("plex.tv username").interact_text()?;
        let password = Password::new().with_prompt("plex.tv password").interact()?;
        let token = PlexClient::sign_in(&username, &password).await?;
        println!("{} Signed in as {}", "[OK]".green(), username);
        token
    } else {
        Input::new().with_prompt("Plex auth token").interact_text()?
    };

    let auto_delete = Confirm::new()
        .with_prompt("Delete lower scored duplicates automatically?")
        .default(false)
        .interact()?;

    let prefilled = Config::prefilled(server_url.trim(), auth_token.trim(), auto_delete);
    config::create_config(&prefilled, &path)?;

    println!();
    println!("{} Config written to {}", "[OK]".green(), path.display());
    println!();
    println!("{}", "[Next Steps]".bold().cyan());
    println!("  Review PLEX.LIBRARIES and the score tables, then run:");
    println!("     {}", "plex-dupefinder find --dry-run".bold());

    Ok(())
}
