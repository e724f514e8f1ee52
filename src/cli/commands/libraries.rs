//! Libraries command implementation.

use crate::services::plex::PlexClient;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// List the server's library sections.
pub async fn list_libraries(config_path: Option<&Path>) -> Result<()> {
    let Some((config, _)) = super::load_config(config_path)? else {
        return Ok(());
    };

    let client = PlexClient::new(&config.plex)?;
    let sections = client.sections().await?;

    println!();
    println!("{}", format!("Libraries on {}", client.base_url()).bold().cyan());
    println!();

    if sections.is_empty() {
        println!("  No library sections found");
        return Ok(());
    }

    println!("  {:<6} {:<10} {}", "Key".bold(), "Type".bold(), "Title".bold());
    for section in &sections {
        let configured = config.plex.libraries.contains(&section.title);
        let marker = if configured { " [configured]".green().to_string() } else { String::new() };
        println!("  {:<6} {:<10} {}{}", section.key, section.section_type, section.title, marker);
    }

    Ok(())
}
