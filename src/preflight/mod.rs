//! Preflight checks module.

mod arr;
mod plex;

use crate::models::config::Config;
use crate::services::plex::PlexClient;
use crate::Result;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Run all preflight checks.
pub async fn run_preflight_checks(config: &Config, client: &PlexClient) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    let connection = plex::check_connection(client).await;
    let connected = connection.success;
    results.push(connection);

    // Library lookups are pointless without a working connection.
    if connected {
        results.extend(plex::check_libraries(client, &config.plex.libraries).await);
    }

    results.extend(arr::check(config).await);

    Ok(results)
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        let tag = if result.success { "[OK]".green() } else { "[FAIL]".red() };
        println!("{} {}: {}", tag, result.name.bold(), result.message);
        if let Some(hint) = result.hint.as_deref().filter(|_| !result.success) {
            println!("  {} {}", "->".yellow(), hint);
        }
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        println!();
        println!("{} of {} checks failed", failed, results.len());
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_passed() {
        let mut results = vec![CheckResult::ok("Plex", "connected")];
        assert!(all_passed(&results));
        results.push(CheckResult::fail("Radarr", "connection failed", "Check SCORING.RADARR.url"));
        assert!(!all_passed(&results));
        assert_eq!(results[1].hint.as_deref(), Some("Check SCORING.RADARR.url"));
    }
}
