//! Radarr / Sonarr preflight checks.

use super::CheckResult;
use crate::models::config::{ArrConfig, Config};
use crate::services::arr::{ArrClient, ArrKind};

/// Check each enabled *arr service answers with its API key.
pub async fn check(config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();
    for (kind, arr) in [
        (ArrKind::Radarr, &config.scoring.radarr),
        (ArrKind::Sonarr, &config.scoring.sonarr),
    ] {
        if arr.enabled {
            results.push(check_service(kind, arr).await);
        }
    }
    results
}

async fn check_service(kind: ArrKind, arr: &ArrConfig) -> CheckResult {
    let name = kind.to_string();
    let key = name.to_uppercase();

    if arr.url.is_empty() || arr.api_key.is_empty() {
        return CheckResult::fail(
            &name,
            "url or api_key not configured",
            &format!("Set SCORING.{}.url and SCORING.{}.api_key in config.json", key, key),
        );
    }

    match ArrClient::new(kind, arr).system_status().await {
        Ok(status) => CheckResult::ok(&name, &format!("connected (v{})", status.version)),
        Err(e) => CheckResult::fail(
            &name,
            &e.to_string(),
            &format!("Check SCORING.{}.url and SCORING.{}.api_key", key, key),
        ),
    }
}
