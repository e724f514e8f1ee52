//! Plex server preflight checks.

use super::CheckResult;
use crate::services::plex::PlexClient;
use crate::Error;

/// Check the server answers and accepts the token.
pub async fn check_connection(client: &PlexClient) -> CheckResult {
    match client.check_connection().await {
        Ok(()) => CheckResult::ok("Plex server", &format!("connected to {}", client.base_url())),
        Err(Error::PlexUnauthorized) => CheckResult::fail(
            "Plex server",
            "auth token rejected",
            "Update PLEX.AUTH_TOKEN in config.json or re-run `plex-dupefinder init`",
        ),
        Err(e) => CheckResult::fail(
            "Plex server",
            &e.to_string(),
            "Check PLEX.SERVER_URL in config.json and that the server is running",
        ),
    }
}

/// Check every configured library exists on the server.
pub async fn check_libraries(client: &PlexClient, libraries: &[String]) -> Vec<CheckResult> {
    if libraries.is_empty() {
        return vec![CheckResult::fail(
            "Libraries",
            "no libraries configured",
            "Add library names to PLEX.LIBRARIES (see `plex-dupefinder libraries`)",
        )];
    }

    let sections = match client.sections().await {
        Ok(sections) => sections,
        Err(e) => {
            return vec![CheckResult::fail(
                "Libraries",
                &e.to_string(),
                "Check the Plex server is reachable",
            )]
        }
    };

    libraries
        .iter()
        .map(|library| {
            let name = format!("Library {:?}", library);
            match sections.iter().find(|s| &s.title == library) {
                Some(section) => CheckResult::ok(
                    &name,
                    &format!("found ({}, key {})", section.section_type, section.key),
                ),
                None => CheckResult::fail(
                    &name,
                    "not found on server",
                    "Library names are case sensitive; run `plex-dupefinder libraries`",
                ),
            }
        })
        .collect()
}
