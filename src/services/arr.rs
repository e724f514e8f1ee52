//! Radarr / Sonarr API client.
//!
//! Used to find the copy the *arr manager considers its own, so that copy
//! can win over the score based choice.

use crate::models::config::ArrConfig;
use crate::Result;
use serde::Deserialize;

/// Which *arr application a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrKind {
    Radarr,
    Sonarr,
}

impl std::fmt::Display for ArrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrKind::Radarr => write!(f, "Radarr"),
            ArrKind::Sonarr => write!(f, "Sonarr"),
        }
    }
}

/// Radarr / Sonarr API client.
pub struct ArrClient {
    kind: ArrKind,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

/// Radarr movie.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadarrMovie {
    movie_file: Option<ArrFile>,
}

/// Sonarr series.
#[derive(Debug, Deserialize)]
struct SonarrSeries {
    id: u64,
}

/// File tracked by Radarr or Sonarr.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrFile {
    relative_path: Option<String>,
}

/// System status response.
#[derive(Debug, Deserialize)]
pub struct SystemStatus {
    pub version: String,
}

impl ArrClient {
    /// Create a new client.
    pub fn new(kind: ArrKind, config: &ArrConfig) -> Self {
        Self {
            kind,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub fn kind(&self) -> ArrKind {
        self.kind
    }

    /// Build a request with the API key header.
    fn build_request(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("X-Api-Key", &self.api_key)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let resp = self.build_request(path).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(crate::Error::ArrApi {
                service: self.kind.to_string(),
                message: format!("GET {} returned {}", path, status),
            });
        }
        Ok(resp.json().await?)
    }

    /// Verify the service answers with the API key.
    pub async fn system_status(&self) -> Result<SystemStatus> {
        self.get_json("/api/v3/system/status", &[]).await
    }

    /// Relative file paths the service tracks for a title.
    ///
    /// `id` is a TMDB movie id for Radarr and a TVDB show id for Sonarr.
    pub async fn preferred_files(&self, id: u64) -> Result<Vec<String>> {
        match self.kind {
            ArrKind::Radarr => {
                let movies: Vec<RadarrMovie> = self
                    .get_json("/api/v3/movie", &[("tmdbId", id.to_string())])
                    .await?;
                Ok(movies
                    .into_iter()
                    .next()
                    .and_then(|m| m.movie_file)
                    .and_then(|f| f.relative_path)
                    .into_iter()
                    .collect())
            }
            ArrKind::Sonarr => {
                let series: Vec<SonarrSeries> = self
                    .get_json("/api/v3/series", &[("tvdbId", id.to_string())])
                    .await?;
                let Some(series) = series.into_iter().next() else {
                    return Ok(Vec::new());
                };
                let files: Vec<ArrFile> = self
                    .get_json("/api/v3/episodefile", &[("seriesId", series.id.to_string())])
                    .await?;
                Ok(files.into_iter().filter_map(|f| f.relative_path).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_radarr_movie_file() {
        let json = r#"[{"title": "Heat", "movieFile": {"relativePath": "Heat (1995) [1080p].mkv"}}]"#;
        let movies: Vec<RadarrMovie> = serde_json::from_str(json).unwrap();
        let path = movies[0].movie_file.as_ref().and_then(|f| f.relative_path.as_deref());
        assert_eq!(path, Some("Heat (1995) [1080p].mkv"));

        let missing: Vec<RadarrMovie> = serde_json::from_str(r#"[{"title": "Heat"}]"#).unwrap();
        assert!(missing[0].movie_file.is_none());
    }
}
