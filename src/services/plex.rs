//! Plex Media Server API client.

use crate::models::config::PlexConfig;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

const PLEX_TV_SIGN_IN_URL: &str = "https://plex.tv/users/sign_in.json";
const PRODUCT_NAME: &str = "plex-dupefinder";
/// Reloading with `checkFiles=1` makes Plex stat every part.
const REQUEST_TIMEOUT_SECS: u64 = 90;

/// Plex search type for movies.
pub const SEARCH_TYPE_MOVIE: u8 = 1;
/// Plex search type for episodes.
pub const SEARCH_TYPE_EPISODE: u8 = 4;
/// Plex stream type for audio streams.
pub const STREAM_TYPE_AUDIO: u32 = 2;

/// Plex API client.
pub struct PlexClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

/// Every Plex JSON response is wrapped in a `MediaContainer`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

/// Library sections response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SectionContainer {
    #[serde(rename = "Directory")]
    directories: Vec<Section>,
}

/// Library section.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub section_type: String,
}

impl Section {
    /// Search type used to look for duplicates in this section.
    pub fn search_type(&self) -> u8 {
        if self.section_type == "show" {
            SEARCH_TYPE_EPISODE
        } else {
            SEARCH_TYPE_MOVIE
        }
    }
}

/// Metadata list response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetadataContainer {
    #[serde(rename = "Metadata")]
    pub metadata: Vec<PlexItem>,
}

/// Movie or episode metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlexItem {
    pub rating_key: String,
    pub key: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    pub grandparent_title: Option<String>,
    pub grandparent_rating_key: Option<String>,
    pub parent_index: Option<u32>,
    pub index: Option<u32>,
    #[serde(rename = "Guid")]
    pub guids: Vec<PlexGuid>,
    #[serde(rename = "Media")]
    pub media: Vec<PlexMedia>,
}

/// External GUID (e.g. `tmdb://603`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlexGuid {
    pub id: String,
}

/// A single copy of an item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlexMedia {
    pub id: u64,
    pub duration: Option<u64>,
    pub bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub audio_channels: Option<u32>,
    pub audio_codec: Option<String>,
    pub video_codec: Option<String>,
    pub video_resolution: Option<String>,
    #[serde(deserialize_with = "flexible_bool")]
    pub is_optimized_version: Option<bool>,
    #[serde(rename = "Part")]
    pub parts: Vec<PlexPart>,
}

/// A file making up a media.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlexPart {
    pub id: u64,
    pub file: String,
    pub size: Option<u64>,
    /// Only reported when the item was fetched with `checkFiles=1`.
    #[serde(deserialize_with = "flexible_bool")]
    pub exists: Option<bool>,
    #[serde(rename = "Stream")]
    pub streams: Vec<PlexStream>,
}

/// Audio, video or subtitle stream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlexStream {
    pub stream_type: u32,
    pub channels: Option<u32>,
    pub title: Option<String>,
    pub display_title: Option<String>,
}

/// plex.tv sign-in response.
#[derive(Debug, Deserialize)]
struct SignInResponse {
    user: SignInUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInUser {
    auth_token: String,
}

/// Plex emits flags as booleans, integers or strings depending on endpoint.
fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Bool(b)) => Some(b),
        Some(Raw::Int(i)) => Some(i != 0),
        Some(Raw::Str(s)) => Some(matches!(s.to_lowercase().as_str(), "1" | "true")),
    })
}

impl PlexItem {
    /// Numeric id from a GUID with the given scheme (`tmdb`, `tvdb`).
    pub fn guid_id(&self, scheme: &str) -> Option<u64> {
        let prefix = format!("{}://", scheme);
        self.guids.iter().find_map(|guid| {
            let rest = guid.id.strip_prefix(&prefix)?;
            let raw = rest.split('?').next().unwrap_or(rest);
            match raw.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!("Failed to extract {} id from guid: {}", scheme, guid.id);
                    None
                }
            }
        })
    }

    /// All part files of all media.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.media
            .iter()
            .flat_map(|m| m.parts.iter())
            .map(|p| p.file.as_str())
    }
}

impl PlexClient {
    /// Create a new Plex client.
    pub fn new(config: &PlexConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: config.server_url.trim_end_matches('/').to_string(),
            token: config.auth_token.clone(),
            client,
        })
    }

    /// Server URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a request with the token and JSON accept header.
    fn build_request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Accept", "application/json")
            .header("X-Plex-Token", &self.token)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let resp = self
            .build_request(reqwest::Method::GET, &url)
            .query(query)
            .send()
            .await
            .map_err(|e| crate::Error::PlexUnreachable(format!("{}: {}", self.base_url, e)))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(crate::Error::PlexUnauthorized);
        }
        if !status.is_success() {
            return Err(crate::Error::PlexApi(format!("GET {} returned {}", path, status)));
        }

        let envelope: Envelope<T> = resp.json().await?;
        Ok(envelope.media_container)
    }

    /// Verify the server answers and accepts the token.
    pub async fn check_connection(&self) -> Result<()> {
        let _: serde_json::Value = self.get_json("/identity", &[]).await?;
        // /identity is public; a section listing proves the token works.
        let _ = self.sections().await?;
        Ok(())
    }

    /// List library sections.
    pub async fn sections(&self) -> Result<Vec<Section>> {
        let container: SectionContainer = self.get_json("/library/sections", &[]).await?;
        Ok(container.directories)
    }

    /// Look up a library section by its title.
    pub async fn section_by_title(&self, title: &str) -> Result<Section> {
        self.sections()
            .await?
            .into_iter()
            .find(|s| s.title == title)
            .ok_or_else(|| crate::Error::LibraryNotFound(title.to_string()))
    }

    /// Items Plex flags as having more than one copy.
    pub async fn duplicates(&self, section: &Section) -> Result<Vec<PlexItem>> {
        let path = format!("/library/sections/{}/all", urlencoding::encode(&section.key));
        let search_type = section.search_type().to_string();
        let container: MetadataContainer = self
            .get_json(&path, &[("type", search_type.as_str()), ("duplicate", "1")])
            .await?;
        Ok(container.metadata)
    }

    /// Full metadata for one item, including streams and GUIDs.
    ///
    /// With `check_files` Plex re-checks that every part still exists.
    pub async fn metadata(&self, rating_key: &str, check_files: bool) -> Result<PlexItem> {
        let path = format!("/library/metadata/{}", urlencoding::encode(rating_key));
        let mut query = vec![("includeGuids", "1")];
        if check_files {
            query.push(("checkFiles", "1"));
        }

        let container: MetadataContainer = self.get_json(&path, &query).await?;
        container.metadata.into_iter().next().ok_or_else(|| {
            crate::Error::PlexApi(format!("No metadata returned for item {}", rating_key))
        })
    }

    /// Delete a single media (copy) of an item.
    ///
    /// Returns whether Plex accepted the request.
    pub async fn delete_media(&self, show_key: &str, media_id: u64) -> Result<bool> {
        let url = self.url(&format!("{}/media/{}", show_key, media_id));
        tracing::debug!("Sending DELETE request to {:?}", url);

        let resp = self.build_request(reqwest::Method::DELETE, &url).send().await?;
        let status = resp.status();
        if !delete_accepted(status) {
            tracing::warn!("DELETE {} returned {}", url, status);
        }
        Ok(delete_accepted(status))
    }

    /// Exchange plex.tv credentials for an auth token.
    pub async fn sign_in(username: &str, password: &str) -> Result<String> {
        let client = reqwest::Client::new();
        let resp = client
            .post(PLEX_TV_SIGN_IN_URL)
            .basic_auth(username, Some(password))
            .header("Accept", "application/json")
            .header("X-Plex-Client-Identifier", uuid::Uuid::new_v4().to_string())
            .header("X-Plex-Product", PRODUCT_NAME)
            .header("X-Plex-Version", env!("CARGO_PKG_VERSION"))
            .header("X-Plex-Device-Name", whoami::devicename())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(crate::Error::SignInFailed(format!("plex.tv returned {}", status)));
        }

        let body: SignInResponse = resp.json().await?;
        Ok(body.user.auth_token)
    }
}

/// Plex answers an accepted media deletion with 200; anything else is a refusal.
fn delete_accepted(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUPLICATE_JSON: &str = r#"{
        "MediaContainer": {
            "size": 1,
            "Metadata": [{
                "ratingKey": "101",
                "key": "/library/metadata/101",
                "type": "movie",
                "title": "Heat",
                "Guid": [{"id": "imdb://tt0113277"}, {"id": "tmdb://949?lang=en"}],
                "Media": [{
                    "id": 5001,
                    "duration": 10200000,
                    "bitrate": 9000,
                    "width": 1920,
                    "height": 1080,
                    "audioChannels": 6,
                    "audioCodec": "ac3",
                    "videoCodec": "h264",
                    "videoResolution": "1080",
                    "isOptimizedVersion": 1,
                    "Part": [{"id": 7001, "file": "/movies/Heat (1995)/Heat.mkv", "size": 123, "exists": "1"}]
                }]
            }]
        }
    }"#;

    #[test]
    fn test_parse_metadata_container() {
        let envelope: Envelope<MetadataContainer> = serde_json::from_str(DUPLICATE_JSON).unwrap();
        let item = &envelope.media_container.metadata[0];

        assert_eq!(item.rating_key, "101");
        assert_eq!(item.media[0].is_optimized_version, Some(true));
        assert_eq!(item.media[0].parts[0].exists, Some(true));
        assert_eq!(item.guid_id("tmdb"), Some(949));
        assert_eq!(item.guid_id("tvdb"), None);
    }

    #[test]
    fn test_delete_accepted_only_on_ok() {
        assert!(delete_accepted(reqwest::StatusCode::OK));
        assert!(!delete_accepted(reqwest::StatusCode::NO_CONTENT));
        assert!(!delete_accepted(reqwest::StatusCode::ACCEPTED));
        assert!(!delete_accepted(reqwest::StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_section_search_type() {
        let show = Section {
            key: "2".to_string(),
            title: "TV".to_string(),
            section_type: "show".to_string(),
        };
        assert_eq!(show.search_type(), SEARCH_TYPE_EPISODE);
    }
}
