//! Episode tracker models.
//!
//! Contains the stored record type plus the request and response bodies of
//! the HTTP API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message returned by a successful `update_episode` call.
pub const UPDATE_SUCCESS_MESSAGE: &str = "Episode updated successfully";

/// One user's progress on one show.
///
/// Stored as a single item keyed by (`username`, `tv_show`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Partition key.
    pub username: String,

    /// Sort key, stored under the `tv_show` attribute.
    #[serde(rename = "tv_show")]
    pub show_title: String,

    /// Current season (>= 1).
    pub season: u32,

    /// Current episode within the season (>= 1).
    pub episode: u32,

    /// Server time of the last write. Absent on hand-seeded items.
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,
}

impl EpisodeRecord {
    /// `last_updated` as RFC 3339, or an empty string when absent.
    pub fn last_updated_display(&self) -> String {
        self.last_updated
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_default()
    }
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    /// Accepts RFC 3339 and offset-less ISO 8601 (read as UTC). Anything
    /// else reads as absent instead of failing the whole item.
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Query parameters for `GET /api/show_episode`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowEpisodeParams {
    pub username: Option<String>,
    pub tv_show: Option<String>,
}

/// Query parameters for `GET /api/show_user`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowUserParams {
    pub username: Option<String>,
}

/// Body of `POST /api/update_episode`.
///
/// `season` and `episode` are kept as raw JSON so that both `3` and `"3"`
/// are accepted, while `3.5`, `"three"` and `true` are rejected with a 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEpisodeRequest {
    pub username: Option<String>,
    pub tv_show: Option<String>,
    pub season: Option<Value>,
    pub episode: Option<Value>,
}

/// An `UpdateEpisodeRequest` that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub username: String,
    pub show_title: String,
    pub season: u32,
    pub episode: u32,
}

impl UpdateEpisodeRequest {
    /// Validate presence and integer-ness of every field.
    pub fn validate(&self) -> Result<ValidatedUpdate, &'static str> {
        let username = non_blank(self.username.as_deref());
        let show_title = non_blank(self.tv_show.as_deref());

        let (Some(username), Some(show_title), Some(season), Some(episode)) = (
            username,
            show_title,
            self.season.as_ref().filter(|v| !v.is_null()),
            self.episode.as_ref().filter(|v| !v.is_null()),
        ) else {
            return Err("Username, tv_show, season, and episode are required");
        };

        let (Some(season), Some(episode)) = (parse_integer(season), parse_integer(episode)) else {
            return Err("Season and episode must be valid integers");
        };

        if season < 1 || episode < 1 {
            return Err("Season and episode must be positive integers");
        }

        let (Ok(season), Ok(episode)) = (u32::try_from(season), u32::try_from(episode)) else {
            return Err("Season and episode must be valid integers");
        };

        Ok(ValidatedUpdate {
            username: username.to_string(),
            show_title: show_title.to_string(),
            season,
            episode,
        })
    }
}

/// Returns the value unless it is absent or whitespace-only.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A single episode record as returned by `show_episode` and `show_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeResponse {
    pub username: String,
    pub tv_show: String,
    pub season: u32,
    pub episode: u32,
    pub last_updated: String,
}

impl From<EpisodeRecord> for EpisodeResponse {
    fn from(record: EpisodeRecord) -> Self {
        let last_updated = record.last_updated_display();
        EpisodeResponse {
            username: record.username,
            tv_show: record.show_title,
            season: record.season,
            episode: record.episode,
            last_updated,
        }
    }
}

/// One show in a `show_user` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShow {
    pub tv_show: String,
    pub season: u32,
    pub episode: u32,
    pub last_updated: String,
}

impl From<EpisodeRecord> for UserShow {
    fn from(record: EpisodeRecord) -> Self {
        let last_updated = record.last_updated_display();
        UserShow {
            tv_show: record.show_title,
            season: record.season,
            episode: record.episode,
            last_updated,
        }
    }
}

/// Response of `GET /api/show_user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserShowsResponse {
    pub username: String,
    pub shows: Vec<UserShow>,
    pub total_shows: usize,
}

/// Response of `POST /api/update_episode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEpisodeResponse {
    pub message: String,
    pub username: String,
    pub tv_show: String,
    pub season: u32,
    pub episode: u32,
    pub last_updated: String,
}

impl From<EpisodeRecord> for UpdateEpisodeResponse {
    fn from(record: EpisodeRecord) -> Self {
        let last_updated = record.last_updated_display();
        UpdateEpisodeResponse {
            message: UPDATE_SUCCESS_MESSAGE.to_string(),
            username: record.username,
            tv_show: record.show_title,
            season: record.season,
            episode: record.episode,
            last_updated,
        }
    }
}

/// Response of `GET /api/show_all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllEntriesResponse {
    pub entries: Vec<EpisodeResponse>,
    pub total_entries: usize,
}

/// Health check response.
///
/// Returned by the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy" or "unhealthy").
    pub status: String,

    /// Backend region.
    pub region: String,

    /// Backend table name.
    pub table: String,
}
