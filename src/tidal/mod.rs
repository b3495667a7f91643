use async_trait::async_trait;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod api;
pub mod client;

/// Failure of a call to the remote catalog, classified at the boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("TIDAL could not be reached")]
    Network,
    #[error("TIDAL rejected the credentials")]
    Unauthorized,
    #[error("TIDAL rate limit reached")]
    RateLimited,
    #[error("TIDAL answered with status {0}")]
    Status(u16),
    #[error("TIDAL answered with an unexpected payload")]
    Decode,
    #[error("TIDAL client is not configured")]
    Config,
}

impl RemoteError {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => RemoteError::Unauthorized,
            429 => RemoteError::RateLimited,
            _ => RemoteError::Status(status),
        }
    }
}

pub type RemoteResult<T> = error_stack::Result<T, RemoteError>;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawCreator {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Playlist exactly as TIDAL describes it; every field but the id may be absent.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawPlaylist {
    #[serde(rename = "uuid", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "title", default)]
    pub name: Option<String>,
    #[serde(rename = "numberOfTracks", default)]
    pub num_tracks: Option<u32>,
    #[serde(rename = "numberOfVideos", default)]
    pub num_videos: Option<u32>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<String>,
    #[serde(rename = "publicPlaylist", default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creator: Option<RawCreator>,
    #[serde(rename = "type", default)]
    pub playlist_type: Option<String>,
    #[serde(rename = "listenUrl", default)]
    pub listen_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawArtist {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawAlbum {
    #[serde(alias = "title", default)]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawTrack {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "title", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<RawArtist>,
    #[serde(default)]
    pub album: Option<RawAlbum>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(rename = "trackNumber", default)]
    pub track_num: Option<u32>,
    #[serde(default)]
    pub isrc: Option<String>,
}

/// Account of the authenticated user.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawUser {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "countryCode", default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(rename = "dateOfBirth", default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub newsletter: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawPlan {
    #[serde(rename = "type", default)]
    pub plan_type: Option<String>,
    #[serde(rename = "offlineGracePeriod", default)]
    pub offline_grace_period: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawSubscription {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subscription: Option<RawPlan>,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "validUntil", default)]
    pub valid_until: Option<String>,
    #[serde(rename = "highestSoundQuality", default)]
    pub highest_sound_quality: Option<String>,
    #[serde(rename = "paymentType", default)]
    pub payment_type: Option<String>,
    #[serde(rename = "premiumAccess", default)]
    pub premium_access: Option<bool>,
    #[serde(rename = "canGetTrial", default)]
    pub can_get_trial: Option<bool>,
    #[serde(rename = "paymentOverdue", default)]
    pub payment_overdue: Option<bool>,
}

/// Reference to a remote playlist that tracks can be read from or added to.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaylistHandle {
    pub id: String,
    pub name: String,
    pub etag: Option<String>,
}

/// The operations the engine needs from the remote catalog.
///
/// Every call is awaited before the next one is issued; implementations don't
/// retry and don't enforce timeouts of their own.
#[async_trait]
pub trait RemotePlaylistClient: Send + Sync {
    /// Id of the authenticated user, used to derive playlist ownership.
    fn user_id(&self) -> &str;

    /// Playlists created by the user plus the ones they favorited.
    async fn list_playlists(&self) -> RemoteResult<Vec<RawPlaylist>>;

    async fn get_playlist(&self, playlist_id: &str) -> RemoteResult<PlaylistHandle>;

    /// One page of tracks. A page shorter than `limit` is the last one.
    async fn list_tracks(
        &self,
        handle: &PlaylistHandle,
        limit: usize,
        offset: usize,
    ) -> RemoteResult<Vec<RawTrack>>;

    async fn create_playlist(&self, name: &str, description: &str)
        -> RemoteResult<PlaylistHandle>;

    async fn add_tracks(&self, handle: &PlaylistHandle, track_ids: &[String]) -> RemoteResult<()>;
}

fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

// TIDAL sends track and user ids as numbers and playlist ids as strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(value).ok_or_else(|| de::Error::custom("expected a string or numeric id"))
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(id_from_value))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tidal_track_payload() {
        let payload = r#"{
            "id": 77640617,
            "title": "Teardrop",
            "duration": 330,
            "trackNumber": 3,
            "isrc": "GBAAA9800311",
            "artist": { "id": 1, "name": "Massive Attack" },
            "album": { "id": 2, "title": "Mezzanine" }
        }"#;
        let track: RawTrack = serde_json::from_str(payload).unwrap();
        assert_eq!(track.id, "77640617");
        assert_eq!(track.name.as_deref(), Some("Teardrop"));
        assert_eq!(track.album.unwrap().name.as_deref(), Some("Mezzanine"));
        assert_eq!(track.track_num, Some(3));
    }

    #[test]
    fn test_parse_tidal_playlist_payload_with_missing_fields() {
        let payload = r#"{
            "uuid": "c5e5a1d1-0000-4f6a-9b5e-1f2d3c4b5a69",
            "title": "Late Night",
            "creator": { "id": 0 },
            "type": "EDITORIAL"
        }"#;
        let playlist: RawPlaylist = serde_json::from_str(payload).unwrap();
        assert_eq!(playlist.id, "c5e5a1d1-0000-4f6a-9b5e-1f2d3c4b5a69");
        assert_eq!(playlist.creator.unwrap().id.as_deref(), Some("0"));
        assert_eq!(playlist.num_tracks, None);
        assert_eq!(playlist.playlist_type.as_deref(), Some("EDITORIAL"));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(RemoteError::from_status(401), RemoteError::Unauthorized);
        assert_eq!(RemoteError::from_status(403), RemoteError::Unauthorized);
        assert_eq!(RemoteError::from_status(429), RemoteError::RateLimited);
        assert_eq!(RemoteError::from_status(502), RemoteError::Status(502));
    }
}
