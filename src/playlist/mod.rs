use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::tidal::RawPlaylist;
use crate::utils::format_duration;

pub mod cache;
pub mod track;

const EDITORIAL_TYPE: &str = "EDITORIAL";

/// How a playlist relates to the current user. Sorting by type compares the
/// displayed labels.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum PlaylistType {
    #[strum(to_string = "OWNED")]
    Owned,
    #[strum(to_string = "FAVORITE")]
    Favorite,
    #[strum(to_string = "EDITORIAL")]
    Editorial,
}

impl PlaylistType {
    pub fn derive(is_owned: bool, remote_type: Option<&str>) -> Self {
        if is_owned {
            PlaylistType::Owned
        } else if remote_type == Some(EDITORIAL_TYPE) {
            PlaylistType::Editorial
        } else {
            PlaylistType::Favorite
        }
    }

    /// Short label shown next to the playlist name.
    pub fn badge(&self) -> &'static str {
        match self {
            PlaylistType::Owned => "USER",
            PlaylistType::Favorite => "favorite",
            PlaylistType::Editorial => "editorial",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub track_count: u32,
    pub video_count: u32,
    pub duration_seconds: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub description: Option<String>,
    pub creator_name: String,
    pub creator_id: Option<String>,
    pub is_owned: bool,
    pub playlist_type: PlaylistType,
    pub remote_type: Option<String>,
    pub listen_url: String,
}

impl Playlist {
    pub fn from_raw(raw: RawPlaylist, current_user_id: &str) -> Self {
        let (creator_name, creator_id) = match raw.creator {
            Some(creator) => (creator.name, creator.id),
            None => (None, None),
        };
        let is_owned = creator_id.as_deref() == Some(current_user_id);
        let playlist_type = PlaylistType::derive(is_owned, raw.playlist_type.as_deref());
        let listen_url = raw
            .listen_url
            .unwrap_or_else(|| format!("{}{}", AppConfig::TIDAL_LISTEN_URL, raw.id));
        Self {
            name: raw.name.unwrap_or_else(|| "Untitled".to_string()),
            track_count: raw.num_tracks.unwrap_or(0),
            video_count: raw.num_videos.unwrap_or(0),
            duration_seconds: raw.duration.unwrap_or(0),
            created_at: raw.created.as_deref().and_then(parse_tidal_date),
            updated_at: raw.last_updated.as_deref().and_then(parse_tidal_date),
            is_public: raw.public.unwrap_or(false),
            description: raw.description.filter(|description| !description.is_empty()),
            creator_name: creator_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            creator_id,
            is_owned,
            playlist_type,
            remote_type: raw.playlist_type,
            listen_url,
            id: raw.id,
        }
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_seconds)
    }
}

/// Parses the timestamps TIDAL sends, e.g. `2020-01-01T12:00:00.000+0000`.
pub fn parse_tidal_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|error| log::debug!("Unparseable TIDAL date {:?}: {}", value, error))
        .ok()
}
