use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::tidal::{RawTrack, RemotePlaylistClient, RemoteResult};
use crate::utils::format_duration;

const UNKNOWN: &str = "Unknown";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    /// Seconds, `0` when the service did not send one.
    pub duration: u32,
    pub track_number: Option<u32>,
    pub isrc: Option<String>,
    /// 1-based position in the playlist the track was fetched from.
    pub original_index: usize,
}

impl Track {
    pub fn from_raw(raw: RawTrack, original_index: usize) -> Self {
        Self {
            id: raw.id,
            name: raw.name.unwrap_or_else(|| UNKNOWN.to_string()),
            artist: raw
                .artist
                .and_then(|artist| artist.name)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            album: raw
                .album
                .and_then(|album| album.name)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            duration: raw.duration.unwrap_or(0),
            track_number: raw.track_num,
            isrc: raw.isrc.filter(|isrc| !isrc.is_empty()),
            original_index,
        }
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// Fetches every track of a playlist, following the offset paging of the
/// service until it returns a short page.
pub async fn fetch_all_tracks(
    client: &dyn RemotePlaylistClient,
    playlist_id: &str,
) -> RemoteResult<Vec<Track>> {
    let handle = client
        .get_playlist(playlist_id)
        .await
        .attach_printable(format!("Failed to open playlist {}", playlist_id))?;
    let limit = AppConfig::TRACKS_FETCH_LIMIT;
    let mut raw_tracks: Vec<RawTrack> = vec![];
    let mut offset = 0;
    loop {
        let page = client
            .list_tracks(&handle, limit, offset)
            .await
            .attach_printable(format!(
                "Failed to fetch tracks {}..{} of playlist {}",
                offset,
                offset + limit,
                playlist_id
            ))?;
        let page_len = page.len();
        raw_tracks.extend(page);
        log::debug!("Fetched {} tracks of {}", raw_tracks.len(), playlist_id);
        if page_len < limit {
            break;
        }
        offset += limit;
    }
    log::info!("Loaded {} tracks of {}", raw_tracks.len(), playlist_id);
    Ok(raw_tracks
        .into_iter()
        .enumerate()
        .map(|(index, raw)| Track::from_raw(raw, index + 1))
        .collect())
}
