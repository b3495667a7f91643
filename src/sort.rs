use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::playlist::track::Track;
use crate::playlist::Playlist;

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    #[strum(to_string = "asc")]
    Asc,
    #[strum(to_string = "desc")]
    Desc,
}

impl SortDirection {
    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum PlaylistSortKey {
    #[default]
    #[strum(to_string = "name")]
    Name,
    #[strum(to_string = "tracks", serialize = "trackCount")]
    TrackCount,
    #[strum(to_string = "duration")]
    Duration,
    #[strum(to_string = "created", serialize = "createdAt")]
    CreatedAt,
    #[strum(to_string = "updated", serialize = "updatedAt")]
    UpdatedAt,
    #[strum(to_string = "type")]
    Type,
}

impl PlaylistSortKey {
    pub fn label(&self) -> &'static str {
        match self {
            PlaylistSortKey::Name => "Name",
            PlaylistSortKey::TrackCount => "Track count",
            PlaylistSortKey::Duration => "Duration",
            PlaylistSortKey::CreatedAt => "Date created",
            PlaylistSortKey::UpdatedAt => "Last updated",
            PlaylistSortKey::Type => "Type",
        }
    }
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum TrackSortKey {
    #[default]
    #[strum(to_string = "original")]
    Original,
    #[strum(to_string = "artist")]
    Artist,
    #[strum(to_string = "song", serialize = "title")]
    Title,
    #[strum(to_string = "album")]
    Album,
    #[strum(to_string = "duration")]
    Duration,
}

impl TrackSortKey {
    pub fn label(&self) -> &'static str {
        match self {
            TrackSortKey::Original => "Original order",
            TrackSortKey::Artist => "Artist",
            TrackSortKey::Title => "Song title",
            TrackSortKey::Album => "Album",
            TrackSortKey::Duration => "Duration",
        }
    }
}

/// Sort choices of the current session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortState {
    pub playlist_key: PlaylistSortKey,
    pub playlist_direction: SortDirection,
    pub track_key: TrackSortKey,
    pub track_direction: SortDirection,
}

impl SortState {
    /// Every new track browsing session starts in playlist order.
    pub fn reset_tracks(&mut self) {
        self.track_key = TrackSortKey::Original;
        self.track_direction = SortDirection::Asc;
    }

    pub fn playlist_description(&self) -> String {
        format!(
            "{} {}",
            self.playlist_key.label(),
            self.playlist_direction.arrow()
        )
    }

    pub fn track_description(&self) -> String {
        if self.track_key == TrackSortKey::Original {
            return self.track_key.label().to_string();
        }
        format!("{} {}", self.track_key.label(), self.track_direction.arrow())
    }
}

fn compare_lowercase(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_playlists(a: &Playlist, b: &Playlist, key: PlaylistSortKey) -> Ordering {
    match key {
        PlaylistSortKey::Name => compare_lowercase(&a.name, &b.name),
        PlaylistSortKey::TrackCount => a.track_count.cmp(&b.track_count),
        PlaylistSortKey::Duration => a.duration_seconds.cmp(&b.duration_seconds),
        // `None` orders before any date
        PlaylistSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        PlaylistSortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        PlaylistSortKey::Type => a
            .playlist_type
            .to_string()
            .cmp(&b.playlist_type.to_string())
            .then_with(|| compare_lowercase(&a.name, &b.name)),
    }
}

fn compare_tracks(a: &Track, b: &Track, key: TrackSortKey) -> Ordering {
    match key {
        TrackSortKey::Original => a.original_index.cmp(&b.original_index),
        TrackSortKey::Artist => compare_lowercase(&a.artist, &b.artist)
            .then_with(|| compare_lowercase(&a.name, &b.name)),
        TrackSortKey::Title => compare_lowercase(&a.name, &b.name),
        TrackSortKey::Album => compare_lowercase(&a.album, &b.album)
            .then_with(|| a.original_index.cmp(&b.original_index)),
        TrackSortKey::Duration => a.duration.cmp(&b.duration),
    }
}

/// Orders playlists by `key`. Equal keys fall back to the playlist id, in
/// both directions.
pub fn sort_playlists(
    mut playlists: Vec<Playlist>,
    key: PlaylistSortKey,
    direction: SortDirection,
) -> Vec<Playlist> {
    playlists.sort_by(|a, b| {
        direction
            .apply(compare_playlists(a, b, key))
            .then_with(|| a.id.cmp(&b.id))
    });
    playlists
}

/// Orders tracks by `key`. [`TrackSortKey::Original`] always restores the
/// playlist order and ignores `direction`.
pub fn sort_tracks(
    mut tracks: Vec<Track>,
    key: TrackSortKey,
    direction: SortDirection,
) -> Vec<Track> {
    if key == TrackSortKey::Original {
        tracks.sort_by_key(|track| track.original_index);
        return tracks;
    }
    tracks.sort_by(|a, b| {
        direction
            .apply(compare_tracks(a, b, key))
            .then_with(|| a.original_index.cmp(&b.original_index))
    });
    tracks
}
