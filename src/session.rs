use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use colored::Colorize;
use error_stack::{Report, ResultExt};
use indicatif::ProgressBar;
use rand::Rng;

use crate::export::{ExportFormat, Exporter};
use crate::filter::FilterState;
use crate::playlist::cache::PlaylistCache;
use crate::playlist::track::{fetch_all_tracks, Track};
use crate::playlist::Playlist;
use crate::randomize::{RandomizeOutcome, RandomizeResult, Randomizer};
use crate::sort::{sort_playlists, sort_tracks, SortState};
use crate::tidal::RemotePlaylistClient;

#[derive(Debug)]
pub struct SessionError;
impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session error")
    }
}
impl std::error::Error for SessionError {}

pub type SessionResult<T> = error_stack::Result<T, SessionError>;

/// Everything a browsing session shares: the remote client, the playlist
/// cache, the sort and filter choices and the tracks loaded so far.
pub struct Session {
    client: Box<dyn RemotePlaylistClient>,
    cache: PlaylistCache,
    exporter: Exporter,
    pub sort: SortState,
    pub filter: FilterState,
    tracks: HashMap<String, Vec<Track>>,
}

impl Session {
    pub fn new(client: Box<dyn RemotePlaylistClient>, exporter: Exporter) -> Self {
        Self {
            client,
            cache: PlaylistCache::new(),
            exporter,
            sort: SortState::default(),
            filter: FilterState::default(),
            tracks: HashMap::new(),
        }
    }

    pub fn cache(&self) -> &PlaylistCache {
        &self.cache
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Playlists in the current sort order. A failed fetch is reported and
    /// yields an empty list so browsing can go on.
    pub async fn playlists(&mut self, force_refresh: bool) -> Vec<Playlist> {
        if force_refresh {
            self.tracks.clear();
        }
        match self.cache.get(self.client.as_ref(), force_refresh).await {
            Ok(playlists) => sort_playlists(
                playlists,
                self.sort.playlist_key,
                self.sort.playlist_direction,
            ),
            Err(report) => {
                log::warn!("Failed to load playlists: {:?}", report);
                println!(
                    "{}",
                    format!("Could not load your playlists: {}", report.current_context())
                        .yellow()
                );
                vec![]
            }
        }
    }

    pub async fn find_playlist(&mut self, playlist_id: &str) -> SessionResult<Playlist> {
        self.playlists(false)
            .await
            .into_iter()
            .find(|playlist| playlist.id == playlist_id)
            .ok_or_else(|| {
                Report::new(SessionError)
                    .attach_printable(format!("Playlist {} not found", playlist_id))
            })
    }

    /// Resets the track sort and filter before browsing a playlist.
    pub fn start_track_browsing(&mut self) {
        self.sort.reset_tracks();
        self.filter.clear();
    }

    /// Tracks of a playlist in playlist order, fetched on first use.
    pub async fn tracks(&mut self, playlist_id: &str) -> SessionResult<&[Track]> {
        if !self.tracks.contains_key(playlist_id) {
            let tracks = fetch_all_tracks(self.client.as_ref(), playlist_id)
                .await
                .change_context(SessionError)?;
            self.tracks.insert(playlist_id.to_string(), tracks);
        }
        Ok(self
            .tracks
            .get(playlist_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Loaded tracks of `playlist_id` after the filter and the track sort.
    pub fn track_view(&self, playlist_id: &str) -> Vec<Track> {
        let tracks = self
            .tracks
            .get(playlist_id)
            .map(|tracks| self.filter.apply(tracks))
            .unwrap_or_default();
        sort_tracks(tracks, self.sort.track_key, self.sort.track_direction)
    }

    /// Exports the whole playlist, or only the current track view when
    /// `current_view` is set.
    pub async fn export(
        &mut self,
        playlist: &Playlist,
        format: ExportFormat,
        current_view: bool,
    ) -> SessionResult<PathBuf> {
        let tracks = if current_view {
            self.tracks(&playlist.id).await?;
            self.track_view(&playlist.id)
        } else {
            self.tracks(&playlist.id).await?.to_vec()
        };
        self.exporter
            .export(playlist, &tracks, format)
            .change_context(SessionError)
    }

    /// Runs the shuffle workflow. Holding `&mut self` keeps a single rebuild
    /// in flight.
    pub async fn randomize<R: Rng>(
        &mut self,
        source_id: &str,
        new_name: &str,
        rng: R,
        progress: ProgressBar,
    ) -> RandomizeResult<RandomizeOutcome> {
        let outcome = Randomizer::new(rng)
            .with_progress(progress)
            .run(self.client.as_ref(), &mut self.cache, source_id, new_name)
            .await?;
        self.tracks.remove(&outcome.new_playlist_id);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::export::read_json_export;
    use crate::sort::{PlaylistSortKey, SortDirection, TrackSortKey};
    use crate::tidal::testing::{raw_playlist, FakeClient};

    use super::*;

    fn session(client: FakeClient, export_dir: PathBuf) -> Session {
        Session::new(Box::new(client), Exporter::new(export_dir))
    }

    fn client() -> FakeClient {
        FakeClient::new("42")
            .with_tracks(30)
            .with_playlists(vec![
                raw_playlist("b", "beta"),
                raw_playlist("a", "Alpha"),
            ])
    }

    #[tokio::test]
    async fn test_playlists_follow_sort_state() {
        let mut session = session(client(), PathBuf::from("unused"));
        let names: Vec<String> = session
            .playlists(false)
            .await
            .into_iter()
            .map(|playlist| playlist.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta"]);

        session.sort.playlist_key = PlaylistSortKey::Name;
        session.sort.playlist_direction = SortDirection::Desc;
        let first = session.playlists(false).await.remove(0);
        assert_eq!(first.name, "beta");
    }

    #[tokio::test]
    async fn test_failed_fetch_yields_empty_list() {
        let failing = FakeClient {
            fail_list_playlists: true,
            ..client()
        };
        let mut session = session(failing, PathBuf::from("unused"));
        assert!(session.playlists(false).await.is_empty());
        assert!(session.find_playlist("a").await.is_err());
    }

    #[tokio::test]
    async fn test_tracks_are_fetched_once() {
        let mut session = session(client(), PathBuf::from("unused"));
        assert_eq!(session.tracks("a").await.unwrap().len(), 30);
        assert_eq!(session.tracks("a").await.unwrap().len(), 30);
        // 30 tracks fit in a single short page
        assert_eq!(session.tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_track_view_filters_then_sorts() {
        let mut session = session(client(), PathBuf::from("unused"));
        session.tracks("a").await.unwrap();
        session.filter.set_search("song t2");
        session.sort.track_key = TrackSortKey::Title;
        session.sort.track_direction = SortDirection::Desc;
        let ids: Vec<String> = session
            .track_view("a")
            .into_iter()
            .map(|track| track.id)
            .collect();
        assert_eq!(ids[0], "t29");
        assert_eq!(ids.len(), 11);

        session.start_track_browsing();
        assert_eq!(session.track_view("a").len(), 30);
        assert_eq!(session.track_view("a")[0].original_index, 1);
    }

    #[tokio::test]
    async fn test_export_current_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(client(), dir.path().to_path_buf());
        let playlist = session.find_playlist("a").await.unwrap();
        session.tracks("a").await.unwrap();
        session.filter.set_duration_range(None, Some(100));
        let path = session
            .export(&playlist, ExportFormat::Json, true)
            .await
            .unwrap();
        assert_eq!(read_json_export(&path).unwrap().total_tracks, 0);

        let path = session
            .export(&playlist, ExportFormat::Json, false)
            .await
            .unwrap();
        assert_eq!(read_json_export(&path).unwrap().total_tracks, 30);
    }

    #[tokio::test]
    async fn test_randomize_invalidates_cache() {
        let mut session = session(client(), PathBuf::from("unused"));
        session.playlists(false).await;
        assert!(session.cache().is_fresh());
        let outcome = session
            .randomize(
                "a",
                "Alpha [Shuffled]",
                StdRng::seed_from_u64(1),
                ProgressBar::hidden(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.tracks_added, 30);
        assert!(!session.cache().is_fresh());
    }

    #[tokio::test]
    async fn test_refresh_clears_loaded_tracks() {
        let mut session = session(client(), PathBuf::from("unused"));
        session.tracks("a").await.unwrap();
        session.playlists(true).await;
        assert!(session.tracks.is_empty());
    }
}
