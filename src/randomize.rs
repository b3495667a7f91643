use error_stack::{Report, ResultExt};
use indicatif::ProgressBar;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::config::AppConfig;
use crate::playlist::cache::PlaylistCache;
use crate::playlist::track::fetch_all_tracks;
use crate::tidal::RemotePlaylistClient;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RandomizeError {
    #[error("Failed to read the tracks of the source playlist")]
    Fetch,
    #[error("The source playlist has no tracks")]
    EmptyPlaylist,
    #[error("Failed to create the shuffled playlist")]
    Create,
    #[error(
        "Playlist {new_playlist_id} was created but only {batches_completed} of \
         {batches_total} batches ({tracks_added} tracks) were added"
    )]
    PartialFailure {
        new_playlist_id: String,
        batches_completed: usize,
        batches_total: usize,
        tracks_added: usize,
    },
}

pub type RandomizeResult<T> = error_stack::Result<T, RandomizeError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomizeOutcome {
    pub new_playlist_id: String,
    pub new_playlist_name: String,
    pub tracks_added: usize,
    pub batches: usize,
}

/// Name used for the shuffled copy when the user does not pick one.
pub fn default_shuffled_name(source_name: &str) -> String {
    format!("{} [Shuffled]", source_name)
}

/// Rebuilds a playlist in random order as a new playlist.
pub struct Randomizer<R: Rng> {
    rng: R,
    batch_size: usize,
    progress: ProgressBar,
}

impl<R: Rng> Randomizer<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            batch_size: AppConfig::TIDAL_BATCH_SIZE,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports each added batch on `progress`; its length is set by the run.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Fetches every track of `source_id`, shuffles them, creates
    /// `new_name` and adds the tracks to it in sequential batches. The cache
    /// is invalidated only when every batch was added.
    pub async fn run(
        &mut self,
        client: &dyn RemotePlaylistClient,
        cache: &mut PlaylistCache,
        source_id: &str,
        new_name: &str,
    ) -> RandomizeResult<RandomizeOutcome> {
        let tracks = fetch_all_tracks(client, source_id)
            .await
            .change_context(RandomizeError::Fetch)?;
        if tracks.is_empty() {
            return Err(Report::new(RandomizeError::EmptyPlaylist)
                .attach_printable(format!("Playlist {} is empty", source_id)));
        }

        let mut track_ids: Vec<String> = tracks.into_iter().map(|track| track.id).collect();
        track_ids.shuffle(&mut self.rng);
        log::info!("Shuffled {} tracks of {}", track_ids.len(), source_id);

        let handle = client
            .create_playlist(new_name, "")
            .await
            .change_context(RandomizeError::Create)
            .attach_printable(format!("Failed to create playlist {}", new_name))?;

        let total = track_ids.len();
        let batches: Vec<&[String]> = track_ids.chunks(self.batch_size).collect();
        let batches_total = batches.len();
        self.progress.set_length(total as u64);
        self.progress.set_position(0);
        let mut tracks_added = 0;
        for (index, batch) in batches.into_iter().enumerate() {
            if let Err(report) = client.add_tracks(&handle, batch).await {
                self.progress.abandon();
                return Err(report.change_context(RandomizeError::PartialFailure {
                    new_playlist_id: handle.id.clone(),
                    batches_completed: index,
                    batches_total,
                    tracks_added,
                }));
            }
            tracks_added += batch.len();
            self.progress.set_position(tracks_added as u64);
            log::info!("Added {}/{} tracks to {}", tracks_added, total, handle.id);
        }
        self.progress.finish_and_clear();

        cache.invalidate();
        Ok(RandomizeOutcome {
            new_playlist_id: handle.id,
            new_playlist_name: new_name.to_string(),
            tracks_added,
            batches: batches_total,
        })
    }
}
