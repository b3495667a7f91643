use chrono::{DateTime, Duration, Utc};
use error_stack::ResultExt;

use crate::config::AppConfig;
use crate::playlist::Playlist;
use crate::tidal::{RemotePlaylistClient, RemoteResult};

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Vec<Playlist>,
    fetched_at: DateTime<Utc>,
}

/// Keeps the last fetched playlist collection for a bounded amount of time.
#[derive(Debug, Clone)]
pub struct PlaylistCache {
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl Default for PlaylistCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(AppConfig::CACHE_TTL_SECONDS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Returns the cached playlists while they are fresh, otherwise fetches
    /// them again. A failed fetch leaves the previous entry in place.
    pub async fn get(
        &mut self,
        client: &dyn RemotePlaylistClient,
        force_refresh: bool,
    ) -> RemoteResult<Vec<Playlist>> {
        self.get_at(client, force_refresh, Utc::now()).await
    }

    async fn get_at(
        &mut self,
        client: &dyn RemotePlaylistClient,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> RemoteResult<Vec<Playlist>> {
        if !force_refresh {
            if let Some(entry) = self.fresh_entry(now) {
                log::debug!("Serving {} playlists from cache", entry.snapshot.len());
                return Ok(entry.snapshot.clone());
            }
        }
        let raw_playlists = client
            .list_playlists()
            .await
            .attach_printable("Failed to refresh the playlist cache")?;
        let user_id = client.user_id();
        let snapshot: Vec<Playlist> = raw_playlists
            .into_iter()
            .map(|raw| Playlist::from_raw(raw, user_id))
            .collect();
        self.entry = Some(CacheEntry {
            snapshot: snapshot.clone(),
            fetched_at: now,
        });
        Ok(snapshot)
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("Playlist cache invalidated");
        }
    }

    #[cfg(test)]
    pub fn is_fresh(&self) -> bool {
        self.fresh_entry(Utc::now()).is_some()
    }

    /// Time since the current entry was fetched, if there is one.
    pub fn age(&self) -> Option<Duration> {
        self.entry
            .as_ref()
            .map(|entry| Utc::now() - entry.fetched_at)
    }

    fn fresh_entry(&self, now: DateTime<Utc>) -> Option<&CacheEntry> {
        self.entry
            .as_ref()
            .filter(|entry| now - entry.fetched_at < self.ttl)
    }
}
