use reqwest::Method;

/// Endpoints of the TIDAL v1 API the client talks to.
pub enum TidalAPI<'a> {
    UserPlaylists {
        user_id: &'a str,
        limit: usize,
        offset: usize,
    },
    Playlist {
        playlist_id: &'a str,
    },
    PlaylistTracks {
        playlist_id: &'a str,
        limit: usize,
        offset: usize,
    },
    CreatePlaylist {
        user_id: &'a str,
    },
    AddTracks {
        playlist_id: &'a str,
    },
    User {
        user_id: &'a str,
    },
    Subscription {
        user_id: &'a str,
    },
}

impl<'a> TidalAPI<'a> {
    pub fn method(&self) -> Method {
        match self {
            TidalAPI::UserPlaylists { .. }
            | TidalAPI::Playlist { .. }
            | TidalAPI::PlaylistTracks { .. }
            | TidalAPI::User { .. }
            | TidalAPI::Subscription { .. } => Method::GET,
            TidalAPI::CreatePlaylist { .. } | TidalAPI::AddTracks { .. } => Method::POST,
        }
    }

    /// Path relative to the API base url.
    pub fn path(&self) -> String {
        match self {
            TidalAPI::UserPlaylists { user_id, .. } => {
                format!("users/{}/playlistsAndFavoritePlaylists", user_id)
            }
            TidalAPI::Playlist { playlist_id } => format!("playlists/{}", playlist_id),
            TidalAPI::PlaylistTracks { playlist_id, .. } => {
                format!("playlists/{}/tracks", playlist_id)
            }
            TidalAPI::CreatePlaylist { user_id } => format!("users/{}/playlists", user_id),
            TidalAPI::AddTracks { playlist_id } => format!("playlists/{}/items", playlist_id),
            TidalAPI::User { user_id } => format!("users/{}", user_id),
            TidalAPI::Subscription { user_id } => format!("users/{}/subscription", user_id),
        }
    }

    /// Query parameters besides `countryCode`, which the client always adds.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            TidalAPI::UserPlaylists { limit, offset, .. }
            | TidalAPI::PlaylistTracks { limit, offset, .. } => vec![
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_endpoint() {
        let endpoint = TidalAPI::PlaylistTracks {
            playlist_id: "abc",
            limit: 100,
            offset: 200,
        };
        assert_eq!(endpoint.method(), Method::GET);
        assert_eq!(endpoint.path(), "playlists/abc/tracks");
        assert_eq!(
            endpoint.query(),
            vec![("limit", "100".to_string()), ("offset", "200".to_string())]
        );
    }

    #[test]
    fn test_write_endpoints_are_posts() {
        let create = TidalAPI::CreatePlaylist { user_id: "42" };
        let add = TidalAPI::AddTracks { playlist_id: "abc" };
        assert_eq!(create.method(), Method::POST);
        assert_eq!(create.path(), "users/42/playlists");
        assert_eq!(add.method(), Method::POST);
        assert!(add.query().is_empty());
    }

    #[test]
    fn test_account_endpoints() {
        let user = TidalAPI::User { user_id: "42" };
        let subscription = TidalAPI::Subscription { user_id: "42" };
        assert_eq!(user.method(), Method::GET);
        assert_eq!(user.path(), "users/42");
        assert_eq!(subscription.method(), Method::GET);
        assert_eq!(subscription.path(), "users/42/subscription");
    }
}
