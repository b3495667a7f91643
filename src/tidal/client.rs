use async_trait::async_trait;
use error_stack::{IntoReport, Report, ResultExt};
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::AppConfig;
use crate::tidal::api::TidalAPI;
use crate::tidal::{
    PlaylistHandle, RawPlaylist, RawSubscription, RawTrack, RawUser, RemoteError,
    RemotePlaylistClient, RemoteResult,
};
use crate::user::User;

#[derive(Deserialize, Debug)]
struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "totalNumberOfItems", default)]
    total_number_of_items: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct PlaylistItem {
    playlist: RawPlaylist,
}

/// [`RemotePlaylistClient`] backed by the TIDAL v1 REST API.
#[derive(Debug, Clone)]
pub struct TidalClient {
    http: Client,
    base_url: Url,
    access_token: String,
    user_id: String,
    country_code: String,
}

impl TidalClient {
    pub fn new(access_token: String, user_id: String, country_code: String) -> RemoteResult<Self> {
        if access_token.is_empty() || user_id.is_empty() {
            return Err(Report::new(RemoteError::Config)
                .attach_printable("An access token and a user id are required"));
        }
        let base_url = Url::parse(AppConfig::TIDAL_API_URL)
            .into_report()
            .change_context(RemoteError::Config)?;
        Ok(Self {
            http: Client::new(),
            base_url,
            access_token,
            user_id,
            country_code,
        })
    }

    pub fn from_user(user: &User) -> RemoteResult<Self> {
        Self::new(
            user.tidal_access_token.clone(),
            user.tidal_user_id.clone(),
            user.country_code(),
        )
        .attach_printable("Run `tidal-shuffler login` to store your TIDAL session")
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> RemoteResult<Self> {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        self.base_url = Url::parse(&base_url)
            .into_report()
            .attach_printable(format!("Invalid API url: {}", base_url))
            .change_context(RemoteError::Config)?;
        Ok(self)
    }

    fn request(&self, endpoint: &TidalAPI) -> RemoteResult<RequestBuilder> {
        let url = self
            .base_url
            .join(&endpoint.path())
            .into_report()
            .change_context(RemoteError::Config)?;
        log::debug!("{} {}", endpoint.method(), url);
        Ok(self
            .http
            .request(endpoint.method(), url)
            .bearer_auth(&self.access_token)
            .query(&[("countryCode", self.country_code.as_str())])
            .query(&endpoint.query()))
    }

    async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request
            .send()
            .await
            .into_report()
            .change_context(RemoteError::Network)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        log::warn!("{} answered {}", url, status);
        Err(Report::new(RemoteError::from_status(status.as_u16()))
            .attach_printable(format!("{} answered {}: {}", url, status, body)))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .into_report()
            .attach_printable(format!("Failed to parse the response of {}", url))
            .change_context(RemoteError::Decode)
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub async fn user(&self) -> RemoteResult<RawUser> {
        let endpoint = TidalAPI::User {
            user_id: &self.user_id,
        };
        let response = self.send(self.request(&endpoint)?).await?;
        Self::json(response).await
    }

    pub async fn subscription(&self) -> RemoteResult<RawSubscription> {
        let endpoint = TidalAPI::Subscription {
            user_id: &self.user_id,
        };
        let response = self.send(self.request(&endpoint)?).await?;
        Self::json(response).await
    }

    fn handle_from(&self, raw: RawPlaylist, etag: Option<String>) -> PlaylistHandle {
        PlaylistHandle {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            etag,
        }
    }

    fn with_listen_url(mut raw: RawPlaylist) -> RawPlaylist {
        if raw.listen_url.is_none() {
            raw.listen_url = Some(format!("{}{}", AppConfig::TIDAL_LISTEN_URL, raw.id));
        }
        raw
    }

    fn etag(response: &Response) -> Option<String> {
        response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}

#[async_trait]
impl RemotePlaylistClient for TidalClient {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn list_playlists(&self) -> RemoteResult<Vec<RawPlaylist>> {
        let limit = AppConfig::PLAYLISTS_FETCH_LIMIT;
        let mut playlists = vec![];
        let mut offset = 0;
        loop {
            let endpoint = TidalAPI::UserPlaylists {
                user_id: &self.user_id,
                limit,
                offset,
            };
            let response = self.send(self.request(&endpoint)?).await?;
            let page: PagedResponse<PlaylistItem> = Self::json(response).await?;
            let fetched = page.items.len();
            playlists.extend(
                page.items
                    .into_iter()
                    .map(|item| Self::with_listen_url(item.playlist)),
            );
            offset += fetched;
            let finished = match page.total_number_of_items {
                Some(total) => offset >= total,
                None => fetched < limit,
            };
            if fetched == 0 || finished {
                break;
            }
        }
        log::info!("Fetched {} playlists from TIDAL", playlists.len());
        Ok(playlists)
    }

    async fn get_playlist(&self, playlist_id: &str) -> RemoteResult<PlaylistHandle> {
        let response = self
            .send(self.request(&TidalAPI::Playlist { playlist_id })?)
            .await?;
        let etag = Self::etag(&response);
        let raw: RawPlaylist = Self::json(response).await?;
        Ok(self.handle_from(raw, etag))
    }

    async fn list_tracks(
        &self,
        handle: &PlaylistHandle,
        limit: usize,
        offset: usize,
    ) -> RemoteResult<Vec<RawTrack>> {
        let endpoint = TidalAPI::PlaylistTracks {
            playlist_id: &handle.id,
            limit,
            offset,
        };
        let response = self.send(self.request(&endpoint)?).await?;
        let page: PagedResponse<RawTrack> = Self::json(response).await?;
        Ok(page.items)
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> RemoteResult<PlaylistHandle> {
        let request = self
            .request(&TidalAPI::CreatePlaylist {
                user_id: &self.user_id,
            })?
            .form(&[("title", name), ("description", description)]);
        let response = self.send(request).await?;
        let etag = Self::etag(&response);
        let raw: RawPlaylist = Self::json(response).await?;
        log::info!("Created playlist {} ({})", name, raw.id);
        Ok(self.handle_from(raw, etag))
    }

    async fn add_tracks(&self, handle: &PlaylistHandle, track_ids: &[String]) -> RemoteResult<()> {
        // every write changes the playlist ETag, so read the current one first
        let current = self.get_playlist(&handle.id).await?;
        let track_ids = track_ids.join(",");
        let mut request = self
            .request(&TidalAPI::AddTracks {
                playlist_id: &handle.id,
            })?
            .form(&[
                ("trackIds", track_ids.as_str()),
                ("onArtifactNotFound", "SKIP"),
                ("onDupes", "SKIP"),
            ]);
        if let Some(etag) = current.etag {
            request = request.header(IF_NONE_MATCH, etag);
        }
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client_for(server: &MockServer) -> TidalClient {
        TidalClient::new("token".to_string(), "42".to_string(), "NO".to_string())
            .unwrap()
            .with_base_url(&server.uri())
            .unwrap()
    }

    #[test]
    fn test_new_requires_credentials() {
        let result = TidalClient::new("".to_string(), "42".to_string(), "US".to_string());
        assert_eq!(*result.unwrap_err().current_context(), RemoteError::Config);
    }

    #[tokio::test]
    async fn test_list_playlists_follows_pages() {
        let server = MockServer::start().await;
        let first_page: Vec<_> = (0..50)
            .map(|index| json!({ "playlist": { "uuid": format!("p{index}"), "title": "x" } }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/users/42/playlistsAndFavoritePlaylists"))
            .and(query_param("offset", "0"))
            .and(query_param("countryCode", "NO"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "limit": 50, "offset": 0, "totalNumberOfItems": 51, "items": first_page
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/42/playlistsAndFavoritePlaylists"))
            .and(query_param("offset", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "limit": 50, "offset": 50, "totalNumberOfItems": 51,
                "items": [{ "playlist": { "uuid": "last", "title": "Last" } }]
            })))
            .mount(&server)
            .await;

        let playlists = client_for(&server).await.list_playlists().await.unwrap();
        assert_eq!(playlists.len(), 51);
        assert_eq!(playlists[50].id, "last");
        assert_eq!(
            playlists[50].listen_url.as_deref(),
            Some("https://listen.tidal.com/playlist/last")
        );
    }

    #[tokio::test]
    async fn test_unauthorized_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/abc/tracks"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;
        let handle = PlaylistHandle {
            id: "abc".to_string(),
            name: "".to_string(),
            etag: None,
        };
        let error = client_for(&server)
            .await
            .list_tracks(&handle, 100, 0)
            .await
            .unwrap_err();
        assert_eq!(*error.current_context(), RemoteError::Unauthorized);
    }

    #[tokio::test]
    async fn test_add_tracks_sends_current_etag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ETag", "\"1700000000\"")
                    .set_body_json(json!({ "uuid": "abc", "title": "Shuffled" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/playlists/abc/items"))
            .and(header("if-none-match", "\"1700000000\""))
            .and(body_string_contains("trackIds=1%2C2%2C3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let handle = PlaylistHandle {
            id: "abc".to_string(),
            name: "Shuffled".to_string(),
            etag: None,
        };
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        client_for(&server)
            .await
            .add_tracks(&handle, &ids)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_user_and_subscription_are_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42"))
            .and(query_param("countryCode", "NO"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42, "username": "ola", "firstName": "Ola", "lastName": "Nordmann",
                "created": "2019-04-02T10:00:00.000+0000"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/42/subscription"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ACTIVE",
                "subscription": { "type": "HIFI", "offlineGracePeriod": 30 },
                "highestSoundQuality": "HI_RES",
                "premiumAccess": true
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let user = client.user().await.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.first_name.as_deref(), Some("Ola"));
        assert!(user.email.is_none());

        let subscription = client.subscription().await.unwrap();
        assert_eq!(subscription.status.as_deref(), Some("ACTIVE"));
        assert_eq!(
            subscription.subscription.unwrap().offline_grace_period,
            Some(30)
        );
        assert_eq!(subscription.premium_access, Some(true));
    }

    #[tokio::test]
    async fn test_add_tracks_skips_unavailable_and_repeated_tracks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "uuid": "abc", "title": "x" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/playlists/abc/items"))
            .and(body_string_contains("onArtifactNotFound=SKIP"))
            .and(body_string_contains("onDupes=SKIP"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/playlists/abc/items"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let handle = PlaylistHandle {
            id: "abc".to_string(),
            name: "x".to_string(),
            etag: None,
        };
        let ids = vec!["7".to_string(), "7".to_string()];
        client_for(&server)
            .await
            .add_tracks(&handle, &ids)
            .await
            .unwrap();
    }
}
