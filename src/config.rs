/// `AppConfig` holds static configuration values for the application,
/// such as the TIDAL API location and the limits the service imposes.
pub struct AppConfig;

impl AppConfig {
    /// Base url of the TIDAL v1 REST API.
    pub const TIDAL_API_URL: &'static str = "https://api.tidal.com/v1/";
    /// Base url used to build the browser link of a playlist.
    pub const TIDAL_LISTEN_URL: &'static str = "https://listen.tidal.com/playlist/";
    /// Country used when neither the config file nor the environment sets one.
    pub const DEFAULT_COUNTRY_CODE: &'static str = "US";
    /// How long a fetched playlist collection stays valid.
    pub const CACHE_TTL_SECONDS: i64 = 300;
    /// Max amount of track ids TIDAL accepts in a single add call.
    pub const TIDAL_BATCH_SIZE: usize = 100;
    /// Page size used when paging through the tracks of a playlist.
    pub const TRACKS_FETCH_LIMIT: usize = 100;
    /// Page size used when paging through the playlists of a user.
    pub const PLAYLISTS_FETCH_LIMIT: usize = 50;
    /// Rows shown per page in the playlist and track browsers.
    pub const ITEMS_PER_PAGE: usize = 20;
    /// Export directory used when the config does not set one.
    pub const DEFAULT_EXPORT_DIR: &'static str = "./exports";
}
