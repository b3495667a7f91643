use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use error_stack::fmt::{Charset, ColorMode};
use error_stack::{FutureExt, IntoReport, Report, ResultExt};
use indicatif::{ProgressBar, ProgressStyle};

use crate::dialoguer::Dialoguer;
use crate::display::{playlists_table, print_dashboard, print_header, tracks_table};
use crate::export::{read_json_export, ExportFormat, Exporter};
use crate::navigation::browser::Browser;
use crate::navigation::{parse_duration, InputError};
use crate::paginator::Paginator;
use crate::profile::{Dashboard, LibraryStats};
use crate::randomize::default_shuffled_name;
use crate::session::Session;
use crate::sort::{PlaylistSortKey, SortDirection, TrackSortKey};
use crate::tidal::client::TidalClient;
use crate::user::User;

mod config;
mod dialoguer;
mod display;
mod export;
mod filter;
mod navigation;
mod paginator;
mod playlist;
mod profile;
mod randomize;
mod session;
mod sort;
mod tidal;
mod user;
mod utils;

#[derive(Debug)]
pub struct TidalShufflerError;
impl fmt::Display for TidalShufflerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tidal shuffler error")
    }
}
impl std::error::Error for TidalShufflerError {}

pub type TidalShufflerResult<T> = error_stack::Result<T, TidalShufflerError>;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Browse, export and shuffle your TIDAL playlists")]
struct Cli {
    #[command(subcommand)]
    command: TidalShufflerCommands,
}

fn parse_duration_arg(value: &str) -> Result<u32, InputError> {
    parse_duration(value)?.ok_or_else(|| InputError::NotANumber(value.to_string()))
}

/// Track ordering and filters shared by the commands that read tracks
#[derive(Args, Debug, PartialEq, Clone)]
struct TrackViewArgs {
    /// original, artist, song, album or duration
    #[clap(long, short, default_value = "original")]
    sort: TrackSortKey,
    /// asc or desc, ignored for the original order
    #[clap(long, short, default_value = "asc")]
    order: SortDirection,
    /// Only keep tracks whose artist, title or album contain this text
    #[clap(long)]
    search: Option<String>,
    /// Shortest track to keep, in seconds or M:SS
    #[clap(long, value_parser = parse_duration_arg)]
    min_duration: Option<u32>,
    /// Longest track to keep, in seconds or M:SS
    #[clap(long, value_parser = parse_duration_arg)]
    max_duration: Option<u32>,
}

impl TrackViewArgs {
    fn apply(&self, session: &mut Session) {
        session.start_track_browsing();
        if let Some(search) = &self.search {
            session.filter.set_search(search);
        }
        session
            .filter
            .set_duration_range(self.min_duration, self.max_duration);
        session.sort.track_key = self.sort;
        session.sort.track_direction = self.order;
    }
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
enum TidalShufflerCommands {
    /// Stores the TIDAL session used by the other commands
    Login,
    /// Reads the current config file
    Config,
    /// Browse your playlists interactively
    Browse,
    /// Lists your playlists
    List {
        /// name, tracks, duration, created, updated or type
        #[clap(long, short, default_value = "name")]
        sort: PlaylistSortKey,
        /// asc or desc
        #[clap(long, short, default_value = "asc")]
        order: SortDirection,
        #[clap(long, short, default_value_t = 1)]
        page: usize,
        /// Print every playlist instead of a single page
        #[clap(long, short, action)]
        all: bool,
    },
    /// Lists the tracks of a playlist
    Tracks {
        playlist_id: String,
        #[command(flatten)]
        view: TrackViewArgs,
        #[clap(long, short, default_value_t = 1)]
        page: usize,
        /// Print every track instead of a single page
        #[clap(long, short, action)]
        all: bool,
    },
    /// Exports the tracks of a playlist to a file
    Export {
        playlist_id: String,
        /// json, csv or txt
        #[clap(long, short, default_value = "json")]
        format: ExportFormat,
        #[command(flatten)]
        view: TrackViewArgs,
        /// Overrides the export directory of the config
        #[clap(long)]
        output_dir: Option<PathBuf>,
    },
    /// Creates a shuffled copy of a playlist
    Randomize {
        playlist_id: String,
        /// Name of the new playlist, defaults to "<name> [Shuffled]"
        #[clap(long, short)]
        name: Option<String>,
        /// Skip the confirmation
        #[clap(long, short, action)]
        yes: bool,
    },
    /// Reads back a JSON export
    Inspect { path: PathBuf },
    /// Shows the account, subscription and library of the logged in user
    Profile,
}

impl TidalShufflerCommands {
    pub async fn execute(&self) -> TidalShufflerResult<()> {
        return match self {
            TidalShufflerCommands::Login => Self::login(),
            TidalShufflerCommands::Config => {
                let user = User::load().change_context(TidalShufflerError)?;
                println!("Current config:\n{:#?}", user.masked());
                println!("Export directory: {}", user.export_dir().display());
                Ok(())
            }
            TidalShufflerCommands::Browse => {
                let session = Self::open_session(None)?;
                Browser::new(session)
                    .run()
                    .change_context(TidalShufflerError)
                    .await
            }
            TidalShufflerCommands::List {
                sort,
                order,
                page,
                all,
            } => {
                let mut session = Self::open_session(None)?;
                session.sort.playlist_key = *sort;
                session.sort.playlist_direction = *order;
                let playlists = session.playlists(false).await;
                let mut paginator = Paginator::new(playlists);
                print_header(
                    &format!("Your playlists ({} total)", paginator.total_items()),
                    Some(&format!("Sorted by {}", session.sort.playlist_description())),
                );
                if *all {
                    println!("{}", playlists_table(paginator.items(), 0));
                } else {
                    Self::go_to_page(&mut paginator, *page)?;
                    println!(
                        "{}",
                        playlists_table(paginator.current(), paginator.start_index())
                    );
                    println!("{}", paginator.range_description());
                }
                Ok(())
            }
            TidalShufflerCommands::Tracks {
                playlist_id,
                view,
                page,
                all,
            } => {
                let mut session = Self::open_session(None)?;
                let playlist = session
                    .find_playlist(playlist_id)
                    .await
                    .change_context(TidalShufflerError)?;
                let total = session
                    .tracks(playlist_id)
                    .await
                    .change_context(TidalShufflerError)?
                    .len();
                view.apply(&mut session);
                let mut paginator = Paginator::new(session.track_view(playlist_id));
                print_header(&format!("Tracks: {}", playlist.name), None);
                let status = session.filter.status_line();
                if !status.is_empty() {
                    println!(
                        "{}",
                        format!("{} | Filtered: {}/{}", status, paginator.total_items(), total)
                            .yellow()
                    );
                }
                if *all {
                    println!("{}", tracks_table(paginator.items()));
                } else {
                    Self::go_to_page(&mut paginator, *page)?;
                    println!("{}", tracks_table(paginator.current()));
                    println!("{}", paginator.range_description());
                }
                Ok(())
            }
            TidalShufflerCommands::Export {
                playlist_id,
                format,
                view,
                output_dir,
            } => {
                let mut session = Self::open_session(output_dir.clone())?;
                let playlist = session
                    .find_playlist(playlist_id)
                    .await
                    .change_context(TidalShufflerError)?;
                view.apply(&mut session);
                let path = session
                    .export(&playlist, *format, true)
                    .await
                    .change_context(TidalShufflerError)?;
                println!(
                    "{} {} to {}",
                    "Exported".green(),
                    playlist.name.cyan(),
                    path.display().to_string().cyan()
                );
                Ok(())
            }
            TidalShufflerCommands::Randomize {
                playlist_id,
                name,
                yes,
            } => Self::randomize(playlist_id, name.clone(), *yes).await,
            TidalShufflerCommands::Profile => Self::profile().await,
            TidalShufflerCommands::Inspect { path } => {
                let document = read_json_export(path).change_context(TidalShufflerError)?;
                print_header(
                    &document.playlist_name,
                    Some(&format!(
                        "{} | {} | by {} | exported {}",
                        document.playlist_id,
                        document.playlist_type,
                        document.creator,
                        document.exported_at
                    )),
                );
                let tracks = document
                    .tracks
                    .iter()
                    .map(|track| track.to_track())
                    .collect::<Vec<_>>();
                println!("{}", tracks_table(&tracks));
                println!("{} tracks", document.total_tracks);
                Ok(())
            }
        };
    }

    fn login() -> TidalShufflerResult<()> {
        let mut user = User::new();
        if User::config_file_exists().change_context(TidalShufflerError)? {
            user.read_config_file().change_context(TidalShufflerError)?;
        }
        let prompt_text = "TIDAL access token: ".to_string();
        user.tidal_access_token =
            Dialoguer::password(prompt_text).change_context(TidalShufflerError)?;
        let prompt_text = "TIDAL user id: ".to_string();
        user.tidal_user_id = Dialoguer::input_with_default(
            prompt_text,
            Some(user.tidal_user_id.clone()).filter(|id| !id.is_empty()),
        )
        .change_context(TidalShufflerError)?
        .trim()
        .to_string();
        let prompt_text = "Country code: ".to_string();
        user.country_code =
            Dialoguer::input_with_default(prompt_text, Some(user.country_code()))
                .change_context(TidalShufflerError)?
                .trim()
                .to_uppercase();
        let prompt_text = "Export directory: ".to_string();
        user.export_dir = Dialoguer::input_with_default(
            prompt_text,
            Some(user.export_dir().display().to_string()),
        )
        .change_context(TidalShufflerError)?
        .trim()
        .to_string();
        user.save_config_file().change_context(TidalShufflerError)?;
        println!(
            "TIDAL session successfully stored:\n {:#?}",
            user.masked()
        );
        Ok(())
    }

    fn tidal_client(user: &User) -> TidalShufflerResult<TidalClient> {
        TidalClient::from_user(user)
            .change_context(TidalShufflerError)
            .attach(Suggestion(
                "run `tidal-shuffler login` or set TIDAL_ACCESS_TOKEN and TIDAL_USER_ID"
                    .to_string(),
            ))
    }

    fn open_session(export_dir: Option<PathBuf>) -> TidalShufflerResult<Session> {
        let user = User::load().change_context(TidalShufflerError)?;
        let client = Self::tidal_client(&user)?;
        let exporter = Exporter::new(export_dir.unwrap_or_else(|| user.export_dir()));
        Ok(Session::new(Box::new(client), exporter))
    }

    async fn profile() -> TidalShufflerResult<()> {
        let user = User::load().change_context(TidalShufflerError)?;
        let client = Self::tidal_client(&user)?;
        let account = client.user().await.change_context(TidalShufflerError)?;
        let subscription = match client.subscription().await {
            Ok(subscription) => Some(subscription),
            Err(report) => {
                log::warn!("Could not fetch the subscription: {:?}", report);
                None
            }
        };
        let country_code = client.country_code().to_string();
        let mut session = Session::new(Box::new(client), Exporter::new(user.export_dir()));
        let library = LibraryStats::from_playlists(&session.playlists(false).await);
        let dashboard = Dashboard {
            user: account,
            country_code,
            subscription,
            library,
        };
        print_dashboard(&dashboard, chrono::Utc::now());
        Ok(())
    }

    fn go_to_page<T>(paginator: &mut Paginator<T>, page: usize) -> TidalShufflerResult<()> {
        if paginator.go_to(page) {
            return Ok(());
        }
        Err(Report::new(TidalShufflerError).attach_printable(format!(
            "Page {} does not exist, there are {} pages",
            page,
            paginator.total_pages()
        )))
    }

    async fn randomize(
        playlist_id: &str,
        name: Option<String>,
        skip_confirmation: bool,
    ) -> TidalShufflerResult<()> {
        let mut session = Self::open_session(None)?;
        let playlist = session
            .find_playlist(playlist_id)
            .await
            .change_context(TidalShufflerError)?;
        let new_name = name.unwrap_or_else(|| default_shuffled_name(&playlist.name));
        println!("Original: {}", playlist.name.cyan());
        println!("New: {}", new_name.cyan());
        if !skip_confirmation {
            let prompt_text = "Create the shuffled playlist?".to_string();
            if !Dialoguer::select_yes_or_no(prompt_text).change_context(TidalShufflerError)? {
                return Ok(());
            }
        }
        let progress = ProgressBar::new(u64::from(playlist.track_count));
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{wide_bar:.white/blue}] {pos}/{len} tracks added")
                .into_report()
                .change_context(TidalShufflerError)?
                .progress_chars("█  "),
        );
        let outcome = session
            .randomize(&playlist.id, &new_name, rand::thread_rng(), progress)
            .await
            .change_context(TidalShufflerError)?;
        println!(
            "{} {} ({} tracks in {} batches)",
            "Created".green(),
            outcome.new_playlist_name.cyan(),
            outcome.tracks_added,
            outcome.batches
        );
        println!("Id: {}", outcome.new_playlist_id);
        Ok(())
    }
}

pub struct Suggestion(String);

impl Suggestion {
    pub fn set_report() {
        Report::set_charset(Charset::Utf8);
        Report::set_color_mode(ColorMode::Color);
        Report::install_debug_hook::<Self>(|Self(value), context| {
            context.push_body(format!("{}: {value}", "suggestion".yellow()))
        });
    }
}

async fn run() -> TidalShufflerResult<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    Suggestion::set_report();

    cli.command.execute().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> TidalShufflerResult<()> {
    run().await
}
