use std::fmt;

use colored::Colorize;
use error_stack::{Context, IntoReport, Report, ResultExt};
use indicatif::{ProgressBar, ProgressStyle};
use inflector::Inflector;
use strum::IntoEnumIterator;

use crate::dialoguer::Dialoguer;
use crate::display::{playlists_table, print_header, print_playlist_details, tracks_table};
use crate::export::ExportFormat;
use crate::navigation::{parse_duration, parse_selection, transition, NavEvent, Screen};
use crate::paginator::Paginator;
use crate::playlist::Playlist;
use crate::randomize::{default_shuffled_name, RandomizeError};
use crate::session::Session;
use crate::sort::{PlaylistSortKey, SortDirection, TrackSortKey};

#[derive(Debug)]
pub struct NavigationError;
impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Navigation error")
    }
}
impl std::error::Error for NavigationError {}

pub type NavigationResult<T> = error_stack::Result<T, NavigationError>;

#[derive(Debug, Clone, Copy, PartialEq, strum_macros::Display, strum_macros::EnumIter)]
enum PlaylistListAction {
    SelectPlaylist,
    NextPage,
    PreviousPage,
    GoToPage,
    Sort,
    Refresh,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, strum_macros::Display, strum_macros::EnumIter)]
enum PlaylistAction {
    ViewTracks,
    Export,
    Randomize,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, strum_macros::Display, strum_macros::EnumIter)]
enum TrackListAction {
    NextPage,
    PreviousPage,
    GoToPage,
    ShowAll,
    Search,
    Sort,
    FilterByDuration,
    ClearFilters,
    Export,
    Back,
}

fn get_options<T: ToString>(actions: &[T]) -> Vec<String> {
    actions
        .iter()
        .map(|action| action.to_string().to_sentence_case())
        .collect()
}

/// Page actions that make sense on the current page.
fn page_actions<T: IntoEnumIterator + PartialEq + Copy>(
    has_next: bool,
    has_previous: bool,
    single_page: bool,
    next: T,
    previous: T,
    go_to: T,
) -> Vec<T> {
    T::iter()
        .filter(|action| {
            (*action != next || has_next)
                && (*action != previous || has_previous)
                && (*action != go_to || !single_page)
        })
        .collect()
}

/// Drives the interactive screens over a [`Session`] until the user quits.
pub struct Browser {
    session: Session,
    screen: Screen,
    /// Pages to come back to after leaving a list.
    playlist_page: usize,
    track_page: usize,
}

impl Browser {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            screen: Screen::Browsing,
            playlist_page: 1,
            track_page: 1,
        }
    }

    pub async fn run(&mut self) -> NavigationResult<()> {
        while self.screen != Screen::Exit {
            let event = match self.screen.clone() {
                Screen::Browsing => self.browse_playlists().await?,
                Screen::PlaylistDetail { playlist_id } => self.playlist_detail(&playlist_id).await?,
                Screen::TrackBrowsing { playlist_id } => self.browse_tracks(&playlist_id).await?,
                Screen::Exporting {
                    playlist_id,
                    from_tracks,
                } => self.export(&playlist_id, from_tracks).await?,
                Screen::Randomizing { playlist_id } => self.randomize(&playlist_id).await?,
                Screen::Exit => NavEvent::Quit,
            };
            match transition(&self.screen, event.clone()) {
                Some(next) => self.screen = next,
                None => log::warn!("{:?} ignored on {:?}", event, self.screen),
            }
        }
        println!("{}", "Goodbye!".cyan());
        Ok(())
    }

    /// Asks for a number between 1 and `max` until the answer is valid. A blank
    /// answer cancels.
    fn prompt_number(prompt_text: &str, max: usize) -> NavigationResult<Option<usize>> {
        loop {
            let answer = Dialoguer::input(format!("{} (1-{}, blank to cancel)", prompt_text, max))
                .change_context(NavigationError)?;
            if answer.trim().is_empty() {
                return Ok(None);
            }
            match parse_selection(&answer, max) {
                Ok(value) => return Ok(Some(value)),
                Err(error) => println!("{}", error.to_string().red()),
            }
        }
    }

    fn prompt_duration(prompt_text: &str) -> NavigationResult<Option<u32>> {
        loop {
            let answer = Dialoguer::input(format!(
                "{} (seconds or M:SS, blank to skip)",
                prompt_text
            ))
            .change_context(NavigationError)?;
            match parse_duration(&answer) {
                Ok(value) => return Ok(value),
                Err(error) => println!("{}", error.to_string().red()),
            }
        }
    }

    fn select_direction() -> NavigationResult<Option<SortDirection>> {
        let directions = SortDirection::iter().collect::<Vec<_>>();
        let options = vec![
            "Ascending (A-Z, 0-9, oldest first)",
            "Descending (Z-A, 9-0, newest first)",
        ];
        let selection = Dialoguer::select_optional("Sort order".to_string(), options, None)
            .change_context(NavigationError)?;
        Ok(selection.map(|index| directions[index]))
    }

    fn print_error<C: Context>(report: &Report<C>) {
        log::debug!("{:?}", report);
        println!("{}", format!("{}", report.current_context()).red());
        for message in report.frames().filter_map(|frame| frame.downcast_ref::<String>()) {
            println!("  {}", message.dimmed());
        }
    }

    async fn find_playlist(&mut self, playlist_id: &str) -> Option<Playlist> {
        match self.session.find_playlist(playlist_id).await {
            Ok(playlist) => Some(playlist),
            Err(report) => {
                Self::print_error(&report);
                None
            }
        }
    }

    async fn browse_playlists(&mut self) -> NavigationResult<NavEvent> {
        let mut paginator =
            Paginator::new(self.session.playlists(false).await).starting_at(self.playlist_page);
        loop {
            print_header(
                &format!("Your playlists ({} total)", paginator.total_items()),
                Some(&format!(
                    "{} | Sorted by {}",
                    paginator.range_description(),
                    self.session.sort.playlist_description()
                )),
            );
            if let Some(age) = self.session.cache().age() {
                println!("{}", format!("Fetched {}s ago", age.num_seconds()).dimmed());
            }
            if paginator.total_items() == 0 {
                println!("{}", "No playlists found".yellow());
            } else {
                println!(
                    "{}",
                    playlists_table(paginator.current(), paginator.start_index())
                );
            }

            let actions = page_actions(
                paginator.has_next(),
                paginator.has_previous(),
                paginator.total_pages() == 1,
                PlaylistListAction::NextPage,
                PlaylistListAction::PreviousPage,
                PlaylistListAction::GoToPage,
            )
            .into_iter()
            .filter(|action| {
                *action != PlaylistListAction::SelectPlaylist || paginator.total_items() > 0
            })
            .collect::<Vec<_>>();
            let Some(selection) =
                Dialoguer::select_optional("Select".to_string(), get_options(&actions), None)
                    .change_context(NavigationError)?
            else {
                return Ok(NavEvent::Quit);
            };
            match actions[selection] {
                PlaylistListAction::SelectPlaylist => {
                    if let Some(number) =
                        Self::prompt_number("Playlist #", paginator.total_items())?
                    {
                        let playlist = &paginator.items()[number - 1];
                        self.playlist_page = paginator.current_page();
                        return Ok(NavEvent::Open(playlist.id.clone()));
                    }
                }
                PlaylistListAction::NextPage => {
                    paginator.next();
                }
                PlaylistListAction::PreviousPage => {
                    paginator.previous();
                }
                PlaylistListAction::GoToPage => {
                    if let Some(page) = Self::prompt_number("Page", paginator.total_pages())? {
                        paginator.go_to(page);
                    }
                }
                PlaylistListAction::Sort => {
                    let keys = PlaylistSortKey::iter().collect::<Vec<_>>();
                    let options = keys.iter().map(|key| key.label()).collect::<Vec<_>>();
                    let Some(index) =
                        Dialoguer::select_optional("Sort playlists by".to_string(), options, None)
                            .change_context(NavigationError)?
                    else {
                        continue;
                    };
                    let Some(direction) = Self::select_direction()? else {
                        continue;
                    };
                    self.session.sort.playlist_key = keys[index];
                    self.session.sort.playlist_direction = direction;
                    paginator = Paginator::new(self.session.playlists(false).await);
                }
                PlaylistListAction::Refresh => {
                    paginator = Paginator::new(self.session.playlists(true).await);
                    println!("{}", "Playlists refreshed".green());
                }
                PlaylistListAction::Exit => return Ok(NavEvent::Quit),
            }
        }
    }

    async fn playlist_detail(&mut self, playlist_id: &str) -> NavigationResult<NavEvent> {
        let Some(playlist) = self.find_playlist(playlist_id).await else {
            return Ok(NavEvent::Back);
        };
        print_playlist_details(&playlist);
        let actions = PlaylistAction::iter().collect::<Vec<_>>();
        let selection =
            Dialoguer::select_optional("Select".to_string(), get_options(&actions), None)
                .change_context(NavigationError)?;
        let event = match selection.map(|index| actions[index]) {
            Some(PlaylistAction::ViewTracks) => {
                self.session.start_track_browsing();
                self.track_page = 1;
                NavEvent::ViewTracks
            }
            Some(PlaylistAction::Export) => NavEvent::Export,
            Some(PlaylistAction::Randomize) => NavEvent::Randomize,
            Some(PlaylistAction::Back) | None => NavEvent::Back,
        };
        Ok(event)
    }

    async fn browse_tracks(&mut self, playlist_id: &str) -> NavigationResult<NavEvent> {
        let Some(playlist) = self.find_playlist(playlist_id).await else {
            return Ok(NavEvent::Back);
        };
        let total = match self.session.tracks(playlist_id).await {
            Ok(tracks) => tracks.len(),
            Err(report) => {
                Self::print_error(&report);
                return Ok(NavEvent::Back);
            }
        };
        if total == 0 {
            println!("{}", "No tracks found".yellow());
            return Ok(NavEvent::Back);
        }

        let mut paginator =
            Paginator::new(self.session.track_view(playlist_id)).starting_at(self.track_page);
        loop {
            let mut status = vec![];
            let filter_status = self.session.filter.status_line();
            if !filter_status.is_empty() {
                status.push(filter_status);
            }
            if self.session.sort.track_key != TrackSortKey::Original {
                status.push(format!("Sort: {}", self.session.sort.track_description()));
            }
            if paginator.total_items() != total {
                status.push(format!("Filtered: {}/{}", paginator.total_items(), total));
            }
            print_header(
                &format!("Tracks: {}", playlist.name),
                Some(&paginator.range_description()),
            );
            if !status.is_empty() {
                println!("{}", status.join(" | ").yellow());
            }
            if paginator.total_items() == 0 {
                println!("{}", "No tracks match the current filters".yellow());
            } else {
                println!("{}", tracks_table(paginator.current()));
            }

            let actions = page_actions(
                paginator.has_next(),
                paginator.has_previous(),
                paginator.total_pages() == 1,
                TrackListAction::NextPage,
                TrackListAction::PreviousPage,
                TrackListAction::GoToPage,
            )
            .into_iter()
            .filter(|action| {
                *action != TrackListAction::ClearFilters || self.session.filter.is_active()
            })
            .collect::<Vec<_>>();
            let Some(selection) =
                Dialoguer::select_optional("Select".to_string(), get_options(&actions), None)
                    .change_context(NavigationError)?
            else {
                return Ok(NavEvent::Back);
            };
            match actions[selection] {
                TrackListAction::NextPage => {
                    paginator.next();
                    continue;
                }
                TrackListAction::PreviousPage => {
                    paginator.previous();
                    continue;
                }
                TrackListAction::GoToPage => {
                    if let Some(page) = Self::prompt_number("Page", paginator.total_pages())? {
                        paginator.go_to(page);
                    }
                    continue;
                }
                TrackListAction::ShowAll => {
                    print_header(
                        &format!("All tracks: {}", playlist.name),
                        Some(&format!("Total: {} tracks", paginator.total_items())),
                    );
                    println!("{}", tracks_table(paginator.items()));
                    continue;
                }
                TrackListAction::Search => {
                    let term = Dialoguer::input(
                        "Search artist/song/album (blank to clear)".to_string(),
                    )
                    .change_context(NavigationError)?;
                    self.session.filter.set_search(&term);
                }
                TrackListAction::Sort => {
                    let keys = TrackSortKey::iter().collect::<Vec<_>>();
                    let options = keys.iter().map(|key| key.label()).collect::<Vec<_>>();
                    let Some(index) =
                        Dialoguer::select_optional("Sort tracks by".to_string(), options, None)
                            .change_context(NavigationError)?
                    else {
                        continue;
                    };
                    let direction = if keys[index] == TrackSortKey::Original {
                        SortDirection::Asc
                    } else {
                        match Self::select_direction()? {
                            Some(direction) => direction,
                            None => continue,
                        }
                    };
                    self.session.sort.track_key = keys[index];
                    self.session.sort.track_direction = direction;
                }
                TrackListAction::FilterByDuration => {
                    let min_duration = Self::prompt_duration("Minimum duration")?;
                    let max_duration = Self::prompt_duration("Maximum duration")?;
                    self.session
                        .filter
                        .set_duration_range(min_duration, max_duration);
                }
                TrackListAction::ClearFilters => self.session.filter.clear(),
                TrackListAction::Export => {
                    self.track_page = paginator.current_page();
                    return Ok(NavEvent::Export);
                }
                TrackListAction::Back => {
                    self.session.start_track_browsing();
                    self.track_page = 1;
                    return Ok(NavEvent::Back);
                }
            }
            paginator = Paginator::new(self.session.track_view(playlist_id));
        }
    }

    async fn export(&mut self, playlist_id: &str, from_tracks: bool) -> NavigationResult<NavEvent> {
        let Some(playlist) = self.find_playlist(playlist_id).await else {
            return Ok(NavEvent::Back);
        };
        print_header(
            "Export playlist",
            Some(&format!(
                "{} | into {}",
                playlist.name,
                self.session.exporter().export_dir().display()
            )),
        );
        let formats = ExportFormat::iter().collect::<Vec<_>>();
        let options = formats
            .iter()
            .map(|format| format.description())
            .collect::<Vec<_>>();
        let Some(index) = Dialoguer::select_optional("Format".to_string(), options, None)
            .change_context(NavigationError)?
        else {
            return Ok(NavEvent::Back);
        };
        match self
            .session
            .export(&playlist, formats[index], from_tracks)
            .await
        {
            Ok(path) => println!(
                "{} {}",
                "Exported to".green(),
                path.display().to_string().cyan()
            ),
            Err(report) => Self::print_error(&report),
        }
        Ok(NavEvent::Done)
    }

    async fn randomize(&mut self, playlist_id: &str) -> NavigationResult<NavEvent> {
        let Some(playlist) = self.find_playlist(playlist_id).await else {
            return Ok(NavEvent::Back);
        };
        print_header("Randomize playlist", Some(&playlist.name));
        let new_name = Dialoguer::input_with_default(
            "Name of the shuffled copy".to_string(),
            Some(default_shuffled_name(&playlist.name)),
        )
        .change_context(NavigationError)?;
        let new_name = if new_name.trim().is_empty() {
            default_shuffled_name(&playlist.name)
        } else {
            new_name.trim().to_string()
        };
        let prompt_text = format!(
            "Create {} with the {} tracks of {} in random order?",
            new_name.cyan(),
            playlist.track_count,
            playlist.name.cyan()
        );
        if !Dialoguer::select_yes_or_no(prompt_text).change_context(NavigationError)? {
            return Ok(NavEvent::Back);
        }

        let progress = ProgressBar::new(u64::from(playlist.track_count));
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{wide_bar:.white/blue}] {pos}/{len} tracks added")
                .into_report()
                .change_context(NavigationError)?
                .progress_chars("█  "),
        );
        match self
            .session
            .randomize(&playlist.id, &new_name, rand::thread_rng(), progress)
            .await
        {
            Ok(outcome) => {
                println!(
                    "{} {} ({} tracks, id {})",
                    "Created".green(),
                    outcome.new_playlist_name.cyan(),
                    outcome.tracks_added,
                    outcome.new_playlist_id
                );
                Ok(NavEvent::Done)
            }
            Err(report) => {
                if let RandomizeError::PartialFailure {
                    new_playlist_id, ..
                } = report.current_context()
                {
                    println!(
                        "{}",
                        format!(
                            "The incomplete playlist {} was left in place, refresh to see it",
                            new_playlist_id
                        )
                        .yellow()
                    );
                }
                Self::print_error(&report);
                Ok(NavEvent::Back)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_are_sentence_case() {
        let actions = PlaylistListAction::iter().collect::<Vec<_>>();
        let options = get_options(&actions);
        assert_eq!(options[0], "Select playlist");
        assert_eq!(options[3], "Go to page");
    }

    #[test]
    fn test_page_actions_hide_impossible_moves() {
        let actions = page_actions(
            false,
            false,
            true,
            TrackListAction::NextPage,
            TrackListAction::PreviousPage,
            TrackListAction::GoToPage,
        );
        assert!(!actions.contains(&TrackListAction::NextPage));
        assert!(!actions.contains(&TrackListAction::PreviousPage));
        assert!(!actions.contains(&TrackListAction::GoToPage));
        assert!(actions.contains(&TrackListAction::Search));

        let actions = page_actions(
            true,
            false,
            false,
            PlaylistListAction::NextPage,
            PlaylistListAction::PreviousPage,
            PlaylistListAction::GoToPage,
        );
        assert!(actions.contains(&PlaylistListAction::NextPage));
        assert!(actions.contains(&PlaylistListAction::GoToPage));
        assert!(!actions.contains(&PlaylistListAction::PreviousPage));
    }
}
