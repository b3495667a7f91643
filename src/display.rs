use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::playlist::track::Track;
use crate::playlist::{Playlist, PlaylistType};
use crate::profile::Dashboard;
use crate::utils::{format_date_short, format_duration, truncate_string};

const NAME_WIDTH: usize = 48;
const ARTIST_WIDTH: usize = 20;
const SONG_WIDTH: usize = 38;
const ALBUM_WIDTH: usize = 20;

fn new_table<T: ToString>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.into_iter().map(|title| Cell::new(title.to_string())));
    table
}

fn right(content: String) -> Cell {
    Cell::new(content).set_alignment(CellAlignment::Right)
}

pub fn print_header(title: &str, subtitle: Option<&str>) {
    println!();
    println!("{}", title.to_uppercase().cyan().bold());
    if let Some(subtitle) = subtitle {
        println!("{}", subtitle.dimmed());
    }
}

fn type_label(playlist_type: PlaylistType) -> &'static str {
    match playlist_type {
        PlaylistType::Owned => "Owned",
        PlaylistType::Favorite => "Favorite",
        PlaylistType::Editorial => "Editorial",
    }
}

/// Playlists numbered from `start_index + 1`.
pub fn playlists_table(playlists: &[Playlist], start_index: usize) -> Table {
    let mut table = new_table(vec!["#", "Name", "Type", "Tracks", "Duration", "Updated"]);
    for (offset, playlist) in playlists.iter().enumerate() {
        table.add_row(vec![
            right((start_index + offset + 1).to_string()),
            Cell::new(truncate_string(&playlist.name, NAME_WIDTH)),
            Cell::new(type_label(playlist.playlist_type)),
            right(playlist.track_count.to_string()),
            right(playlist.formatted_duration()),
            right(format_date_short(playlist.updated_at)),
        ]);
    }
    table
}

/// Tracks numbered by their position in the playlist.
pub fn tracks_table(tracks: &[Track]) -> Table {
    let mut table = new_table(vec!["#", "Artist", "Song", "Album", "Duration"]);
    for track in tracks {
        table.add_row(vec![
            right(track.original_index.to_string()),
            Cell::new(truncate_string(&track.artist, ARTIST_WIDTH)),
            Cell::new(truncate_string(&track.name, SONG_WIDTH)),
            Cell::new(truncate_string(&track.album, ALBUM_WIDTH)),
            right(format_duration(track.duration)),
        ]);
    }
    table
}

pub fn print_playlist_details(playlist: &Playlist) {
    print_header(&playlist.name, None);
    let badge = format!("[{}]", playlist.playlist_type.badge());
    let badge = match playlist.playlist_type {
        PlaylistType::Owned => badge.green(),
        PlaylistType::Favorite => badge.yellow(),
        PlaylistType::Editorial => badge.magenta(),
    };
    println!("{} Creator: {}", badge, playlist.creator_name);
    if let Some(description) = &playlist.description {
        println!("\n{}", description.trim());
    }

    let public = if playlist.is_public { "Yes" } else { "No" };
    let table = fields_table(&[
        ("Tracks".to_string(), playlist.track_count.to_string()),
        ("Duration".to_string(), playlist.formatted_duration()),
        ("Videos".to_string(), playlist.video_count.to_string()),
        ("Public".to_string(), public.to_string()),
        ("Created".to_string(), format_date_short(playlist.created_at)),
        ("Updated".to_string(), format_date_short(playlist.updated_at)),
        ("Url".to_string(), playlist.listen_url.clone()),
        ("Id".to_string(), playlist.id.clone()),
    ]);
    println!("{table}");
}

/// Two-column table of labelled values.
pub fn fields_table(rows: &[(String, String)]) -> Table {
    let mut table = new_table(vec!["Field", "Value"]);
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}

pub fn print_dashboard(dashboard: &Dashboard, now: DateTime<Utc>) {
    print_header("User dashboard", None);

    println!("\n{}", "Account".bold());
    println!("{}", fields_table(&dashboard.account_rows(now)));

    println!("\n{}", "Subscription".bold());
    let subscription = dashboard.subscription_rows(now);
    if subscription.is_empty() {
        println!("{}", "Could not fetch subscription details".yellow());
    } else {
        println!("{}", fields_table(&subscription));
    }

    println!("\n{}", "Library".bold());
    println!("{}", fields_table(&dashboard.library_rows()));
}

#[cfg(test)]
mod tests {
    use crate::tidal::testing::raw_playlist;

    use super::*;

    #[test]
    fn test_playlists_table_numbers_from_page_start() {
        let playlists = vec![
            Playlist::from_raw(raw_playlist("a", "Alpha"), "42"),
            Playlist::from_raw(raw_playlist("b", "Beta"), "42"),
        ];
        let mut table = playlists_table(&playlists, 20);
        table.set_width(200);
        let rendered = table.to_string();
        assert!(rendered.contains("21"));
        assert!(rendered.contains("22"));
        assert!(rendered.contains("Favorite"));
        assert!(rendered.contains("N/A"));
    }

    #[test]
    fn test_fields_table_keeps_row_order() {
        let mut table = fields_table(&[
            ("Tracks".to_string(), "12".to_string()),
            ("Public".to_string(), "No".to_string()),
        ]);
        table.set_width(200);
        let rendered = table.to_string();
        let tracks = rendered.find("Tracks").unwrap();
        let public = rendered.find("Public").unwrap();
        assert!(tracks < public);
        assert!(rendered.contains("12"));
    }

    #[test]
    fn test_tracks_table_truncates_long_titles() {
        let track = Track {
            id: "1".to_string(),
            name: "A".repeat(60),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration: 75,
            track_number: None,
            isrc: None,
            original_index: 3,
        };
        let mut table = tracks_table(&[track]);
        table.set_width(200);
        let rendered = table.to_string();
        assert!(rendered.contains(&format!("{}...", "A".repeat(35))));
        assert!(rendered.contains("1:15"));
    }
}
