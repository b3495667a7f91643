use std::path::{Path, PathBuf};
use std::{fmt, fs};

use chrono::{DateTime, Utc};
use error_stack::{IntoReport, ResultExt};
use serde::{Deserialize, Serialize};

use crate::playlist::track::Track;
use crate::playlist::Playlist;
use crate::utils::{format_duration, sanitize_filename};

#[derive(Debug, Clone)]
pub struct ExportError;
impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Export error")
    }
}
impl std::error::Error for ExportError {}

pub type ExportResult<T> = error_stack::Result<T, ExportError>;

const CSV_HEADER: [&str; 8] = [
    "#",
    "Track ID",
    "Artist",
    "Song",
    "Album",
    "Duration",
    "Track Number",
    "ISRC",
];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ExportFormat {
    #[strum(to_string = "json")]
    Json,
    #[strum(to_string = "csv")]
    Csv,
    #[strum(to_string = "txt")]
    Txt,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON (structured data)",
            ExportFormat::Csv => "CSV (spreadsheet)",
            ExportFormat::Txt => "TXT (plain text)",
        }
    }
}

/// Document written by the JSON export.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlaylistExport {
    pub playlist_name: String,
    pub playlist_id: String,
    pub playlist_type: String,
    pub is_owned: bool,
    pub creator: String,
    pub total_tracks: usize,
    pub exported_at: String,
    pub tracks: Vec<ExportedTrack>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExportedTrack {
    pub position: usize,
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration: u32,
    pub duration_formatted: String,
    pub track_number: Option<u32>,
    pub isrc: Option<String>,
}

impl ExportedTrack {
    /// Rebuilds the track, indexed by its position in the export.
    pub fn to_track(&self) -> Track {
        Track {
            id: self.id.clone(),
            name: self.name.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            duration: self.duration,
            track_number: self.track_number,
            isrc: self.isrc.clone(),
            original_index: self.position,
        }
    }
}

impl PlaylistExport {
    fn new(playlist: &Playlist, tracks: &[Track], exported_at: DateTime<Utc>) -> Self {
        Self {
            playlist_name: playlist.name.clone(),
            playlist_id: playlist.id.clone(),
            playlist_type: playlist.playlist_type.to_string(),
            is_owned: playlist.is_owned,
            creator: playlist.creator_name.clone(),
            total_tracks: tracks.len(),
            exported_at: exported_at.to_rfc3339(),
            tracks: tracks
                .iter()
                .enumerate()
                .map(|(index, track)| ExportedTrack {
                    position: index + 1,
                    id: track.id.clone(),
                    name: track.name.clone(),
                    artist: track.artist.clone(),
                    album: track.album.clone(),
                    duration: track.duration,
                    duration_formatted: track.formatted_duration(),
                    track_number: track.track_number,
                    isrc: track.isrc.clone(),
                })
                .collect(),
        }
    }
}

/// Writes playlists into a single export directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// `<export_dir>/playlist_<id>.<ext>`
    pub fn file_path(&self, playlist_id: &str, format: ExportFormat) -> PathBuf {
        self.export_dir.join(format!(
            "playlist_{}.{}",
            sanitize_filename(playlist_id),
            format.extension()
        ))
    }

    /// Writes `tracks`, in the given order, to the playlist export file and
    /// returns its path. The file is either fully written or left untouched.
    pub fn export(
        &self,
        playlist: &Playlist,
        tracks: &[Track],
        format: ExportFormat,
    ) -> ExportResult<PathBuf> {
        let content = render(playlist, tracks, format, Utc::now())?;
        fs::create_dir_all(&self.export_dir)
            .into_report()
            .attach_printable(format!(
                "Failed to create the export directory {}",
                self.export_dir.display()
            ))
            .change_context(ExportError)?;
        let path = self.file_path(&playlist.id, format);
        write_atomically(&path, &content)?;
        log::info!(
            "Exported {} tracks of {} to {}",
            tracks.len(),
            playlist.id,
            path.display()
        );
        Ok(path)
    }
}

fn write_atomically(path: &Path, content: &str) -> ExportResult<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(ExportError)
        .into_report()
        .attach_printable(format!("Invalid export path {}", path.display()))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));
    let result = fs::write(&temp_path, content)
        .and_then(|_| fs::rename(&temp_path, path))
        .into_report()
        .attach_printable(format!("Failed to write {}", path.display()))
        .change_context(ExportError);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Parses a file written by the JSON export.
pub fn read_json_export(path: &Path) -> ExportResult<PlaylistExport> {
    let content = fs::read_to_string(path)
        .into_report()
        .attach_printable(format!("Failed to read {}", path.display()))
        .change_context(ExportError)?;
    serde_json::from_str(&content)
        .into_report()
        .attach_printable(format!("{} is not a playlist JSON export", path.display()))
        .change_context(ExportError)
}

pub fn render(
    playlist: &Playlist,
    tracks: &[Track],
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> ExportResult<String> {
    match format {
        ExportFormat::Json => render_json(playlist, tracks, exported_at),
        ExportFormat::Csv => Ok(render_csv(tracks)),
        ExportFormat::Txt => Ok(render_txt(playlist, tracks, exported_at)),
    }
}

fn render_json(
    playlist: &Playlist,
    tracks: &[Track],
    exported_at: DateTime<Utc>,
) -> ExportResult<String> {
    let document = PlaylistExport::new(playlist, tracks, exported_at);
    serde_json::to_string_pretty(&document)
        .into_report()
        .attach_printable(format!("Failed to serialize playlist {}", playlist.id))
        .change_context(ExportError)
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn render_csv(tracks: &[Track]) -> String {
    let mut lines = vec![CSV_HEADER.join(",")];
    for (index, track) in tracks.iter().enumerate() {
        let row = [
            (index + 1).to_string(),
            track.id.clone(),
            track.artist.clone(),
            track.name.clone(),
            track.album.clone(),
            track.formatted_duration(),
            track
                .track_number
                .map(|number| number.to_string())
                .unwrap_or_default(),
            track.isrc.clone().unwrap_or_default(),
        ];
        lines.push(
            row.iter()
                .map(|field| escape_csv(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    let mut content = lines.join("\r\n");
    content.push_str("\r\n");
    content
}

fn render_txt(playlist: &Playlist, tracks: &[Track], exported_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        format!("Playlist: {}", playlist.name),
        format!("ID: {}", playlist.id),
        format!("Type: {}", playlist.playlist_type),
        format!("Creator: {}", playlist.creator_name),
        format!("Total Tracks: {}", tracks.len()),
        format!("Exported: {}", exported_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        "=".repeat(80),
        String::new(),
    ];
    for (index, track) in tracks.iter().enumerate() {
        lines.push(format!("{}. {}", index + 1, track.name));
        lines.push(format!(
            "   Artist: {} | Album: {} | Duration: {}",
            track.artist,
            track.album,
            format_duration(track.duration)
        ));
        lines.push(format!("   Track ID: {}", track.id));
        lines.push(String::new());
    }
    let mut content = lines.join("\n");
    content.push('\n');
    content
}
