use thiserror::Error;

pub mod browser;

/// Screens of the interactive browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Browsing,
    PlaylistDetail {
        playlist_id: String,
    },
    TrackBrowsing {
        playlist_id: String,
    },
    /// `from_tracks` exports the current track view and returns to it.
    Exporting {
        playlist_id: String,
        from_tracks: bool,
    },
    Randomizing {
        playlist_id: String,
    },
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    Open(String),
    ViewTracks,
    Export,
    Randomize,
    Done,
    Back,
    Quit,
}

/// Next screen for `event`, or `None` when the event means nothing on
/// `screen`.
pub fn transition(screen: &Screen, event: NavEvent) -> Option<Screen> {
    use NavEvent::*;
    use Screen::*;

    let next = match (screen, event) {
        (Exit, _) => return None,
        (_, Quit) => Exit,
        (Browsing, Open(playlist_id)) => PlaylistDetail { playlist_id },
        (Browsing, Back) => Exit,
        (PlaylistDetail { playlist_id }, ViewTracks) => TrackBrowsing {
            playlist_id: playlist_id.clone(),
        },
        (PlaylistDetail { playlist_id }, Export) => Exporting {
            playlist_id: playlist_id.clone(),
            from_tracks: false,
        },
        (PlaylistDetail { playlist_id }, Randomize) => Randomizing {
            playlist_id: playlist_id.clone(),
        },
        (PlaylistDetail { .. }, Back) => Browsing,
        (TrackBrowsing { playlist_id }, Export) => Exporting {
            playlist_id: playlist_id.clone(),
            from_tracks: true,
        },
        (TrackBrowsing { playlist_id }, Back) => PlaylistDetail {
            playlist_id: playlist_id.clone(),
        },
        (
            Exporting {
                playlist_id,
                from_tracks: true,
            },
            Done | Back,
        ) => TrackBrowsing {
            playlist_id: playlist_id.clone(),
        },
        (
            Exporting {
                playlist_id,
                from_tracks: false,
            },
            Done | Back,
        ) => PlaylistDetail {
            playlist_id: playlist_id.clone(),
        },
        // the new playlist only shows up in a fresh listing
        (Randomizing { .. }, Done) => Browsing,
        (Randomizing { playlist_id }, Back) => PlaylistDetail {
            playlist_id: playlist_id.clone(),
        },
        _ => return None,
    };
    Some(next)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{value} is out of range, pick a number between 1 and {max}")]
    OutOfRange { value: usize, max: usize },
}

pub type InputResult<T> = Result<T, InputError>;

/// Parses a 1-based selection among `max` entries.
pub fn parse_selection(input: &str, max: usize) -> InputResult<usize> {
    let input = input.trim();
    let value: usize = input
        .parse()
        .map_err(|_| InputError::NotANumber(input.to_string()))?;
    if value == 0 || value > max {
        return Err(InputError::OutOfRange { value, max });
    }
    Ok(value)
}

/// Parses a duration typed as seconds (`180`) or as `M:SS`/`H:MM:SS`.
/// A blank answer means no bound.
pub fn parse_duration(input: &str) -> InputResult<Option<u32>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let not_a_number = || InputError::NotANumber(input.to_string());
    let parts = input
        .split(':')
        .map(|part| part.parse::<u32>().map_err(|_| not_a_number()))
        .collect::<InputResult<Vec<u32>>>()?;
    if parts.len() > 3 || parts.iter().skip(1).any(|part| *part >= 60) {
        return Err(not_a_number());
    }
    let seconds = parts
        .iter()
        .try_fold(0u32, |total, part| total.checked_mul(60)?.checked_add(*part))
        .ok_or_else(not_a_number)?;
    Ok(Some(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str) -> Screen {
        Screen::PlaylistDetail {
            playlist_id: id.to_string(),
        }
    }

    fn tracks(id: &str) -> Screen {
        Screen::TrackBrowsing {
            playlist_id: id.to_string(),
        }
    }

    #[test]
    fn test_browse_into_tracks_and_back() {
        let screen = transition(&Screen::Browsing, NavEvent::Open("p".to_string())).unwrap();
        assert_eq!(screen, detail("p"));
        let screen = transition(&screen, NavEvent::ViewTracks).unwrap();
        assert_eq!(screen, tracks("p"));
        let screen = transition(&screen, NavEvent::Back).unwrap();
        assert_eq!(screen, detail("p"));
        let screen = transition(&screen, NavEvent::Back).unwrap();
        assert_eq!(screen, Screen::Browsing);
        assert_eq!(transition(&screen, NavEvent::Back), Some(Screen::Exit));
    }

    #[test]
    fn test_export_returns_where_it_started() {
        let from_tracks = transition(&tracks("p"), NavEvent::Export).unwrap();
        assert_eq!(
            from_tracks,
            Screen::Exporting {
                playlist_id: "p".to_string(),
                from_tracks: true
            }
        );
        assert_eq!(transition(&from_tracks, NavEvent::Done), Some(tracks("p")));

        let from_detail = transition(&detail("p"), NavEvent::Export).unwrap();
        assert_eq!(transition(&from_detail, NavEvent::Back), Some(detail("p")));
    }

    #[test]
    fn test_randomize_outcomes() {
        let randomizing = transition(&detail("p"), NavEvent::Randomize).unwrap();
        assert_eq!(transition(&randomizing, NavEvent::Done), Some(Screen::Browsing));
        assert_eq!(transition(&randomizing, NavEvent::Back), Some(detail("p")));
    }

    #[test]
    fn test_invalid_events_are_ignored() {
        assert_eq!(transition(&Screen::Browsing, NavEvent::ViewTracks), None);
        assert_eq!(transition(&tracks("p"), NavEvent::Randomize), None);
        assert_eq!(transition(&Screen::Exit, NavEvent::Back), None);
        assert_eq!(transition(&tracks("p"), NavEvent::Quit), Some(Screen::Exit));
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection(" 3 ", 5), Ok(3));
        assert_eq!(
            parse_selection("abc", 5),
            Err(InputError::NotANumber("abc".to_string()))
        );
        assert_eq!(
            parse_selection("0", 5),
            Err(InputError::OutOfRange { value: 0, max: 5 })
        );
        assert_eq!(
            parse_selection("6", 5),
            Err(InputError::OutOfRange { value: 6, max: 5 })
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(""), Ok(None));
        assert_eq!(parse_duration("180"), Ok(Some(180)));
        assert_eq!(parse_duration("3:05"), Ok(Some(185)));
        assert_eq!(parse_duration("1:00:00"), Ok(Some(3600)));
        assert!(parse_duration("3:75").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("three").is_err());
    }
}
