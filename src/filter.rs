use crate::playlist::track::Track;
use crate::utils::format_duration;

/// Track predicates of the current browsing session. Every field is optional;
/// an empty filter keeps every track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_term: Option<String>,
    /// Inclusive, in seconds.
    pub min_duration: Option<u32>,
    /// Inclusive, in seconds.
    pub max_duration: Option<u32>,
}

impl FilterState {
    /// Stores the term trimmed; a blank term clears the search.
    pub fn set_search(&mut self, term: &str) {
        let term = term.trim();
        self.search_term = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
    }

    pub fn set_duration_range(&mut self, min_duration: Option<u32>, max_duration: Option<u32>) {
        self.min_duration = min_duration;
        self.max_duration = max_duration;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.search_needle().is_some() || self.min_duration.is_some() || self.max_duration.is_some()
    }

    pub fn matches(&self, track: &Track) -> bool {
        if let Some(needle) = self.search_needle() {
            let found = [&track.artist, &track.name, &track.album]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        if self.min_duration.is_some_and(|min| track.duration < min) {
            return false;
        }
        if self.max_duration.is_some_and(|max| track.duration > max) {
            return false;
        }
        true
    }

    /// Keeps the matching tracks in their current order.
    pub fn apply(&self, tracks: &[Track]) -> Vec<Track> {
        tracks
            .iter()
            .filter(|track| self.matches(track))
            .cloned()
            .collect()
    }

    /// e.g. `Search: 'love' | Duration: 3:00-5:00`, empty when inactive.
    pub fn status_line(&self) -> String {
        let mut parts = vec![];
        if let Some(term) = &self.search_term {
            parts.push(format!("Search: '{}'", term));
        }
        let duration = match (self.min_duration, self.max_duration) {
            (Some(min), Some(max)) => Some(format!(
                "{}-{}",
                format_duration(min),
                format_duration(max)
            )),
            (Some(min), None) => Some(format!(">= {}", format_duration(min))),
            (None, Some(max)) => Some(format!("<= {}", format_duration(max))),
            (None, None) => None,
        };
        if let Some(duration) = duration {
            parts.push(format!("Duration: {}", duration));
        }
        parts.join(" | ")
    }

    fn search_needle(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }
}
