use chrono::{DateTime, Utc};

use crate::playlist::{parse_tidal_date, Playlist, PlaylistType};
use crate::tidal::{RawSubscription, RawUser};
use crate::utils::format_date_short;

const HI_RES: &str = "HI_RES";

/// Playlist counts of the user's library.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStats {
    pub total: usize,
    pub owned: usize,
    pub favorite: usize,
    pub editorial: usize,
}

impl LibraryStats {
    pub fn from_playlists(playlists: &[Playlist]) -> Self {
        playlists
            .iter()
            .fold(Self::default(), |mut stats, playlist| {
                stats.total += 1;
                match playlist.playlist_type {
                    PlaylistType::Owned => stats.owned += 1,
                    PlaylistType::Favorite => stats.favorite += 1,
                    PlaylistType::Editorial => stats.editorial += 1,
                }
                stats
            })
    }
}

/// Everything the `profile` command shows. A missing subscription means it
/// could not be fetched.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub user: RawUser,
    pub country_code: String,
    pub subscription: Option<RawSubscription>,
    pub library: LibraryStats,
}

fn plural(amount: i64, unit: &str) -> String {
    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}

fn yes_no(value: Option<bool>) -> String {
    let answer = if value.unwrap_or(false) { "Yes" } else { "No" };
    answer.to_string()
}

fn or_na(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .unwrap_or("N/A")
        .to_string()
}

/// Time elapsed since `since`, in years and months, e.g. "2 years, 3 months".
/// Days are only counted for spans under a year.
pub fn describe_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - since).num_days().max(0);
    let years = days / 365;
    let months = (days % 365) / 30;
    let rest = (days % 365) % 30;
    let mut parts = vec![];
    if years > 0 {
        parts.push(plural(years, "year"));
    }
    if months > 0 {
        parts.push(plural(months, "month"));
    }
    if rest > 0 && years == 0 {
        parts.push(plural(rest, "day"));
    }
    if parts.is_empty() {
        return "Less than a day".to_string();
    }
    parts.join(", ")
}

/// Time left until `until`, or `EXPIRED` once it has passed.
pub fn describe_time_remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = until - now;
    if remaining.num_seconds() <= 0 {
        return "EXPIRED".to_string();
    }
    let days = remaining.num_days();
    match days {
        0 => format!("{} hours", remaining.num_hours()),
        1..=29 => plural(days, "day"),
        30..=364 => {
            let months = plural(days / 30, "month");
            match days % 30 {
                0 => months,
                rest => format!("{}, {}", months, plural(rest, "day")),
            }
        }
        _ => {
            let years = plural(days / 365, "year");
            match (days % 365) / 30 {
                0 => years,
                months => format!("{}, {}", years, plural(months, "month")),
            }
        }
    }
}

fn dated(value: &Option<String>, describe: impl Fn(DateTime<Utc>) -> String) -> Option<String> {
    let date = value.as_deref().and_then(parse_tidal_date)?;
    Some(format!("{} ({})", format_date_short(Some(date)), describe(date)))
}

impl Dashboard {
    pub fn account_rows(&self, now: DateTime<Utc>) -> Vec<(String, String)> {
        let user = &self.user;
        let full_name = format!(
            "{} {}",
            user.first_name.as_deref().unwrap_or_default(),
            user.last_name.as_deref().unwrap_or_default()
        );
        let full_name = match full_name.trim() {
            "" => "N/A".to_string(),
            name => name.to_string(),
        };
        let mut rows = vec![
            ("Name".to_string(), full_name),
            ("Email".to_string(), or_na(&user.email)),
            ("Username".to_string(), or_na(&user.username)),
            ("User ID".to_string(), user.id.clone()),
            ("Country".to_string(), self.country_code.clone()),
        ];
        if let Some(created) = dated(&user.created, |date| {
            format!("Age: {}", describe_age(date, now))
        }) {
            rows.push(("Created".to_string(), created));
        }
        rows.push((
            "Date of Birth".to_string(),
            user.date_of_birth
                .clone()
                .unwrap_or_else(|| "Not provided".to_string()),
        ));
        rows.push((
            "Newsletter".to_string(),
            if user.newsletter.unwrap_or(false) {
                "Subscribed"
            } else {
                "Not Subscribed"
            }
            .to_string(),
        ));
        rows
    }

    /// Empty when the subscription could not be fetched.
    pub fn subscription_rows(&self, now: DateTime<Utc>) -> Vec<(String, String)> {
        let Some(subscription) = &self.subscription else {
            return vec![];
        };
        let plan = subscription.subscription.clone().unwrap_or_default();
        let quality = match subscription.highest_sound_quality.as_deref() {
            Some(HI_RES) => format!("{} (Lossless)", HI_RES),
            _ => or_na(&subscription.highest_sound_quality),
        };
        let mut rows = vec![
            ("Type".to_string(), or_na(&plan.plan_type)),
            ("Status".to_string(), or_na(&subscription.status)),
            ("Sound Quality".to_string(), quality),
            ("Payment".to_string(), or_na(&subscription.payment_type)),
        ];
        if let Some(started) = dated(&subscription.start_date, |date| {
            format!("Age: {}", describe_age(date, now))
        }) {
            rows.push(("Started".to_string(), started));
        }
        if let Some(valid_until) = dated(&subscription.valid_until, |date| {
            match describe_time_remaining(date, now).as_str() {
                "EXPIRED" => "EXPIRED".to_string(),
                remaining => format!("{} remaining", remaining),
            }
        }) {
            rows.push(("Valid Until".to_string(), valid_until));
        }
        rows.push((
            "Offline Grace".to_string(),
            plan.offline_grace_period
                .map(|days| format!("{} days", days))
                .unwrap_or_else(|| "N/A".to_string()),
        ));
        rows.push(("Premium Access".to_string(), yes_no(subscription.premium_access)));
        rows.push(("Trial Eligible".to_string(), yes_no(subscription.can_get_trial)));
        rows.push((
            "Payment Overdue".to_string(),
            yes_no(subscription.payment_overdue),
        ));
        rows
    }

    pub fn library_rows(&self) -> Vec<(String, String)> {
        let library = self.library;
        vec![
            ("Total Playlists".to_string(), library.total.to_string()),
            ("Owned Playlists".to_string(), library.owned.to_string()),
            ("Favorite Playlists".to_string(), library.favorite.to_string()),
            ("Editorial Playlists".to_string(), library.editorial.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use crate::tidal::testing::raw_playlist;
    use crate::tidal::RawPlan;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn value<'a>(rows: &'a [(String, String)], field: &str) -> Option<&'a str> {
        rows.iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    fn dashboard(subscription: Option<RawSubscription>) -> Dashboard {
        Dashboard {
            user: RawUser {
                id: "42".to_string(),
                first_name: Some("Ola".to_string()),
                created: Some("2022-05-20T12:00:00.000+0000".to_string()),
                ..Default::default()
            },
            country_code: "NO".to_string(),
            subscription,
            library: LibraryStats::default(),
        }
    }

    #[test]
    fn test_describe_age() {
        assert_eq!(describe_age(now() - Duration::hours(3), now()), "Less than a day");
        assert_eq!(describe_age(now() - Duration::days(45), now()), "1 month, 15 days");
        assert_eq!(describe_age(now() - Duration::days(800), now()), "2 years, 2 months");
        assert_eq!(describe_age(now() - Duration::days(365), now()), "1 year");
    }

    #[test]
    fn test_describe_time_remaining() {
        assert_eq!(describe_time_remaining(now() - Duration::days(1), now()), "EXPIRED");
        assert_eq!(describe_time_remaining(now() + Duration::hours(5), now()), "5 hours");
        assert_eq!(describe_time_remaining(now() + Duration::days(1), now()), "1 day");
        assert_eq!(describe_time_remaining(now() + Duration::days(12), now()), "12 days");
        assert_eq!(describe_time_remaining(now() + Duration::days(60), now()), "2 months");
        assert_eq!(
            describe_time_remaining(now() + Duration::days(95), now()),
            "3 months, 5 days"
        );
        assert_eq!(
            describe_time_remaining(now() + Duration::days(400), now()),
            "1 year, 1 month"
        );
    }

    #[test]
    fn test_library_stats_count_playlist_types() {
        let mut owned = Playlist::from_raw(raw_playlist("a", "Mine"), "42");
        owned.playlist_type = PlaylistType::Owned;
        let mut editorial = Playlist::from_raw(raw_playlist("b", "Picks"), "42");
        editorial.playlist_type = PlaylistType::Editorial;
        let favorite = Playlist::from_raw(raw_playlist("c", "Liked"), "42");
        let stats = LibraryStats::from_playlists(&[owned, editorial, favorite]);
        assert_eq!(
            stats,
            LibraryStats {
                total: 3,
                owned: 1,
                favorite: 1,
                editorial: 1
            }
        );
    }

    #[test]
    fn test_account_rows_fill_missing_fields() {
        let rows = dashboard(None).account_rows(now());
        assert_eq!(value(&rows, "Name"), Some("Ola"));
        assert_eq!(value(&rows, "Email"), Some("N/A"));
        assert_eq!(value(&rows, "Country"), Some("NO"));
        assert_eq!(
            value(&rows, "Created"),
            Some("2022-05-20 (Age: 2 years)")
        );
        assert_eq!(value(&rows, "Date of Birth"), Some("Not provided"));
        assert_eq!(value(&rows, "Newsletter"), Some("Not Subscribed"));
    }

    #[test]
    fn test_subscription_rows() {
        assert!(dashboard(None).subscription_rows(now()).is_empty());

        let subscription = RawSubscription {
            status: Some("ACTIVE".to_string()),
            subscription: Some(RawPlan {
                plan_type: Some("HIFI".to_string()),
                offline_grace_period: Some(30),
            }),
            valid_until: Some("2024-06-13T12:00:00.000+0000".to_string()),
            highest_sound_quality: Some("HI_RES".to_string()),
            premium_access: Some(true),
            ..Default::default()
        };
        let rows = dashboard(Some(subscription)).subscription_rows(now());
        assert_eq!(value(&rows, "Type"), Some("HIFI"));
        assert_eq!(value(&rows, "Sound Quality"), Some("HI_RES (Lossless)"));
        assert_eq!(value(&rows, "Valid Until"), Some("2024-06-13 (12 days remaining)"));
        assert_eq!(value(&rows, "Offline Grace"), Some("30 days"));
        assert_eq!(value(&rows, "Premium Access"), Some("Yes"));
        assert_eq!(value(&rows, "Payment Overdue"), Some("No"));
        assert_eq!(value(&rows, "Started"), None);
    }
}
