//! Filter model shared across dashboard views
//!
//! A [`FilterSet`] is the combination of time range, metadata constraints,
//! and search terms narrowing which records a view displays. The global
//! selection lives in a [`FilterStore`]; detail views pin individual
//! dimensions with [`merge`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod debounce;
pub mod merge;
pub mod state;

pub use debounce::Debouncer;
pub use merge::merge;
pub use state::{FilterStore, NavigationState, Pagination};

// ============================================
// Date ranges
// ============================================

/// Preset time windows selectable from the date picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRangePreset {
    Last24Hours,
    Last7Days,
    Last30Days,
    AllTime,
}

impl DateRangePreset {
    /// Label shown in the date picker and filter chips.
    pub fn label(&self) -> &'static str {
        match self {
            DateRangePreset::Last24Hours => "Last 24 hours",
            DateRangePreset::Last7Days => "Last 7 days",
            DateRangePreset::Last30Days => "Last 30 days",
            DateRangePreset::AllTime => "All time",
        }
    }

    /// Resolve to a concrete window ending at `now`.
    ///
    /// `AllTime` has no bounds and resolves to `None`.
    pub fn to_range(&self, now: DateTime<Utc>) -> Option<DateRange> {
        let from = match self {
            DateRangePreset::Last24Hours => now - Duration::hours(24),
            DateRangePreset::Last7Days => now - Duration::days(7),
            DateRangePreset::Last30Days => now - Duration::days(30),
            DateRangePreset::AllTime => return None,
        };
        Some(DateRange { from, to: now })
    }
}

/// An explicit UTC time window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Normalize an interactively picked range to whole days:
    /// `from` to start-of-day (00:00:00.000), `to` to end-of-day
    /// (23:59:59.999).
    pub fn normalized(self) -> Self {
        let from = self
            .from
            .date_naive()
            .and_hms_milli_opt(0, 0, 0, 0)
            .unwrap()
            .and_utc();
        let to = self
            .to
            .date_naive()
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap()
            .and_utc();
        DateRange { from, to }
    }
}

// ============================================
// Filter set
// ============================================

/// The combination of time range, metadata constraints, and search terms
/// narrowing which records a view displays.
///
/// Both `date_range_preset` and `date_range` may be stored at once; the
/// preset wins for display while non-null (see [`FilterSet::effective_range`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    /// Arbitrary metadata equality constraints (key → required value)
    pub metadata: Option<HashMap<String, String>>,
    /// Names of analytics events a record must carry
    pub event_filters: Option<Vec<String>>,
    /// Preset time window; wins over `date_range` while set
    pub date_range_preset: Option<DateRangePreset>,
    /// Explicit time window
    pub date_range: Option<DateRange>,
    /// Substring search over task ids
    pub task_id_search: Option<String>,
    /// Substring search over session ids
    pub session_id_search: Option<String>,
    /// Restrict to one end user
    pub user_id: Option<String>,
    /// Restrict to records in these clusters
    pub cluster_ids: Option<Vec<String>>,
    /// Restrict to one app version
    pub version_id: Option<String>,
}

impl FilterSet {
    /// The window actually applied to requests: the preset resolved against
    /// `now` while set, otherwise the stored explicit range.
    pub fn effective_range(&self, now: DateTime<Utc>) -> Option<DateRange> {
        match self.date_range_preset {
            Some(preset) => preset.to_range(now),
            None => self.date_range,
        }
    }

    /// Label describing the active time window, preset first.
    pub fn range_label(&self) -> Option<String> {
        if let Some(preset) = self.date_range_preset {
            return Some(preset.label().to_string());
        }
        self.date_range.map(|range| {
            format!(
                "{} – {}",
                range.from.format("%Y-%m-%d"),
                range.to.format("%Y-%m-%d")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_preset_labels() {
        assert_eq!(DateRangePreset::Last24Hours.label(), "Last 24 hours");
        assert_eq!(DateRangePreset::Last7Days.label(), "Last 7 days");
        assert_eq!(DateRangePreset::Last30Days.label(), "Last 30 days");
        assert_eq!(DateRangePreset::AllTime.label(), "All time");
    }

    #[test]
    fn test_preset_serializes_kebab_case() {
        let json = serde_json::to_string(&DateRangePreset::Last7Days).unwrap();
        assert_eq!(json, r#""last-7-days""#);
        let parsed: DateRangePreset = serde_json::from_str(r#""last-24-hours""#).unwrap();
        assert_eq!(parsed, DateRangePreset::Last24Hours);
    }

    #[test]
    fn test_preset_to_range() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let range = DateRangePreset::Last7Days.to_range(now).unwrap();
        assert_eq!(range.to, now);
        assert_eq!(range.from, now - Duration::days(7));

        assert!(DateRangePreset::AllTime.to_range(now).is_none());
    }

    #[test]
    fn test_normalization_bounds() {
        let range = DateRange {
            from: Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap(),
        }
        .normalized();

        assert_eq!(range.from.hour(), 0);
        assert_eq!(range.from.minute(), 0);
        assert_eq!(range.from.second(), 0);
        assert_eq!(range.from.timestamp_subsec_millis(), 0);

        assert_eq!(range.to.hour(), 23);
        assert_eq!(range.to.minute(), 59);
        assert_eq!(range.to.second(), 59);
        assert_eq!(range.to.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn test_preset_wins_while_set() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let explicit = DateRange {
            from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
        };

        let filters = FilterSet {
            date_range_preset: Some(DateRangePreset::Last7Days),
            date_range: Some(explicit),
            ..Default::default()
        };
        assert_eq!(
            filters.effective_range(now).unwrap().from,
            now - Duration::days(7)
        );
        assert_eq!(filters.range_label().unwrap(), "Last 7 days");

        // With the preset cleared the explicit range takes over
        let filters = FilterSet {
            date_range_preset: None,
            ..filters
        };
        assert_eq!(filters.effective_range(now), Some(explicit));
        assert_eq!(filters.range_label().unwrap(), "2024-01-01 – 2024-01-05");
    }
}
