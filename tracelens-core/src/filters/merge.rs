//! Resolves the effective filter set for a view
//!
//! A detail view (e.g. "tasks for cluster X") pins one dimension with a
//! forced filter while still respecting the globally selected time range
//! and metadata constraints.

use super::FilterSet;

/// Combine the globally selected filters with a per-view forced override.
///
/// Every field the forced set carries (`Some`) takes precedence; fields it
/// leaves unset pass through from the global selection. Neither input is
/// mutated.
pub fn merge(global: &FilterSet, forced: Option<&FilterSet>) -> FilterSet {
    let mut effective = global.clone();
    let Some(forced) = forced else {
        return effective;
    };

    if forced.metadata.is_some() {
        effective.metadata = forced.metadata.clone();
    }
    if forced.event_filters.is_some() {
        effective.event_filters = forced.event_filters.clone();
    }
    if forced.date_range_preset.is_some() {
        effective.date_range_preset = forced.date_range_preset;
    }
    if forced.date_range.is_some() {
        effective.date_range = forced.date_range;
    }
    if forced.task_id_search.is_some() {
        effective.task_id_search = forced.task_id_search.clone();
    }
    if forced.session_id_search.is_some() {
        effective.session_id_search = forced.session_id_search.clone();
    }
    if forced.user_id.is_some() {
        effective.user_id = forced.user_id.clone();
    }
    if forced.cluster_ids.is_some() {
        effective.cluster_ids = forced.cluster_ids.clone();
    }
    if forced.version_id.is_some() {
        effective.version_id = forced.version_id.clone();
    }

    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::DateRangePreset;

    #[test]
    fn test_forced_fields_win() {
        let global = FilterSet {
            user_id: Some("u1".to_string()),
            cluster_ids: Some(vec!["c-global".to_string()]),
            ..Default::default()
        };
        let forced = FilterSet {
            cluster_ids: Some(vec!["c1".to_string()]),
            ..Default::default()
        };

        let effective = merge(&global, Some(&forced));
        assert_eq!(effective.cluster_ids, Some(vec!["c1".to_string()]));
        // Fields the forced set leaves unset pass through
        assert_eq!(effective.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_inputs_not_mutated() {
        let global = FilterSet {
            date_range_preset: Some(DateRangePreset::Last7Days),
            user_id: Some("u1".to_string()),
            ..Default::default()
        };
        let forced = FilterSet {
            user_id: Some("u2".to_string()),
            ..Default::default()
        };
        let global_before = global.clone();
        let forced_before = forced.clone();

        let effective = merge(&global, Some(&forced));

        assert_eq!(effective.user_id.as_deref(), Some("u2"));
        assert_eq!(global, global_before);
        assert_eq!(forced, forced_before);
    }

    #[test]
    fn test_no_forced_filter_is_identity() {
        let global = FilterSet {
            session_id_search: Some("sess-42".to_string()),
            ..Default::default()
        };
        assert_eq!(merge(&global, None), global);
    }

    #[test]
    fn test_full_replace_then_merge() {
        // A caller replacing the global filters wholesale drops fields it
        // does not carry over; the later forced merge does not resurrect them.
        let replaced = FilterSet {
            user_id: None,
            ..Default::default()
        };
        let forced = FilterSet {
            cluster_ids: Some(vec!["c1".to_string()]),
            ..Default::default()
        };

        let effective = merge(&replaced, Some(&forced));
        assert_eq!(effective.cluster_ids, Some(vec!["c1".to_string()]));
        assert!(effective.user_id.is_none());
    }
}
