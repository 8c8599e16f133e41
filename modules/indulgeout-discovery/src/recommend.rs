//! Personalized picks for the recommendation widget.

use chrono::{DateTime, Utc};
use indulgeout_common::Event;
use tracing::debug;

/// Up to `limit` upcoming events, soonest first.
///
/// With interests, only events sharing a category with them qualify. With
/// none, the soonest upcoming events are returned as generic picks. Undated
/// events are never recommended since there is no date to promise.
pub fn recommend_events(
    events: &[Event],
    interests: &[String],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Event> {
    let mut picks: Vec<(&Event, DateTime<Utc>)> = events
        .iter()
        .filter_map(|e| e.date.filter(|d| *d >= now).map(|d| (e, d)))
        .filter(|(e, _)| interests.is_empty() || e.matches_interests(interests))
        .collect();

    picks.sort_by_key(|(_, date)| *date);
    picks.truncate(limit);

    debug!(
        personalized = !interests.is_empty(),
        returned = picks.len(),
        "Recommendations built"
    );

    picks.into_iter().map(|(e, _)| e.clone()).collect()
}
