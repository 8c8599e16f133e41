use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use indulgeout_common::Event;

/// Where an event sits relative to the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    Upcoming(DateTime<Utc>),
    /// No usable date. Grouped with upcoming, after every dated one.
    Undated,
    Past(DateTime<Utc>),
}

impl Timing {
    pub fn of(event: &Event, now: DateTime<Utc>) -> Self {
        match event.date {
            Some(date) if date >= now => Self::Upcoming(date),
            Some(date) => Self::Past(date),
            None => Self::Undated,
        }
    }

    pub fn is_upcoming(self) -> bool {
        !matches!(self, Self::Past(_))
    }

    fn group(self) -> u8 {
        match self {
            Self::Upcoming(_) | Self::Undated => 0,
            Self::Past(_) => 1,
        }
    }
}

/// Display order: upcoming (soonest first) before past (most recent first).
/// With interests, matching events lead within each of those two groups.
/// Stable, so ties keep input order.
pub fn sort_for_display(events: &mut [&Event], interests: &[String], now: DateTime<Utc>) {
    let personalize = !interests.is_empty();
    events.sort_by(|a, b| {
        let (ta, tb) = (Timing::of(a, now), Timing::of(b, now));
        ta.group()
            .cmp(&tb.group())
            .then_with(|| {
                if personalize {
                    interest_rank(a, interests).cmp(&interest_rank(b, interests))
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| date_order(ta, tb))
    });
}

fn interest_rank(event: &Event, interests: &[String]) -> u8 {
    if event.matches_interests(interests) {
        0
    } else {
        1
    }
}

fn date_order(a: Timing, b: Timing) -> Ordering {
    match (a, b) {
        (Timing::Upcoming(x), Timing::Upcoming(y)) => x.cmp(&y),
        (Timing::Upcoming(_), Timing::Undated) => Ordering::Less,
        (Timing::Undated, Timing::Upcoming(_)) => Ordering::Greater,
        (Timing::Past(x), Timing::Past(y)) => y.cmp(&x),
        // Different groups never reach here.
        _ => Ordering::Equal,
    }
}
