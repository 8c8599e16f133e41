use chrono::{DateTime, Utc};
use indulgeout_common::{DiscoveryConfig, Event};
use serde::Serialize;
use tracing::debug;

use crate::filter::{Exclusion, ExclusionStats, FilterConfig, ResolvedFilter};
use crate::paginate::PageRequest;
use crate::sort::sort_for_display;

/// One page of discovery results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub page: Vec<Event>,
    /// Events that passed every filter, across all pages.
    pub total: usize,
    pub page_number: usize,
    pub page_size: usize,
    pub excluded: ExclusionStats,
}

/// Filter, order and page an in-memory event list.
///
/// Holds only configuration, so a single engine can serve concurrent
/// requests. Inputs are never mutated.
#[derive(Debug, Clone, Default)]
pub struct EventFilterEngine {
    config: DiscoveryConfig,
}

impl EventFilterEngine {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// First filter that rejects `event` under this engine's defaults, or
    /// `None` if [`select`](Self::select) would keep it.
    pub fn exclusion_reason(
        &self,
        event: &Event,
        filter: &FilterConfig,
        interests: &[String],
    ) -> Option<Exclusion> {
        ResolvedFilter::new(filter, interests, self.config.default_radius_km).exclusion(event)
    }

    pub fn select(&self, events: &[Event], filter: &FilterConfig, interests: &[String]) -> Selection {
        self.select_at(events, filter, interests, Utc::now())
    }

    /// Like [`select`](Self::select) with an explicit reference instant for
    /// the upcoming/past split.
    pub fn select_at(
        &self,
        events: &[Event],
        filter: &FilterConfig,
        interests: &[String],
        now: DateTime<Utc>,
    ) -> Selection {
        let resolved = ResolvedFilter::new(filter, interests, self.config.default_radius_km);

        let mut excluded = ExclusionStats::default();
        let mut survivors: Vec<&Event> = Vec::with_capacity(events.len());
        for event in events {
            match resolved.exclusion(event) {
                Some(reason) => excluded.record(reason),
                None => survivors.push(event),
            }
        }

        sort_for_display(&mut survivors, interests, now);

        let request = PageRequest::clamped(filter.page, filter.page_size, self.config.default_page_size);
        let page: Vec<Event> = request.slice(&survivors).iter().map(|e| (*e).clone()).collect();

        debug!(
            input = events.len(),
            total = survivors.len(),
            excluded = excluded.total(),
            page = request.page,
            page_size = request.page_size,
            returned = page.len(),
            "Events selected"
        );

        Selection {
            page,
            total: survivors.len(),
            page_number: request.page,
            page_size: request.page_size,
            excluded,
        }
    }
}

/// Select with default configuration and the current time.
pub fn select_events(events: &[Event], filter: &FilterConfig, interests: &[String]) -> Selection {
    EventFilterEngine::default().select(events, filter, interests)
}

pub fn select_events_at(
    events: &[Event],
    filter: &FilterConfig,
    interests: &[String],
    now: DateTime<Utc>,
) -> Selection {
    EventFilterEngine::default().select_at(events, filter, interests, now)
}

/// [`EventFilterEngine::exclusion_reason`] with default configuration.
pub fn exclusion_reason(event: &Event, filter: &FilterConfig, interests: &[String]) -> Option<Exclusion> {
    EventFilterEngine::default().exclusion_reason(event, filter, interests)
}
