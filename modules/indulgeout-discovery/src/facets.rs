use std::collections::BTreeSet;

use indulgeout_common::Event;
use serde::Serialize;

use crate::filter::PriceRange;

/// Event counts per concrete price bucket, keyed by the `priceRange` value
/// that selects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub free: usize,
    pub under_1000: usize,
    pub under_2000: usize,
    pub above_2000: usize,
}

/// Options for the discovery page's filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    /// Distinct values, sorted, exactly as the category filter matches them.
    pub categories: Vec<String>,
    pub cities: Vec<String>,
    pub price_ranges: PriceBreakdown,
}

pub fn facets(events: &[Event]) -> Facets {
    let mut categories = BTreeSet::new();
    let mut cities = BTreeSet::new();
    let mut price_ranges = PriceBreakdown::default();

    for event in events {
        categories.extend(
            event
                .categories
                .iter()
                .filter(|c| !c.trim().is_empty())
                .cloned(),
        );
        if let Some(city) = event.location.city.as_ref().filter(|c| !c.trim().is_empty()) {
            cities.insert(city.clone());
        }
        match PriceRange::bucket_of(event.price.amount) {
            PriceRange::Free => price_ranges.free += 1,
            PriceRange::Under1000 => price_ranges.under_1000 += 1,
            PriceRange::Under2000 => price_ranges.under_2000 += 1,
            PriceRange::Above2000 | PriceRange::All => price_ranges.above_2000 += 1,
        }
    }

    Facets {
        categories: categories.into_iter().collect(),
        cities: cities.into_iter().collect(),
        price_ranges,
    }
}
