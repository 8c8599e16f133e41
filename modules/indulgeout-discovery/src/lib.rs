pub mod engine;
pub mod facets;
pub mod filter;
pub mod ingest;
pub mod paginate;
pub mod recommend;
pub mod sort;

pub use engine::{exclusion_reason, select_events, select_events_at, EventFilterEngine, Selection};
pub use facets::{facets, Facets, PriceBreakdown};
pub use filter::{Exclusion, ExclusionStats, FilterConfig, PriceRange, ResolvedFilter};
pub use ingest::{load_events, load_filter_config, parse_events, parse_filter_config};
pub use paginate::PageRequest;
pub use recommend::recommend_events;
pub use sort::{sort_for_display, Timing};
