//! Pricing layer
//!
//! Live OpenRouter pricing behind a TTL cache, with hand-maintained
//! fallback rates so pricing unavailability can never block a scan or a
//! savings estimate.

mod cache;
mod fallback;
mod fetcher;
mod mapping;
mod types;

pub(crate) use cache::{DEFAULT_TTL, PricingCache};
pub(crate) use fallback::fallback_entry;
pub(crate) use fetcher::{DEFAULT_FETCH_TIMEOUT, OpenRouterFetcher};
pub(crate) use mapping::{mapped_models, mistral_equivalent, openrouter_id};
pub(crate) use types::{PricingEntry, PricingTable, TableSource};
