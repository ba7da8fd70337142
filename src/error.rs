use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ScanError {
    #[error("Scan root \"{path}\" does not exist or is not a directory")]
    NotFound { path: PathBuf },
}

#[derive(Debug, Error)]
pub(crate) enum SavingsError {
    #[error("Usage weights must sum to 1.0, got {sum}")]
    InvalidDistribution { sum: f64 },
}

/// Failure modes of a single pricing fetch. Never crosses the cache
/// boundary: `PricingCache::current()` degrades to fallback data instead.
#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("Pricing request timed out")]
    Timeout,

    #[error("Pricing request failed: {0}")]
    Transport(String),

    #[error("Pricing endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Invalid pricing response: {0}")]
    Malformed(String),
}

/// Soft diagnostics collected during a scan or estimate. Displayed to the
/// user, never raised as hard errors.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Warning {
    UnreadableFile { path: PathBuf, reason: String },
    PricingFallback { reason: String },
    UnresolvedModel { model: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnreadableFile { path, reason } => {
                write!(f, "Skipped {}: {}", path.display(), reason)
            }
            Warning::PricingFallback { reason } => {
                write!(f, "Live pricing unavailable ({reason}), using fallback rates")
            }
            Warning::UnresolvedModel { model } => {
                write!(f, "No pricing found for model \"{model}\", contributes zero cost")
            }
        }
    }
}
