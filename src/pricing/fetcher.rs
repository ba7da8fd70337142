//! Live pricing retrieval
//!
//! Fetches the OpenRouter model catalog and normalizes it into pricing
//! entries. This is the only component in the crate allowed to block on
//! I/O, and it is bounded by a timeout; callers treat every failure as
//! recoverable and fall back per the cache policy.

use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;

use super::types::{PricingEntry, TableSource};

const OPENROUTER_MODELS_URL: &str = "https://openrouter.ai/api/v1/models";
const FETCH_RETRIES: usize = 3;
const RETRY_BACKOFF_MS: u64 = 250;

pub(crate) const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Seam between the cache and the network. Tests inject a fake; production
/// uses `OpenRouterFetcher`.
pub(crate) trait PriceFetcher: Send + Sync {
    fn fetch(&self) -> Result<Vec<PricingEntry>, FetchError>;
}

pub(crate) struct OpenRouterFetcher {
    agent: ureq::Agent,
    api_key: Option<String>,
}

impl OpenRouterFetcher {
    pub(crate) fn new(timeout: Duration, api_key: Option<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent, api_key }
    }

    fn fetch_once(&self) -> Result<Vec<PricingEntry>, FetchError> {
        let mut request = self.agent.get(OPENROUTER_MODELS_URL);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", &format!("Bearer {key}"));
        }

        let response = request.call().map_err(|err| match err {
            ureq::Error::StatusCode(code) => FetchError::Status(code),
            ureq::Error::Timeout(_) => FetchError::Timeout,
            ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
                FetchError::Timeout
            }
            other => FetchError::Transport(other.to_string()),
        })?;

        let mut body = response.into_body();
        let catalog: Value = serde_json::from_reader(body.as_reader())
            .map_err(|err| FetchError::Malformed(err.to_string()))?;
        parse_catalog(&catalog)
    }
}

impl PriceFetcher for OpenRouterFetcher {
    fn fetch(&self) -> Result<Vec<PricingEntry>, FetchError> {
        let mut last_error = FetchError::Transport("no attempt made".to_string());

        for attempt in 0..FETCH_RETRIES {
            match self.fetch_once() {
                Ok(entries) => return Ok(entries),
                Err(err) => {
                    let retryable = match &err {
                        FetchError::Timeout => true,
                        FetchError::Transport(_) => true,
                        // Server errors may be transient; client errors and
                        // bad payloads will not improve on retry.
                        FetchError::Status(code) => *code >= 500,
                        FetchError::Malformed(_) => false,
                    };
                    last_error = err;
                    if !retryable {
                        break;
                    }
                }
            }

            if attempt + 1 < FETCH_RETRIES {
                std::thread::sleep(Duration::from_millis(
                    RETRY_BACKOFF_MS * (attempt as u64 + 1),
                ));
            }
        }

        Err(last_error)
    }
}

/// Normalize the upstream catalog into per-token entries. The response
/// shape is `{"data": [{"id", "context_length", "pricing": {"prompt",
/// "completion"}}]}`; costs arrive as decimal strings or numbers and
/// occasionally in per-1k variants, all converted to canonical per-token
/// here so nothing downstream branches on units.
pub(crate) fn parse_catalog(catalog: &Value) -> Result<Vec<PricingEntry>, FetchError> {
    let data = catalog
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Malformed("missing \"data\" field".to_string()))?;

    let mut entries = Vec::new();
    for model in data {
        let Some(model_id) = model.get("id").and_then(Value::as_str) else {
            continue;
        };
        let Some(pricing) = model.get("pricing") else {
            continue;
        };
        let (Some(prompt), Some(completion)) = (
            cost_per_token(pricing, "prompt"),
            cost_per_token(pricing, "completion"),
        ) else {
            continue;
        };
        if prompt < 0.0 || completion < 0.0 {
            continue;
        }

        entries.push(PricingEntry {
            model_id: model_id.to_string(),
            prompt_cost_per_token: prompt,
            completion_cost_per_token: completion,
            context_length: model
                .get("context_length")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            source: TableSource::Live,
        });
    }
    Ok(entries)
}

fn cost_per_token(pricing: &Value, key: &str) -> Option<f64> {
    match pricing.get(key) {
        Some(value) => parse_cost(value),
        // Absent key is a zero cost (e.g. embeddings with no completion
        // price), matching upstream behavior.
        None => match pricing.get(format!("{key}_per_1k")) {
            Some(value) => parse_cost(value).map(|v| v / 1000.0),
            None => Some(0.0),
        },
    }
}

fn parse_cost(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
