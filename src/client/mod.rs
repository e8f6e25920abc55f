//! Client navigator (spec.md §4.J): fetches resources over HTTP, caches
//! them, retries transient failures with backoff, and translates governed
//! failure status codes into typed outcomes an agent strategy can act on.

pub mod cache;
pub mod events;
pub mod template;

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::governance::PaymentInvoice;
use crate::ld::validate;
use crate::ld::{Operation, Resource};

pub use cache::NavigatorCache;
pub use events::{EventBus, NavigationEvent};

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 200;
const WELL_KNOWN_SCHEME: &str = "hyprcat";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("payment required")]
    PaymentRequired(Box<PaymentInvoice>),
    #[error("token gate not satisfied")]
    TokenGate,
    #[error("not found")]
    NotFound,
    #[error("rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("input validation failed: {0:?}")]
    InvalidInput(Vec<validate::ValidationError>),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// The resource an operation produced plus the real HTTP status it was
/// served with, so a caller can distinguish e.g. a 200 fetch echo from a
/// 201 creation (spec.md §4.K "Attest" needs the latter to record
/// `BuyAction`/`statusCode=201` faithfully).
pub struct OperationOutcome {
    pub resource: Resource,
    pub status: u16,
}

pub struct NavigatorConfig {
    pub bearer_token: Option<String>,
    pub agent_did: Option<String>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            agent_did: None,
        }
    }
}

pub struct Navigator {
    client: reqwest::Client,
    cache: NavigatorCache,
    events: EventBus,
    history: Mutex<Vec<String>>,
    config: NavigatorConfig,
}

impl Navigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache: NavigatorCache::new(),
            events: EventBus::new(),
            history: Mutex::new(Vec::new()),
            config,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Navigation history so an agent can detect cycles and bound
    /// exploration (spec.md §4.J).
    pub fn has_visited(&self, url: &str) -> bool {
        self.history.lock().unwrap().iter().any(|u| u == url)
    }

    fn record_visit(&self, url: &str) {
        self.history.lock().unwrap().push(url.to_string());
    }

    fn authed_request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header("Accept", "application/ld+json, application/json, */*");
        let builder = match &self.config.bearer_token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        };
        match &self.config.agent_did {
            Some(did) => builder.header("X-Agent-DID", did.clone()),
            None => builder,
        }
    }

    /// `fetch(url)` (spec.md §4.J): GET with caching and retry/backoff,
    /// translating governed status codes into typed failures.
    pub async fn fetch(&self, url: &str) -> Result<Resource, FetchError> {
        if let Some(cached) = self.cache.get(url) {
            self.events.publish(NavigationEvent::CacheHit {
                url: url.to_string(),
                at: now(),
            });
            self.record_visit(url);
            return Ok(cached);
        }

        let mut attempt = 0;
        loop {
            let request = self.authed_request(self.client.get(url));
            let response = request.send().await.map_err(|e| FetchError::Transport(e.to_string()));

            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if (500..600).contains(&status) && attempt < MAX_RETRIES {
                        self.events.publish(NavigationEvent::Retried {
                            url: url.to_string(),
                            attempt,
                            at: now(),
                        });
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    self.record_visit(url);
                    self.events.publish(NavigationEvent::Fetched {
                        url: url.to_string(),
                        status,
                        at: now(),
                    });
                    return self.translate_response(url, resp).await;
                }
                Err(e) => {
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    self.events.publish(NavigationEvent::Failed {
                        url: url.to_string(),
                        reason: e.to_string(),
                        at: now(),
                    });
                    return Err(e);
                }
            }
        }
    }

    async fn translate_response(
        &self,
        url: &str,
        resp: reqwest::Response,
    ) -> Result<Resource, FetchError> {
        let status = resp.status().as_u16();
        let max_age = resp
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
            .and_then(cache::parse_max_age);

        match status {
            200..=299 => {
                let body: Value = resp.json().await.map_err(|e| FetchError::Decode(e.to_string()))?;
                let resource: Resource =
                    serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))?;
                if let Some(max_age) = max_age {
                    self.cache.put(url, resource.clone(), max_age);
                }
                Ok(resource)
            }
            401 => Err(FetchError::AuthenticationRequired),
            402 => {
                let body: Value = resp.json().await.unwrap_or_default();
                let invoice: PaymentInvoice = serde_json::from_value(body)
                    .map_err(|e| FetchError::Decode(e.to_string()))?;
                Err(FetchError::PaymentRequired(Box::new(invoice)))
            }
            403 => {
                let body: Value = resp.json().await.unwrap_or_default();
                if body.get("requiredToken").is_some() {
                    Err(FetchError::TokenGate)
                } else {
                    Err(FetchError::AuthenticationRequired)
                }
            }
            404 => Err(FetchError::NotFound),
            429 => {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);
                Err(FetchError::RateLimited { retry_after })
            }
            other => Err(FetchError::Transport(format!("unexpected status {other}"))),
        }
    }

    /// `executeOperation(op, input)` (spec.md §4.J): validates input
    /// against the operation's property shapes, then issues the request.
    pub async fn execute_operation(
        &self,
        op: &Operation,
        parent_id: &str,
        input: &Value,
    ) -> Result<OperationOutcome, FetchError> {
        self.execute_operation_with_headers(op, parent_id, input, &[])
            .await
    }

    /// Same as [`Self::execute_operation`], additionally attaching
    /// caller-supplied headers — used by the agent runtime to attach a
    /// payment proof or similar constraint-satisfaction evidence
    /// (spec.md §4.K "Attest").
    pub async fn execute_operation_with_headers(
        &self,
        op: &Operation,
        parent_id: &str,
        input: &Value,
        extra_headers: &[(&str, &str)],
    ) -> Result<OperationOutcome, FetchError> {
        if let Some(shapes) = &op.expects {
            let outcome = validate::validate_input(input, shapes);
            if !outcome.is_valid() {
                return Err(FetchError::InvalidInput(outcome.errors));
            }
        }

        let target = op.target_or(parent_id).to_string();
        let builder = match op.method {
            crate::ld::HttpMethod::Get => self.client.get(&target),
            crate::ld::HttpMethod::Post => self.client.post(&target).json(input),
            crate::ld::HttpMethod::Put => self.client.put(&target).json(input),
            crate::ld::HttpMethod::Patch => self.client.patch(&target).json(input),
            crate::ld::HttpMethod::Delete => self.client.delete(&target),
        };

        let mut builder = self.authed_request(builder);
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        let request = builder;
        let resp = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        self.events.publish(NavigationEvent::OperationExecuted {
            target_url: target.clone(),
            status,
            at: now(),
        });
        let resource = self.translate_response(&target, resp).await?;
        Ok(OperationOutcome { resource, status })
    }

    /// `discover(baseUrl)` (spec.md §4.J): fetches the well-known service
    /// description and follows its declared entry point, falling back to
    /// `baseUrl` itself on any failure.
    pub async fn discover(&self, base_url: &str) -> Resource {
        let well_known = format!("{}/.well-known/{WELL_KNOWN_SCHEME}", base_url.trim_end_matches('/'));
        if let Ok(description) = self.fetch(&well_known).await {
            let entry_point = description
                .operations_of()
                .iter()
                .find(|op| op.method == crate::ld::HttpMethod::Get)
                .map(|op| op.target_or(&description.id).to_string());
            if let Some(entry) = entry_point {
                if let Ok(root) = self.fetch(&entry).await {
                    return root;
                }
            }
        }
        self.fetch(base_url)
            .await
            .unwrap_or_else(|_| Resource::new(base_url, vec!["hydra:EntryPoint".into()]))
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt))
}

fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

/// Expands a URI-Template against named variables (re-exported at module
/// root for callers that only need template expansion).
pub fn expand_template(template: &str, vars: &BTreeMap<String, String>) -> String {
    template::expand(template, vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unvisited_url_is_not_in_history() {
        let nav = Navigator::new(NavigatorConfig::default());
        assert!(!nav.has_visited("https://x/a"));
    }

    #[tokio::test]
    async fn visiting_records_history() {
        let nav = Navigator::new(NavigatorConfig::default());
        nav.record_visit("https://x/a");
        assert!(nav.has_visited("https://x/a"));
    }
}
