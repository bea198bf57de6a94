//! HTTP seed source backed by a blocking `ureq` agent.
//!
//! Fetches `GET {base_url}/todos` and decodes the first page of the
//! `{ todos, total, skip, limit }` envelope. Pagination fields are ignored;
//! the first page is treated as the complete seed.

use super::{SeedError, SeedItem, SeedResult, SeedSource};
use log::{error, info};
use serde::Deserialize;
use std::time::{Duration, Instant};

const DEFAULT_BASE_URL: &str = "https://dummyjson.com";
const BASE_URL_ENV: &str = "TODO_SEED_BASE_URL";

/// Connection settings for [`HttpSeedSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSeedConfig {
    /// API root without trailing `/todos`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for HttpSeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(20),
        }
    }
}

impl HttpSeedConfig {
    /// Defaults with `TODO_SEED_BASE_URL` applied when set and non-blank.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(BASE_URL_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.base_url = trimmed.to_string();
            }
        }
        config
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct TodosEnvelope {
    todos: Vec<SeedItem>,
}

/// Seed source calling the remote todos endpoint.
pub struct HttpSeedSource {
    config: HttpSeedConfig,
    agent: ureq::Agent,
}

impl HttpSeedSource {
    pub fn new(config: HttpSeedConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout_read(config.read_timeout)
            .build();
        Self { config, agent }
    }

    pub fn config(&self) -> &HttpSeedConfig {
        &self.config
    }
}

impl SeedSource for HttpSeedSource {
    fn fetch_seed_items(&self) -> SeedResult<Vec<SeedItem>> {
        let started_at = Instant::now();
        info!("event=seed_fetch module=seed status=start");

        let result = self
            .agent
            .get(&self.config.todos_url())
            .call()
            .map_err(map_transport_error)
            .and_then(|response| {
                response
                    .into_string()
                    .map_err(|err| SeedError::Network(format!("failed to read body: {err}")))
            })
            .and_then(|body| parse_seed_response(&body));

        match &result {
            Ok(items) => info!(
                "event=seed_fetch module=seed status=ok count={} duration_ms={}",
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=seed_fetch module=seed status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

/// Decodes a todos envelope body into seed items.
pub fn parse_seed_response(body: &str) -> SeedResult<Vec<SeedItem>> {
    serde_json::from_str::<TodosEnvelope>(body)
        .map(|envelope| envelope.todos)
        .map_err(|err| SeedError::MalformedResponse(err.to_string()))
}

fn map_transport_error(err: ureq::Error) -> SeedError {
    match err {
        ureq::Error::Status(code, _) => SeedError::Network(format!("unexpected HTTP status {code}")),
        ureq::Error::Transport(transport) => SeedError::Network(transport.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_seed_response, HttpSeedConfig};
    use crate::seed::SeedError;

    #[test]
    fn parse_reads_first_page_items() {
        let body = r#"{
            "todos": [
                {"id": 1, "todo": "Do something nice", "completed": true, "userId": 26},
                {"id": 2, "todo": "Memorize a poem", "completed": false, "userId": 13}
            ],
            "total": 254,
            "skip": 0,
            "limit": 2
        }"#;

        let items = parse_seed_response(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].todo, "Do something nice");
        assert!(items[0].completed);
        assert_eq!(items[1].user_id, 13);
    }

    #[test]
    fn parse_rejects_bodies_without_envelope() {
        let err = parse_seed_response(r#"[{"id": 1}]"#).unwrap_err();
        assert!(matches!(err, SeedError::MalformedResponse(_)));
    }

    #[test]
    fn todos_url_tolerates_trailing_slash() {
        let config = HttpSeedConfig {
            base_url: "http://localhost:9999/".to_string(),
            ..HttpSeedConfig::default()
        };
        assert_eq!(config.todos_url(), "http://localhost:9999/todos");
    }
}
