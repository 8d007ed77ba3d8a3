use crate::record::Record;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

/// Something that can run a GraphQL query and hand back its `data` object.
///
/// Implementations can be:
/// - the HTTP client talking to the subgraph
/// - an in-memory fixture (for testing)
pub trait Transport {
    /// Executes a query string.
    ///
    /// # Returns
    /// Returns the object under the response's top-level `data` key, or an empty
    /// object if the key is absent.
    ///
    /// # Errors
    /// Returns `TransportError` if the request cannot be sent, the endpoint answers
    /// with a non-success status, or the body is not JSON.
    fn execute(&self, query: &str) -> impl Future<Output = Result<Record, TransportError>> + Send;
}

/// Configuration for the GraphQL HTTP client
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Endpoint receiving the POSTed queries
    pub endpoint: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
}

impl TransportConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        TransportConfig {
            endpoint: endpoint.into(),
            timeout_seconds: 30,
        }
    }
}

/// GraphQL client for the subgraph endpoint.
#[derive(Debug)]
pub struct GraphQlClient {
    client: Client,
    config: TransportConfig,
}

impl GraphQlClient {
    /// Creates a client with a request timeout.
    ///
    /// # Errors
    /// Returns `TransportError::ClientCreation` if the HTTP client cannot be built.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::ClientCreation(e.to_string()))?;

        Ok(GraphQlClient { client, config })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Transport for GraphQlClient {
    async fn execute(&self, query: &str) -> Result<Record, TransportError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(data_object(body))
    }
}

/// Takes the `data` object out of a GraphQL response body.
pub fn data_object(body: Value) -> Record {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(data)) => data,
            _ => Record::new(),
        },
        _ => Record::new(),
    }
}

/// Errors raised while talking to the GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// HTTP client creation failed
    ClientCreation(String),
    /// Request could not be sent or timed out
    Network(String),
    /// Endpoint answered with a non-success status
    Http(String),
    /// Response body was not valid JSON
    Decode(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::ClientCreation(msg) => write!(f, "Client creation error: {}", msg),
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::Http(msg) => write!(f, "HTTP error: {}", msg),
            TransportError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// In-memory transport for testing.
///
/// Records are stored per entity collection (`daos`, `proposals`, ...) and optionally
/// scoped to a DAO id. Incoming queries are inspected for the collection name, the
/// `first`/`skip` values and a `dao: "..."` filter; the matching slice is returned the
/// way the subgraph would. Every executed query is kept for later inspection.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    collections: HashMap<String, Vec<(Option<String>, Record)>>,
    requests: Mutex<Vec<String>>,
    failures: Mutex<usize>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds records to a collection, scoped to `dao_id` when given.
    pub fn add_records(&mut self, collection: &str, dao_id: Option<&str>, records: Vec<Record>) {
        let entries = self.collections.entry(collection.to_string()).or_default();
        entries.extend(records.into_iter().map(|r| (dao_id.map(str::to_string), r)));
    }

    /// Makes the next `count` requests fail with a network error.
    pub fn fail_next(&self, count: usize) {
        if let Ok(mut failures) = self.failures.lock() {
            *failures = count;
        }
    }

    /// Queries executed so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn answer(&self, query: &str) -> Record {
        let Some(collection) = collection_name(query) else {
            return Record::new();
        };
        let Some(entries) = self.collections.get(collection) else {
            return Record::new();
        };

        let first = numeric_argument(query, "first:").unwrap_or(100);
        let skip = numeric_argument(query, "skip:").unwrap_or(0);
        let dao = dao_argument(query);

        let page: Vec<Value> = entries
            .iter()
            .filter(|(scope, _)| match (&dao, scope) {
                (Some(wanted), Some(scope)) => wanted == scope,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .skip(skip)
            .take(first)
            .map(|(_, record)| Value::Object(record.clone()))
            .collect();

        let mut data = Record::new();
        data.insert(collection.to_string(), Value::Array(page));
        data
    }
}

impl Transport for InMemoryTransport {
    async fn execute(&self, query: &str) -> Result<Record, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(query.to_string());
        }

        if let Ok(mut failures) = self.failures.lock() {
            if *failures > 0 {
                *failures -= 1;
                return Err(TransportError::Network("injected failure".to_string()));
            }
        }

        Ok(self.answer(query))
    }
}

fn collection_name(query: &str) -> Option<&str> {
    let name = query.trim_start().trim_start_matches('{');
    let end = name.find(|c: char| c == '(' || c == '{' || c.is_whitespace())?;
    Some(&name[..end])
}

fn numeric_argument(query: &str, name: &str) -> Option<usize> {
    let start = query.find(name)? + name.len();
    let digits: String = query[start..]
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn dao_argument(query: &str) -> Option<String> {
    let marker = "dao: \"";
    let start = query.find(marker)? + marker.len();
    let end = query[start..].find('"')?;
    Some(query[start..start + end].to_string())
}
