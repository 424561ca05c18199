use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::app::{GazetteError, Result};
use crate::client::DocumentStore;
use crate::config::StoreConfig;
use crate::query::{QueryOptions, QueryParams};

const API_HOST: &str = "api.sanity.io";
const CDN_HOST: &str = "apicdn.sanity.io";

/// Query API client for a Sanity-compatible store.
pub struct HttpStore {
    client: Client,
    config: StoreConfig,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

impl HttpStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("gazette/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Query endpoint; cache-bypassing reads never go through the CDN.
    pub fn endpoint(&self, bypass_cache: bool) -> Result<Url> {
        let origin = match self.config.api_host {
            Some(ref host) => host.trim_end_matches('/').to_string(),
            None => {
                let host = if self.config.use_cdn && !bypass_cache {
                    CDN_HOST
                } else {
                    API_HOST
                };
                format!("https://{}.{}", self.config.project_id, host)
            }
        };

        Ok(Url::parse(&format!(
            "{}/v{}/data/query/{}",
            origin, self.config.api_version, self.config.dataset
        ))?)
    }

    pub fn request_url(
        &self,
        expression: &str,
        params: &QueryParams,
        options: QueryOptions,
    ) -> Result<Url> {
        let mut url = self.endpoint(options.bypass_cache)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("query", expression);
            for (name, value) in params.iter() {
                query.append_pair(&format!("${}", name), &serde_json::to_string(value)?);
            }
        }
        Ok(url)
    }
}

/// Best-effort human readable message from an error body.
fn describe_error(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        let message = value
            .pointer("/error/description")
            .or_else(|| value.pointer("/error/message"))
            .or_else(|| value.get("message"))
            .and_then(Value::as_str);
        if let Some(message) = message {
            return message.to_string();
        }
    }
    String::from_utf8_lossy(body).chars().take(200).collect()
}

fn parse_rows(body: &[u8]) -> Result<Vec<Value>> {
    let response: QueryResponse = serde_json::from_slice(body)
        .map_err(|e| GazetteError::Query(format!("malformed response body: {}", e)))?;

    match response.result {
        Value::Null => Ok(Vec::new()),
        Value::Array(rows) => Ok(rows),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(GazetteError::Query(format!(
            "expected documents in result, got {}",
            other
        ))),
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn query(
        &self,
        expression: &str,
        params: &QueryParams,
        options: QueryOptions,
    ) -> Result<Vec<Value>> {
        let url = self.request_url(expression, params, options)?;
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }
        if options.bypass_cache {
            request = request.header(reqwest::header::CACHE_CONTROL, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| GazetteError::StoreUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GazetteError::StoreUnavailable(e.to_string()))?;

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GazetteError::StoreUnavailable(format!(
                "{}: {}",
                status,
                describe_error(&body)
            )));
        }

        if !status.is_success() {
            return Err(GazetteError::Query(format!(
                "{}: {}",
                status,
                describe_error(&body)
            )));
        }

        parse_rows(&body)
    }
}
