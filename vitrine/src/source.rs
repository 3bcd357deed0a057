//! Product search over HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::SearchError;
use crate::product::RawProduct;

/// Something that can answer a search query.
///
/// The session only ever sees this trait, so tests and alternative back-ends can stand in for
/// the HTTP endpoint.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Returns every product matching `query`, in display order.
    async fn search(&self, query: &str) -> Result<Vec<RawProduct>, SearchError>;
}

/// `GET <endpoint>?q=<query>` returning a JSON array of `{ id, title, price }`.
///
/// Cheap to clone: `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct HttpProductSource {
    endpoint: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl HttpProductSource {
    pub fn new(endpoint: &str) -> Result<Self, SearchError> {
        Ok(Self::from_url(Url::parse(endpoint)?))
    }

    pub fn from_url(endpoint: Url) -> Self {
        Self {
            endpoint,
            http_client: Client::new(),
            timeout: None,
        }
    }

    pub fn with_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The URL requested for `query`. Existing query parameters of the endpoint are kept.
    pub fn query_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);
        url
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn search(&self, query: &str) -> Result<Vec<RawProduct>, SearchError> {
        let url = self.query_url(query);
        tracing::debug!(target: "vitrine", %url, "search request");

        let mut request = self.http_client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        decode_products(&body)
    }
}

/// Decodes a search response body.
pub fn decode_products(body: &str) -> Result<Vec<RawProduct>, SearchError> {
    serde_json::from_str(body)
        .map_err(|e| SearchError::malformed_with_body(e.to_string(), body))
}
