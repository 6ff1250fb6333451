// src/github/client.rs
// =============================================================================
// A thin wrapper around reqwest for talking to GitHub.
//
// Strategy:
// - Build ONE reqwest Client and share it (connection pooling)
// - REST calls: GET base + path, with query parameters and the v3 Accept header
// - GraphQL calls: POST { query, variables } with a bearer token
// - Any non-2xx status becomes a FetchError carrying the caller's message
//
// The body is read as text and decoded with serde_json ourselves, so a decode
// failure keeps the serde error (line/column) as its source.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::{message_or_default, FetchError};
use crate::config::ApiConfig;

/// Media type for version 3 of the REST API
const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

/// Ordered query parameters. Absent values are skipped, never sent as "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams(Vec<(String, String)>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key=value` if there is a value
    pub fn with<V: Display>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    rest_base: Url,
    graphql_endpoint: Url,
    token: Option<String>,
}

// Request body of every GraphQL call
#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

// Envelope of every GraphQL response
#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

impl GithubClient {
    pub fn new(api: &ApiConfig, token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_V3_JSON));

        // GitHub rejects requests without a User-Agent
        let http = Client::builder()
            .user_agent(api.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            http,
            rest_base: api.rest_base_url()?,
            graphql_endpoint: api.graphql_url()?,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Calls a REST endpoint and decodes the JSON body.
    ///
    /// `path` is relative to the API base, e.g. `users/octocat/gists`.
    /// `error_message` is what the returned FetchError displays; when omitted
    /// a generic message is used.
    pub async fn rest_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &SearchParams,
        error_message: Option<&str>,
    ) -> Result<T, FetchError> {
        let message = message_or_default(error_message);

        let url = self
            .rest_base
            .join(path)
            .map_err(|source| FetchError::InvalidUrl {
                message: message.clone(),
                source,
            })?;

        debug!(%url, params = ?params.pairs(), "GET");

        let mut request = self.http.get(url);
        if !params.is_empty() {
            request = request.query(params.pairs());
        }
        // An optional token also lifts the REST rate limit
        request = self.authorize(request);

        let body = send(request, &message).await?;
        decode(&body, &message)
    }

    /// Runs a GraphQL query and returns its `data` member.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        error_message: Option<&str>,
    ) -> Result<T, FetchError> {
        let message = message_or_default(error_message);

        if self.token.is_none() {
            return Err(FetchError::MissingToken);
        }

        debug!(url = %self.graphql_endpoint, %variables, "POST graphql");

        let request = self
            .http
            .post(self.graphql_endpoint.clone())
            .json(&GraphqlRequest { query, variables });
        let request = self.authorize(request);

        let body = send(request, &message).await?;
        let response: GraphqlResponse<T> = decode(&body, &message)?;

        if !response.errors.is_empty() {
            return Err(FetchError::Api {
                message,
                errors: response.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        response.data.ok_or(FetchError::Api {
            message,
            errors: Vec::new(),
        })
    }

    /// Downloads a file body as text (gist raw URLs live outside the API base)
    pub async fn fetch_raw(&self, url: &str) -> Result<String, FetchError> {
        let message = format!("Could not retrieve {url}");
        debug!(%url, "GET raw");
        send(self.http.get(url), &message).await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

// Sends the request and returns the body, failing on any non-2xx status
async fn send(request: RequestBuilder, message: &str) -> Result<String, FetchError> {
    let transport = |source| FetchError::Transport {
        message: message.to_string(),
        source,
    };

    let response = request.send().await.map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            message: message.to_string(),
            status,
        });
    }

    response.text().await.map_err(transport)
}

fn decode<T: DeserializeOwned>(body: &str, message: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Decode {
        message: message.to_string(),
        source,
    })
}
