//! Directus GraphQL transport and the `ContentRepo` implementation on top of it.

mod content;

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::application::repos::FetchError;
use crate::infra::error::InfraError;

/// Thin client for the backend's `/graphql` endpoint.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base: Url,
    graphql: Url,
    timeout: Duration,
}

impl BackendClient {
    /// Build a client for `base_url`. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InfraError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|err| {
            InfraError::configuration(format!("invalid backend url `{base_url}`: {err}"))
        })?;
        let graphql = Url::parse(&format!("{trimmed}/graphql")).map_err(|err| {
            InfraError::configuration(format!("invalid backend url `{base_url}`: {err}"))
        })?;

        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build http client: {err}"))
            })?;

        Ok(Self {
            client,
            base,
            graphql,
            timeout,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("rostrum/", env!("CARGO_PKG_VERSION"))
    }

    /// Base URL without a trailing slash, used to build asset links.
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn graphql_url(&self) -> &Url {
        &self.graphql
    }

    /// Execute one GraphQL query and decode its `data` member into `T`.
    #[instrument(skip_all, fields(endpoint = %self.graphql))]
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T, FetchError> {
        let body = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .client
            .post(self.graphql.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| self.request_error(err))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "backend returned non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.request_error(err))?;

        decode_envelope(&bytes)
    }

    fn request_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            FetchError::transport(err)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorBody {
    message: String,
}

fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FetchError> {
    let envelope: GraphqlEnvelope<T> = serde_json::from_slice(bytes).map_err(FetchError::decode)?;

    if !envelope.errors.is_empty() {
        return Err(FetchError::Backend {
            messages: envelope
                .errors
                .into_iter()
                .map(|error| error.message)
                .collect(),
        });
    }

    envelope
        .data
        .ok_or_else(|| FetchError::decode("response contained no data"))
}
