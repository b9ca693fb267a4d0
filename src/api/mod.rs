//! Client for the host web application's REST endpoints.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod latest;
pub mod pagination;
pub mod query;

use std::time::Duration;

use anyhow::Context;
use log::{debug, error};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::settings::ApiSettings;

pub use latest::{LatestRequest, RequestChannels, RequestTicket};
pub use pagination::Paginated;
pub use query::{ListQuery, SortDirection};

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("request was superseded")]
    Cancelled,
}

impl ApiError {
    /// Text safe to show inline. Only server-supplied messages pass through.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

#[derive(Deserialize)]
struct FailureBody {
    message: Option<String>,
}

/// The `message` field of a JSON failure body, if there is one.
pub fn failure_message(body: &str) -> Option<String> {
    serde_json::from_str::<FailureBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> Result<Paginated<T>, ApiError> {
        let url = self.url(path);
        debug!("GET {url} {:?}", query.to_pairs());
        let response = self.http.get(&url).query(&query.to_pairs()).send().await?;
        let page: Paginated<T> = decode(response).await?;
        Ok(page.normalized())
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {url}");
        let response = self.http.get(&url).query(params).send().await?;
        decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("POST {url}");
        let response = self.http.post(&url).json(body).send().await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!("DELETE {url}");
        let response = self.http.delete(&url).send().await?;
        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = failure_message(&body).unwrap_or_else(|| default_reason(status));
    error!("Request failed with {status}: {message}");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

fn default_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_default()
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_reads_message_field() {
        assert_eq!(
            failure_message(r#"{"message":"Batch not found"}"#).as_deref(),
            Some("Batch not found")
        );
        assert_eq!(failure_message(r#"{"message":"  "}"#), None);
        assert_eq!(failure_message("<html>502</html>"), None);
    }

    #[test]
    fn user_message_hides_transport_details() {
        let status = ApiError::Status {
            status: 422,
            message: "Machine is inactive".into(),
        };
        assert_eq!(status.user_message(), "Machine is inactive");

        let network = ApiError::Network("dns error: no such host".into());
        assert_eq!(network.user_message(), GENERIC_FAILURE);

        let blank = ApiError::Status {
            status: 500,
            message: String::new(),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn url_joins_without_doubled_slashes() {
        let client = ApiClient::new(&ApiSettings {
            base_url: "http://mill.local/api/".into(),
            ..ApiSettings::default()
        })
        .unwrap();
        assert_eq!(client.url("/machines"), "http://mill.local/api/machines");
        assert_eq!(client.url("batches/check"), "http://mill.local/api/batches/check");
    }
}
