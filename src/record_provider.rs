use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::domain::RecipientRecord;

/// Fetches candidate recipients from the external user directory.
pub struct RecordProviderClient {
    http_client: Client,
    base_url: String,
}

impl RecordProviderClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Issues a single GET against the provider. Records without an `email`
    /// string are dropped, an empty result is reported as an error.
    #[tracing::instrument(name = "Fetching recipients from the record provider", skip(self))]
    pub async fn fetch_recipients(&self) -> Result<Vec<RecipientRecord>, FetchError> {
        let response = match self.http_client.get(&self.base_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error.message = %e, "Failed to fetch users from API");
                return Err(FetchError::FetchFailed { status: e.status() });
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Failed to fetch users from API");
            return Err(FetchError::FetchFailed {
                status: Some(status),
            });
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            // A body cut short by the timeout is still a failed fetch.
            Err(e) if e.is_timeout() => {
                tracing::error!(error.message = %e, "Failed to fetch users from API");
                return Err(FetchError::FetchFailed {
                    status: Some(status),
                });
            }
            Err(e) => return Err(FetchError::MalformedResponse(e.to_string())),
        };

        let records = parse_records(body)?;
        if records.is_empty() {
            return Err(FetchError::NoRecipientsAvailable);
        }
        Ok(records)
    }
}

/// `null`, `{}` and `[]` all mean there is nobody to write to. An object is
/// read as a collection of its values.
fn parse_records(body: Value) -> Result<Vec<RecipientRecord>, FetchError> {
    let values: Vec<Value> = match body {
        Value::Null => Vec::new(),
        Value::Array(values) => values,
        Value::Object(map) => map.into_iter().map(|(_, value)| value).collect(),
        other => {
            return Err(FetchError::MalformedResponse(format!(
                "expected a list of users, got {other}"
            )));
        }
    };

    Ok(values
        .iter()
        .filter_map(|value| {
            let record = RecipientRecord::from_provider(value);
            if record.is_none() {
                tracing::warn!("skipping a provider record. It has no email string");
            }
            record
        })
        .collect())
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("record provider request failed, status {status:?}")]
    FetchFailed { status: Option<StatusCode> },
    #[error("record provider returned no recipients")]
    NoRecipientsAvailable,
    #[error("record provider returned a malformed body, {0}")]
    MalformedResponse(String),
}
