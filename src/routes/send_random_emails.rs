use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{domain::RecipientBatch, record_provider::FetchError, startup::AppState};

/// Body of every response returned by the trigger route.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetches the current users, samples a handful of them and queues a welcome
/// email for each. Returns as soon as the job is queued, nothing has been sent
/// at that point.
#[tracing::instrument(name = "Queueing welcome emails for random users", skip(app_state))]
pub async fn send_random_emails(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<TriggerResponse>, TriggerError> {
    let records = app_state
        .record_provider
        .fetch_recipients()
        .await
        .map_err(|e| TriggerError::from_fetch(e, app_state.debug))?;

    let batch = RecipientBatch::sample(&records, app_state.sample_size);
    let recipients = batch.len();

    app_state
        .queue
        .enqueue(batch)
        .context("Failed to queue the dispatch job")
        .map_err(|e| TriggerError::unexpected(e, app_state.debug))?;

    Ok(Json(TriggerResponse {
        success: true,
        message: format!("Emails queued successfully for {recipients} random users!"),
        error: None,
    }))
}

#[derive(thiserror::Error, Debug)]
pub enum TriggerError {
    #[error("Failed to fetch users from API")]
    FetchFailed(#[source] FetchError),
    #[error("No users found in API response")]
    NoRecipientsAvailable,
    #[error("An error occurred while processing the request")]
    Unexpected {
        #[source]
        source: anyhow::Error,
        expose_detail: bool,
    },
}

impl TriggerError {
    fn from_fetch(error: FetchError, expose_detail: bool) -> Self {
        match error {
            FetchError::FetchFailed { .. } => TriggerError::FetchFailed(error),
            FetchError::NoRecipientsAvailable => TriggerError::NoRecipientsAvailable,
            FetchError::MalformedResponse(_) => TriggerError::Unexpected {
                source: anyhow::Error::new(error),
                expose_detail,
            },
        }
    }

    fn unexpected(source: anyhow::Error, expose_detail: bool) -> Self {
        TriggerError::Unexpected {
            source,
            expose_detail,
        }
    }
}

impl IntoResponse for TriggerError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            TriggerError::FetchFailed(_) => {
                tracing::error!(error.cause_chain = ?self, "{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            TriggerError::NoRecipientsAvailable => {
                tracing::warn!("{}", self);
                (StatusCode::NOT_FOUND, None)
            }
            TriggerError::Unexpected {
                source,
                expose_detail,
            } => {
                tracing::error!(error.cause_chain = ?self, "{}", self);
                let detail = if *expose_detail {
                    format!("{source:#}")
                } else {
                    String::from("Internal server error")
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Some(detail))
            }
        };

        let body = TriggerResponse {
            success: false,
            message: self.to_string(),
            error,
        };
        (status, Json(body)).into_response()
    }
}
