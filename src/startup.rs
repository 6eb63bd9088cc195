use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{Router, extract::Request, response::Response, routing::get, serve::Serve};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Span, field, info, info_span};
use uuid::Uuid;

use crate::{
    configuration::Settings,
    dispatch::{self, DispatchQueue, DispatchWorker, FailurePolicy},
    email_client::EmailClient,
    record_provider::RecordProviderClient,
    routes::{health_check, index, send_random_emails},
};

pub struct AppState {
    pub record_provider: RecordProviderClient,
    pub queue: DispatchQueue,
    pub sample_size: usize,
    pub debug: bool,
}

pub async fn run(
    listener: TcpListener,
    app_state: AppState,
) -> anyhow::Result<Serve<TcpListener, Router, Router>> {
    // Shared by every handler, cloning the Arc is all a request costs.
    let app_state = Arc::new(app_state);
    let app = Router::new()
        .route("/", get(index))
        .route("/health_check", get(health_check))
        .route("/send-random-emails", get(send_random_emails))
        .with_state(app_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = Uuid::new_v4();
                    info_span!(
                        "http_request",
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        request_id = ?request_id,
                        status = field::Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    let status = response.status();
                    span.record("status", status.as_u16());
                    info!(parent: span, ?status, ?latency, "Response sent");
                }),
        );

    Ok(axum::serve(listener, app))
}

pub struct Application {
    port: u16,
    server: Serve<TcpListener, Router, Router>,
    worker: DispatchWorker,
    email_client: EmailClient,
    failure_policy: FailurePolicy,
}

impl Application {
    // build wires the HTTP server and the dispatch worker together,
    // `run_until_stopped` then drives both
    pub async fn build(configuration: Settings) -> anyhow::Result<Self> {
        let sender_email = configuration
            .email_client
            .sender()
            .map_err(anyhow::Error::msg)
            .context("Invalid sender email address.")?;
        let timeout = configuration.email_client.timeout();
        let email_client = EmailClient::new(
            sender_email,
            configuration.email_client.base_url,
            configuration.email_client.authorization_token,
            timeout,
        )
        .context("Failed to build the email client")?;

        let record_provider = RecordProviderClient::new(
            configuration.record_provider.base_url.clone(),
            configuration.record_provider.timeout(),
        )
        .context("Failed to build the record provider client")?;

        let (queue, worker) = dispatch::channel(configuration.dispatch.queue_capacity);

        let listener = TcpListener::bind(format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        ))
        .await?;
        let port = listener.local_addr()?.port();

        let app_state = AppState {
            record_provider,
            queue,
            sample_size: configuration.dispatch.sample_size,
            debug: configuration.application.debug,
        };
        let server = run(listener, app_state).await?;

        Ok(Self {
            port,
            server,
            worker,
            email_client,
            failure_policy: configuration.dispatch.failure_policy,
        })
    }

    /// Serves requests and delivers queued jobs until either side stops.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let Self {
            server,
            worker,
            email_client,
            failure_policy,
            ..
        } = self;

        tokio::select! {
            outcome = server.into_future() => {
                outcome.context("The API server stopped")?;
                info!("API server has exited");
            }
            outcome = worker.run_until_stopped(email_client, failure_policy) => {
                outcome.context("The dispatch worker stopped")?;
                info!("Dispatch worker has exited");
            }
        }
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
