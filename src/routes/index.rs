use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use rinja_axum::Template;

use crate::startup::AppState;

#[derive(Template)]
#[template(path = "index.html")]
struct WelcomePageTemplate {
    title: String,
    sample_size: usize,
}

pub async fn index(State(app_state): State<Arc<AppState>>) -> Response {
    let template = WelcomePageTemplate {
        title: String::from("Our Service"),
        sample_size: app_state.sample_size,
    };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("couldn't render the welcome page, {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
