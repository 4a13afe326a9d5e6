//! `reqwest` adapters for the Google OAuth and Slides endpoints.

mod oauth;
mod slides;
mod wire;

pub use oauth::{GoogleOAuthClient, SCOPES};
pub use slides::GoogleSlidesClient;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{application::ports::GoogleError, config::GoogleSettings, infra::error::InfraError};

/// Shared HTTP client for all Google calls.
pub fn build_client(settings: &GoogleSettings) -> Result<Client, InfraError> {
    Client::builder()
        .user_agent(concat!("md2slides/", env!("CARGO_PKG_VERSION")))
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| InfraError::http_client(err.to_string()))
}

fn transport_error(err: reqwest::Error) -> GoogleError {
    GoogleError::Transport(err.to_string())
}

/// Decode a successful JSON response, or turn an error status into a
/// [`GoogleError`] carrying Google's message.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GoogleError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(wire::error_from_body(status.as_u16(), &body));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| GoogleError::Decode(err.to_string()))
}
