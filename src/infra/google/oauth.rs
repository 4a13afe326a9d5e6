use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::{
    application::ports::{GoogleError, OAuthClient},
    config::{GoogleClientSettings, GoogleSettings},
    domain::credential::Credential,
};

use super::{read_json, transport_error, wire::TokenBody};

/// Presentation editing plus access to files this app creates.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/presentations",
    "https://www.googleapis.com/auth/drive.file",
];

pub struct GoogleOAuthClient {
    http: Client,
    client: GoogleClientSettings,
    redirect_uri: Url,
    auth_url: Url,
    token_url: Url,
}

impl GoogleOAuthClient {
    pub fn new(http: Client, client: GoogleClientSettings, settings: &GoogleSettings) -> Self {
        Self {
            http,
            client,
            redirect_uri: settings.redirect_uri.clone(),
            auth_url: settings.auth_url.clone(),
            token_url: settings.token_url.clone(),
        }
    }
}

#[async_trait]
impl OAuthClient for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", state);
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential, GoogleError> {
        debug!(target = "md2slides::google::oauth", "exchanging authorization code");
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("code", code),
                ("client_id", self.client.client_id.as_str()),
                ("client_secret", self.client.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let body: TokenBody = read_json(response).await?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::*;

    fn client() -> GoogleOAuthClient {
        let settings = GoogleSettings {
            client: None,
            redirect_uri: Url::parse("http://localhost:3000/auth/google/callback").expect("url"),
            auth_url: Url::parse("https://accounts.google.com/o/oauth2/v2/auth").expect("url"),
            token_url: Url::parse("https://oauth2.googleapis.com/token").expect("url"),
            slides_api_base: Url::parse("https://slides.googleapis.com/").expect("url"),
            request_timeout: Duration::from_secs(5),
        };
        GoogleOAuthClient::new(
            Client::new(),
            GoogleClientSettings {
                client_id: "client-123.apps.googleusercontent.com".to_string(),
                client_secret: "shh".to_string(),
            },
            &settings,
        )
    }

    #[test]
    fn consent_url_requests_offline_access_with_forced_prompt() {
        let url = client().authorization_url("state-abc");
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-123.apps.googleusercontent.com");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:3000/auth/google/callback"
        );
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["state"], "state-abc");
        assert_eq!(
            params["scope"],
            "https://www.googleapis.com/auth/presentations https://www.googleapis.com/auth/drive.file"
        );
        assert!(!params.contains_key("client_secret"));
    }
}
