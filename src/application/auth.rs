//! Google sign-in flow: consent redirect and authorization code exchange.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::application::{
    ports::{GoogleError, OAuthClient},
    sessions::{SessionId, SessionStore},
};

pub const METRIC_AUTH_EXCHANGES: &str = "md2slides_auth_exchanges_total";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization state is missing or does not match this session")]
    StateMismatch,
    #[error("google did not grant consent: {0}")]
    ConsentDenied(String),
    #[error("authorization code exchange failed")]
    Exchange(#[source] GoogleError),
}

pub struct AuthService {
    oauth: Arc<dyn OAuthClient>,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(oauth: Arc<dyn OAuthClient>, sessions: SessionStore) -> Self {
        Self { oauth, sessions }
    }

    /// Start sign-in for `session`, returning the consent URL to redirect to.
    pub fn begin(&self, session: SessionId) -> Url {
        let state = self.sessions.issue_state(session);
        self.oauth.authorization_url(&state)
    }

    /// Finish sign-in: check `state`, exchange `code` and keep the credential.
    ///
    /// The session's previous credential is left untouched on any failure.
    pub async fn complete(
        &self,
        session: SessionId,
        code: &str,
        state: Option<&str>,
    ) -> Result<(), AuthError> {
        let presented = state.unwrap_or_default();
        if !self.sessions.take_state(session, presented) {
            warn!(
                target = "md2slides::auth",
                session = %session,
                "rejected callback with unexpected state"
            );
            return Err(AuthError::StateMismatch);
        }

        let credential = match self.oauth.exchange_code(code).await {
            Ok(credential) => credential,
            Err(err) => {
                counter!(METRIC_AUTH_EXCHANGES, "outcome" => "failure").increment(1);
                return Err(AuthError::Exchange(err));
            }
        };

        counter!(METRIC_AUTH_EXCHANGES, "outcome" => "success").increment(1);
        info!(
            target = "md2slides::auth",
            session = %session,
            has_refresh_token = credential.refresh_token.is_some(),
            "stored google credential"
        );
        self.sessions.store_credential(session, credential);
        Ok(())
    }

    /// Forget the credential held for `session`.
    pub fn sign_out(&self, session: SessionId) -> bool {
        self.sessions.clear_credential(session)
    }
}
