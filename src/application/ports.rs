//! Traits describing the Google collaborators used by the application layer.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::domain::{credential::Credential, slides::MutationOp};

/// Failure reported by a Google endpoint or while talking to it.
#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("google returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("request to google failed: {0}")]
    Transport(String),
    #[error("unexpected response from google: {0}")]
    Decode(String),
}

/// Known shapes of upstream failures that deserve a tailored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    MissingLayout,
    Unauthorized,
    Other,
}

impl GoogleError {
    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn classify(&self) -> UpstreamFailure {
        let GoogleError::Api {
            status,
            code,
            message,
        } = self
        else {
            return UpstreamFailure::Other;
        };

        let message = message.to_ascii_lowercase();
        let code = code.as_deref().unwrap_or_default();

        if *status == 401
            || code.eq_ignore_ascii_case("UNAUTHENTICATED")
            || code.eq_ignore_ascii_case("invalid_grant")
            || message.contains("invalid_grant")
            || message.contains("invalid credentials")
            || message.contains("unauthorized")
        {
            return UpstreamFailure::Unauthorized;
        }

        if message.contains("layout")
            && (message.contains("not found")
                || message.contains("does not exist")
                || code.eq_ignore_ascii_case("INVALID_ARGUMENT"))
        {
            return UpstreamFailure::MissingLayout;
        }

        UpstreamFailure::Other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationRef {
    pub presentation_id: String,
    pub title: Option<String>,
}

#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Consent URL the browser is sent to, carrying `state` back on return.
    fn authorization_url(&self, state: &str) -> Url;

    async fn exchange_code(&self, code: &str) -> Result<Credential, GoogleError>;
}

#[async_trait]
pub trait SlidesApi: Send + Sync {
    async fn create_presentation(
        &self,
        credential: &Credential,
        title: &str,
    ) -> Result<PresentationRef, GoogleError>;

    /// Apply `requests` to the presentation as one atomic batch.
    async fn batch_update(
        &self,
        credential: &Credential,
        presentation_id: &str,
        requests: &[MutationOp],
    ) -> Result<(), GoogleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_shapes_are_recognised() {
        let cases = [
            GoogleError::api(401, Some("UNAUTHENTICATED".into()), "Request had invalid authentication credentials."),
            GoogleError::api(400, Some("invalid_grant".into()), "Bad Request"),
            GoogleError::api(400, None, "Token has been expired or revoked: invalid_grant"),
        ];
        for error in cases {
            assert_eq!(error.classify(), UpstreamFailure::Unauthorized, "{error}");
        }
    }

    #[test]
    fn missing_layout_is_recognised() {
        let error = GoogleError::api(
            400,
            Some("INVALID_ARGUMENT".into()),
            "Invalid requests[0].createSlide: The layout TITLE_AND_BODY was not found.",
        );
        assert_eq!(error.classify(), UpstreamFailure::MissingLayout);

        let unavailable = GoogleError::api(
            400,
            Some("INVALID_ARGUMENT".into()),
            "Invalid requests[0].createSlide: The predefined layout TITLE_AND_BODY is not available in this presentation.",
        );
        assert_eq!(unavailable.classify(), UpstreamFailure::MissingLayout);
    }

    #[test]
    fn everything_else_is_other() {
        assert_eq!(
            GoogleError::api(500, Some("INTERNAL".into()), "Internal error encountered.").classify(),
            UpstreamFailure::Other
        );
        assert_eq!(
            GoogleError::api(400, Some("INVALID_ARGUMENT".into()), "Invalid requests[2].insertText: text is too long.")
                .classify(),
            UpstreamFailure::Other
        );
        assert_eq!(
            GoogleError::Transport("connection reset".into()).classify(),
            UpstreamFailure::Other
        );
    }
}
