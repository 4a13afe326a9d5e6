//! JSON bodies exchanged with the Google OAuth and Slides endpoints.

use serde::{Deserialize, Serialize};

use crate::{
    application::ports::{GoogleError, PresentationRef},
    domain::{credential::Credential, slides::MutationOp},
};

#[derive(Debug, Serialize)]
pub(super) struct CreatePresentationBody<'a> {
    pub(super) title: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PresentationBody {
    pub(super) presentation_id: String,
    #[serde(default)]
    pub(super) title: Option<String>,
}

impl From<PresentationBody> for PresentationRef {
    fn from(body: PresentationBody) -> Self {
        Self {
            presentation_id: body.presentation_id,
            title: body.title,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct BatchUpdateBody<'a> {
    pub(super) requests: &'a [MutationOp],
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenBody {
    pub(super) access_token: String,
    #[serde(default)]
    pub(super) refresh_token: Option<String>,
    #[serde(default)]
    pub(super) token_type: Option<String>,
    #[serde(default)]
    pub(super) expires_in: Option<u64>,
}

impl From<TokenBody> for Credential {
    fn from(body: TokenBody) -> Self {
        Self {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            token_type: body.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in: body.expires_in,
        }
    }
}

/// Error payloads: Google APIs nest a status object under `error`, while the
/// OAuth token endpoint puts an error code string there.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ErrorEnvelope {
    Api {
        error: ApiErrorBody,
    },
    OAuth {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBody {
    #[serde(default)]
    pub(super) message: String,
    #[serde(default)]
    pub(super) status: Option<String>,
}

/// Build a [`GoogleError`] from a non-success response body.
pub(super) fn error_from_body(status: u16, body: &str) -> GoogleError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope::Api { error }) => GoogleError::api(status, error.status, error.message),
        Ok(ErrorEnvelope::OAuth {
            error,
            error_description,
        }) => {
            let message = match error_description {
                Some(description) => format!("{error}: {description}"),
                None => error.clone(),
            };
            GoogleError::api(status, Some(error), message)
        }
        Err(_) => {
            let trimmed = body.trim();
            let message = if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.chars().take(512).collect()
            };
            GoogleError::api(status, None, message)
        }
    }
}
