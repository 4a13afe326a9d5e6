use std::{borrow::Cow, error::Error as StdError};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{auth::AuthError, convert::ConvertError, ports::UpstreamFailure},
    domain::error::DomainError,
    infra::error::InfraError,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// An error on its way to becoming an HTTP response.
///
/// `public_message` is shown to the user; the report carries the diagnostic
/// chain for the response logger.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: Cow<'static, str>,
    offer_sign_in: bool,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<Cow<'static, str>>,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message: public_message.into(),
            offer_sign_in: false,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<Cow<'static, str>>,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message: public_message.into(),
            offer_sign_in: false,
            report,
        }
    }

    /// Mark the error as one the user can fix by signing in again.
    pub fn with_sign_in(mut self) -> Self {
        self.offer_sign_in = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn public_message(&self) -> &str {
        &self.public_message
    }

    pub fn offers_sign_in(&self) -> bool {
        self.offer_sign_in
    }

    pub fn into_report(self) -> ErrorReport {
        self.report
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message.into_owned()).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<ConvertError> for HttpError {
    fn from(error: ConvertError) -> Self {
        const SOURCE: &str = "application::error::convert_error_to_http_error";
        match &error {
            ConvertError::Unauthenticated => HttpError::from_error(
                SOURCE,
                StatusCode::UNAUTHORIZED,
                "Please connect your Google account before converting.",
                &error,
            )
            .with_sign_in(),
            ConvertError::EmptyDocument => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "Nothing to convert: the Markdown contains no slides.",
                &error,
            ),
            ConvertError::CreatePresentation(upstream) | ConvertError::BatchUpdate(upstream) => {
                match upstream.classify() {
                    UpstreamFailure::MissingLayout => HttpError::from_error(
                        SOURCE,
                        StatusCode::BAD_REQUEST,
                        "The requested slide layout is not available in this presentation.",
                        &error,
                    ),
                    UpstreamFailure::Unauthorized => HttpError::from_error(
                        SOURCE,
                        StatusCode::UNAUTHORIZED,
                        "Google authorization expired or was revoked. Please sign in again.",
                        &error,
                    )
                    .with_sign_in(),
                    UpstreamFailure::Other => HttpError::from_error(
                        SOURCE,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Conversion failed: {error}: {upstream}"),
                        &error,
                    ),
                }
            }
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(error: AuthError) -> Self {
        const SOURCE: &str = "application::error::auth_error_to_http_error";
        match &error {
            AuthError::StateMismatch => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "The sign-in request expired or did not originate here. Please try again.",
                &error,
            )
            .with_sign_in(),
            AuthError::ConsentDenied(_) => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "Google access was not granted.",
                &error,
            )
            .with_sign_in(),
            AuthError::Exchange(_) => HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication failed.",
                &error,
            )
            .with_sign_in(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
