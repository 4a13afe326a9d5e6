use axum::{
    extract::{Form, Query, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    application::{
        auth::AuthError,
        convert::ConvertError,
        error::HttpError,
        ports::UpstreamFailure,
    },
    presentation::views::{
        IndexTemplate, IndexView, SuccessTemplate, SuccessView, render_error_page,
        render_not_found_response, render_template_response,
    },
};

use super::{
    AppState,
    session::{current_session, ensure_session},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ConvertForm {
    #[serde(rename = "markdownText", default)]
    markdown_text: String,
}

pub(super) async fn index(State(state): State<AppState>, jar: CookieJar) -> Response {
    let connected = current_session(&jar)
        .map(|session| state.sessions.has_credential(session))
        .unwrap_or(false);

    let view = IndexView {
        connected,
        delimiter: state.conversions.delimiter().to_string(),
    };
    render_template_response(IndexTemplate { view }, StatusCode::OK)
}

pub(super) async fn auth_start(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (session, jar) = ensure_session(jar, state.cookie_secure);
    let url = state.auth.begin(session);
    (jar, Redirect::to(url.as_str())).into_response()
}

pub(super) async fn auth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(reason) = query.error {
        return render_error_page(AuthError::ConsentDenied(reason).into());
    }

    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        return render_error_page(
            HttpError::new(
                "infra::http::routes::auth_callback",
                StatusCode::BAD_REQUEST,
                "The sign-in response did not include an authorization code.",
                "missing `code` query parameter",
            )
            .with_sign_in(),
        );
    };

    let Some(session) = current_session(&jar) else {
        return render_error_page(AuthError::StateMismatch.into());
    };

    match state
        .auth
        .complete(session, &code, query.state.as_deref())
        .await
    {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => render_error_page(err.into()),
    }
}

pub(super) async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(session) = current_session(&jar) {
        if state.auth.sign_out(session) {
            info!(target = "md2slides::auth", session = %session, "signed out");
        }
    }
    Redirect::to("/").into_response()
}

pub(super) async fn convert(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<ConvertForm>, FormRejection>,
) -> Response {
    // Authentication is checked before the body so unauthenticated calls never reach Google.
    let Some(session) = current_session(&jar) else {
        return render_error_page(ConvertError::Unauthenticated.into());
    };
    let Some(credential) = state.sessions.credential(session) else {
        return render_error_page(ConvertError::Unauthenticated.into());
    };

    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            return render_error_page(HttpError::from_error(
                "infra::http::routes::convert",
                StatusCode::BAD_REQUEST,
                "The submitted form could not be read.",
                &rejection,
            ));
        }
    };

    match state
        .conversions
        .convert(&credential, &form.markdown_text)
        .await
    {
        Ok(conversion) => {
            let view = SuccessView::from(&conversion);
            render_template_response(SuccessTemplate { view }, StatusCode::OK)
        }
        Err(err) => {
            if err.failure() == Some(UpstreamFailure::Unauthorized) {
                state.sessions.clear_credential(session);
                warn!(
                    target = "md2slides::convert",
                    session = %session,
                    "google rejected the stored credential; cleared it"
                );
            }
            render_error_page(err.into())
        }
    }
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(super) async fn fallback() -> Response {
    render_not_found_response()
}
