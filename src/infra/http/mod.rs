mod middleware;
mod routes;
pub mod session;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::application::{
    auth::AuthService,
    convert::{ConversionService, ConversionSettings},
    ports::{OAuthClient, SlidesApi},
    sessions::SessionStore,
};

pub use middleware::{REQUEST_ID_HEADER, RequestContext};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub conversions: Arc<ConversionService>,
    pub sessions: SessionStore,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wire the services around one shared session store.
    pub fn new(
        oauth: Arc<dyn OAuthClient>,
        slides: Arc<dyn SlidesApi>,
        conversion: ConversionSettings,
        cookie_secure: bool,
    ) -> Self {
        let sessions = SessionStore::new();
        Self {
            auth: Arc::new(AuthService::new(oauth, sessions.clone())),
            conversions: Arc::new(ConversionService::new(slides, conversion)),
            sessions,
            cookie_secure,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/auth/google", get(routes::auth_start))
        .route("/auth/google/callback", get(routes::auth_callback))
        .route("/auth/logout", post(routes::logout))
        .route("/convert", post(routes::convert))
        .route("/_health", get(routes::health))
        .route("/static/{*path}", get(crate::infra::assets::serve_static))
        .fallback(routes::fallback)
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
