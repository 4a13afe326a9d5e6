use crate::application::{
    convert::Conversion,
    error::HttpError,
};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Render `error` as an HTML page, keeping its diagnostic report on the response.
pub fn render_error_page(error: HttpError) -> Response {
    let status = error.status();
    let view = ErrorPageView {
        status_code: status.as_u16(),
        title: status
            .canonical_reason()
            .unwrap_or("Something went wrong")
            .to_string(),
        message: error.public_message().to_string(),
        show_sign_in: error.offers_sign_in(),
    };

    let mut response = render_template_response(ErrorTemplate { view }, status);
    error.into_report().attach(&mut response);
    response
}

pub fn render_not_found_response() -> Response {
    render_error_page(HttpError::new(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "The page you requested does not exist.",
        "Resource not found",
    ))
}

pub struct IndexView {
    pub connected: bool,
    pub delimiter: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: IndexView,
}

pub struct SlideSummaryView {
    pub number: usize,
    pub title: String,
    pub body_lines: Vec<String>,
}

pub struct SuccessView {
    pub presentation_id: String,
    pub edit_url: String,
    pub request_count: usize,
    pub slides: Vec<SlideSummaryView>,
}

impl From<&Conversion> for SuccessView {
    fn from(conversion: &Conversion) -> Self {
        let slides = conversion
            .slides
            .iter()
            .enumerate()
            .map(|(index, spec)| SlideSummaryView {
                number: index + 1,
                title: spec.display_title(index),
                body_lines: spec.body_lines.clone(),
            })
            .collect();

        Self {
            presentation_id: conversion.presentation_id.clone(),
            edit_url: conversion.edit_url.clone(),
            request_count: conversion.request_count,
            slides,
        }
    }
}

#[derive(Template)]
#[template(path = "success.html")]
pub struct SuccessTemplate {
    pub view: SuccessView,
}

pub struct ErrorPageView {
    pub status_code: u16,
    pub title: String,
    pub message: String,
    pub show_sign_in: bool,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: ErrorPageView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{application::error::ErrorReport, domain::slides::SlideSpec};

    #[test]
    fn index_offers_sign_in_until_connected() {
        let html = IndexTemplate {
            view: IndexView {
                connected: false,
                delimiter: "---".to_string(),
            },
        }
        .render()
        .expect("render index");
        assert!(html.contains(r#"href="/auth/google""#));
        assert!(!html.contains(r#"name="markdownText""#));

        let html = IndexTemplate {
            view: IndexView {
                connected: true,
                delimiter: "---".to_string(),
            },
        }
        .render()
        .expect("render index");
        assert!(html.contains(r#"name="markdownText""#));
        assert!(html.contains(r#"action="/auth/logout""#));
    }

    #[test]
    fn success_page_lists_slides_and_escapes_text() {
        let conversion = Conversion {
            presentation_id: "abc123".to_string(),
            edit_url: "https://docs.google.com/presentation/d/abc123/edit".to_string(),
            slides: vec![
                SlideSpec {
                    title: Some("Hello <world>".to_string()),
                    body_lines: vec!["World".to_string()],
                },
                SlideSpec {
                    title: None,
                    body_lines: vec!["• a".to_string(), "• b".to_string()],
                },
            ],
            request_count: 14,
        };

        let html = SuccessTemplate {
            view: SuccessView::from(&conversion),
        }
        .render()
        .expect("render success");

        assert!(html.contains("https://docs.google.com/presentation/d/abc123/edit"));
        assert!(html.contains("Hello &#60;world&#62;") || html.contains("Hello &lt;world&gt;"));
        assert!(html.contains("Slide 2"));
        assert!(html.contains("• b"));
    }

    #[test]
    fn error_page_keeps_status_and_report() {
        let error = HttpError::new(
            "test",
            StatusCode::UNAUTHORIZED,
            "Please connect your Google account before converting.",
            "no credential",
        )
        .with_sign_in();

        let response = render_error_page(error);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.messages, ["no credential"]);
    }
}
