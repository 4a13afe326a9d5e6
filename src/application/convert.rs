//! Markdown-to-presentation conversion.

use std::{sync::Arc, time::Instant};

use metrics::{counter, histogram};
use thiserror::Error;
use tracing::info;

use crate::application::{
    assemble::{AssembledBatch, assemble_with_specs},
    ports::{GoogleError, SlidesApi, UpstreamFailure},
};
use crate::domain::{credential::Credential, ids::SequentialIds, slides::SlideSpec};

pub const METRIC_PRESENTATIONS_CREATED: &str = "md2slides_presentations_created_total";
pub const METRIC_SLIDES_CREATED: &str = "md2slides_slides_created_total";
pub const METRIC_CONVERT_MS: &str = "md2slides_convert_ms";

const EDIT_URL_PREFIX: &str = "https://docs.google.com/presentation/d/";

/// Browser URL for editing the presentation `presentation_id`.
pub fn edit_url(presentation_id: &str) -> String {
    format!("{EDIT_URL_PREFIX}{presentation_id}/edit")
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no google credential is stored for this session")]
    Unauthenticated,
    #[error("the document contains no slides")]
    EmptyDocument,
    #[error("failed to create presentation")]
    CreatePresentation(#[source] GoogleError),
    #[error("failed to apply slide requests")]
    BatchUpdate(#[source] GoogleError),
}

impl ConvertError {
    pub fn upstream(&self) -> Option<&GoogleError> {
        match self {
            ConvertError::CreatePresentation(err) | ConvertError::BatchUpdate(err) => Some(err),
            ConvertError::Unauthenticated | ConvertError::EmptyDocument => None,
        }
    }

    pub fn failure(&self) -> Option<UpstreamFailure> {
        self.upstream().map(GoogleError::classify)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub presentation_id: String,
    pub edit_url: String,
    pub slides: Vec<SlideSpec>,
    pub request_count: usize,
}

#[derive(Debug, Clone)]
pub struct ConversionSettings {
    pub delimiter: String,
    pub default_title: String,
}

pub struct ConversionService {
    slides: Arc<dyn SlidesApi>,
    settings: ConversionSettings,
}

impl ConversionService {
    pub fn new(slides: Arc<dyn SlidesApi>, settings: ConversionSettings) -> Self {
        Self { slides, settings }
    }

    pub fn delimiter(&self) -> &str {
        &self.settings.delimiter
    }

    /// Create a presentation from `markdown` using `credential`.
    ///
    /// The document is assembled before any call to Google, so an empty
    /// document never creates a presentation.
    pub async fn convert(
        &self,
        credential: &Credential,
        markdown: &str,
    ) -> Result<Conversion, ConvertError> {
        let started = Instant::now();
        let mut ids = SequentialIds::random();
        let AssembledBatch { specs, ops } =
            assemble_with_specs(markdown, &self.settings.delimiter, &mut ids);
        if ops.is_empty() {
            return Err(ConvertError::EmptyDocument);
        }

        let title = specs
            .first()
            .and_then(|spec| spec.title.clone())
            .unwrap_or_else(|| self.settings.default_title.clone());

        let presentation = self
            .slides
            .create_presentation(credential, &title)
            .await
            .map_err(ConvertError::CreatePresentation)?;

        self.slides
            .batch_update(credential, &presentation.presentation_id, &ops)
            .await
            .map_err(ConvertError::BatchUpdate)?;

        counter!(METRIC_PRESENTATIONS_CREATED).increment(1);
        counter!(METRIC_SLIDES_CREATED).increment(specs.len() as u64);
        histogram!(METRIC_CONVERT_MS).record(started.elapsed().as_secs_f64() * 1000.0);
        info!(
            target = "md2slides::convert",
            presentation_id = %presentation.presentation_id,
            slides = specs.len(),
            requests = ops.len(),
            id_prefix = ids.prefix(),
            "created presentation"
        );

        Ok(Conversion {
            edit_url: edit_url(&presentation.presentation_id),
            presentation_id: presentation.presentation_id,
            slides: specs,
            request_count: ops.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::{builder::OPS_PER_SLIDE, ports::PresentationRef};
    use crate::domain::slides::MutationOp;

    #[derive(Default)]
    struct RecordingSlides {
        titles: Mutex<Vec<String>>,
        batches: Mutex<Vec<(String, Vec<MutationOp>)>>,
        fail_batch: Option<fn() -> GoogleError>,
    }

    #[async_trait]
    impl SlidesApi for RecordingSlides {
        async fn create_presentation(
            &self,
            _credential: &Credential,
            title: &str,
        ) -> Result<PresentationRef, GoogleError> {
            self.titles.lock().expect("lock").push(title.to_string());
            Ok(PresentationRef {
                presentation_id: "pres-123".to_string(),
                title: Some(title.to_string()),
            })
        }

        async fn batch_update(
            &self,
            _credential: &Credential,
            presentation_id: &str,
            requests: &[MutationOp],
        ) -> Result<(), GoogleError> {
            if let Some(fail) = self.fail_batch {
                return Err(fail());
            }
            self.batches
                .lock()
                .expect("lock")
                .push((presentation_id.to_string(), requests.to_vec()));
            Ok(())
        }
    }

    fn settings() -> ConversionSettings {
        ConversionSettings {
            delimiter: "---".to_string(),
            default_title: "Untitled deck".to_string(),
        }
    }

    #[tokio::test]
    async fn converts_document_into_one_batch() {
        let slides = Arc::new(RecordingSlides::default());
        let service = ConversionService::new(slides.clone(), settings());

        let conversion = service
            .convert(
                &Credential::bearer("token"),
                "# Hello\n\nWorld\n\n---\n\n- a\n- b",
            )
            .await
            .expect("conversion");

        assert_eq!(conversion.presentation_id, "pres-123");
        assert_eq!(
            conversion.edit_url,
            "https://docs.google.com/presentation/d/pres-123/edit"
        );
        assert_eq!(conversion.slides.len(), 2);
        assert_eq!(conversion.request_count, 2 * OPS_PER_SLIDE);

        assert_eq!(*slides.titles.lock().expect("lock"), ["Hello"]);
        let batches = slides.batches.lock().expect("lock");
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].0, "pres-123");
        assert_eq!(batches[0].1.len(), 2 * OPS_PER_SLIDE);
    }

    #[tokio::test]
    async fn untitled_first_slide_uses_default_title() {
        let slides = Arc::new(RecordingSlides::default());
        let service = ConversionService::new(slides.clone(), settings());

        service
            .convert(&Credential::bearer("token"), "no heading here")
            .await
            .expect("conversion");

        assert_eq!(*slides.titles.lock().expect("lock"), ["Untitled deck"]);
    }

    #[tokio::test]
    async fn empty_document_makes_no_calls() {
        let slides = Arc::new(RecordingSlides::default());
        let service = ConversionService::new(slides.clone(), settings());

        let err = service
            .convert(&Credential::bearer("token"), " \n---\n ")
            .await
            .expect_err("empty document");

        assert!(matches!(err, ConvertError::EmptyDocument));
        assert!(slides.titles.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn batch_failures_are_classified() {
        let slides = Arc::new(RecordingSlides {
            fail_batch: Some(|| {
                GoogleError::api(401, Some("UNAUTHENTICATED".into()), "Request had invalid credentials")
            }),
            ..Default::default()
        });
        let service = ConversionService::new(slides, settings());

        let err = service
            .convert(&Credential::bearer("expired"), "# Hi")
            .await
            .expect_err("batch failure");

        assert!(matches!(err, ConvertError::BatchUpdate(_)));
        assert_eq!(err.failure(), Some(UpstreamFailure::Unauthorized));
    }
}
