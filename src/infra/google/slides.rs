use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::{
    application::ports::{GoogleError, PresentationRef, SlidesApi},
    domain::{credential::Credential, slides::MutationOp},
};

use super::{
    read_json, transport_error,
    wire::{BatchUpdateBody, CreatePresentationBody, PresentationBody},
};

pub struct GoogleSlidesClient {
    http: Client,
    base: Url,
}

impl GoogleSlidesClient {
    /// `base` is the API root, e.g. `https://slides.googleapis.com/`.
    pub fn new(http: Client, base: Url) -> Self {
        Self { http, base }
    }

    fn presentations_url(&self, suffix: &str) -> Result<Url, GoogleError> {
        self.base
            .join(&format!("v1/presentations{suffix}"))
            .map_err(|err| GoogleError::Transport(format!("invalid slides endpoint: {err}")))
    }
}

#[async_trait]
impl SlidesApi for GoogleSlidesClient {
    async fn create_presentation(
        &self,
        credential: &Credential,
        title: &str,
    ) -> Result<PresentationRef, GoogleError> {
        let url = self.presentations_url("")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&credential.access_token)
            .json(&CreatePresentationBody { title })
            .send()
            .await
            .map_err(transport_error)?;

        let body: PresentationBody = read_json(response).await?;
        debug!(
            target = "md2slides::google::slides",
            presentation_id = %body.presentation_id,
            "created empty presentation"
        );
        Ok(body.into())
    }

    async fn batch_update(
        &self,
        credential: &Credential,
        presentation_id: &str,
        requests: &[MutationOp],
    ) -> Result<(), GoogleError> {
        let url = self.presentations_url(&format!("/{presentation_id}:batchUpdate"))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&credential.access_token)
            .json(&BatchUpdateBody { requests })
            .send()
            .await
            .map_err(transport_error)?;

        // The reply echoes one entry per request; only success matters here.
        let _: serde_json::Value = read_json(response).await?;
        debug!(
            target = "md2slides::google::slides",
            presentation_id,
            requests = requests.len(),
            "applied batch update"
        );
        Ok(())
    }
}
