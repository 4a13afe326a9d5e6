#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use md2slides::{
    application::ports::{GoogleError, OAuthClient, PresentationRef, SlidesApi},
    domain::{credential::Credential, slides::MutationOp},
};
use url::Url;

/// OAuth client that accepts every code unless told to fail.
#[derive(Default)]
pub struct FakeOAuth {
    pub fail_exchange: bool,
    pub exchanged: Mutex<Vec<String>>,
}

impl FakeOAuth {
    pub fn failing() -> Self {
        Self {
            fail_exchange: true,
            ..Self::default()
        }
    }

    pub fn exchanged(&self) -> Vec<String> {
        self.exchanged.lock().expect("lock").clone()
    }
}

#[async_trait]
impl OAuthClient for FakeOAuth {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = Url::parse("https://accounts.example.test/o/oauth2/auth").expect("url");
        url.query_pairs_mut().append_pair("state", state);
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential, GoogleError> {
        self.exchanged.lock().expect("lock").push(code.to_string());
        if self.fail_exchange {
            return Err(GoogleError::api(
                400,
                Some("invalid_grant".to_string()),
                "invalid_grant: Bad Request",
            ));
        }
        Ok(Credential::bearer(format!("token-{code}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlidesCall {
    Create { token: String, title: String },
    Batch { presentation_id: String, requests: Vec<MutationOp> },
}

/// Slides API double that records every call and can fail the batch update once.
#[derive(Default)]
pub struct FakeSlides {
    calls: Mutex<Vec<SlidesCall>>,
    batch_failure: Mutex<Option<GoogleError>>,
}

impl FakeSlides {
    pub fn failing_batch(error: GoogleError) -> Self {
        Self {
            batch_failure: Mutex::new(Some(error)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SlidesCall> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl SlidesApi for FakeSlides {
    async fn create_presentation(
        &self,
        credential: &Credential,
        title: &str,
    ) -> Result<PresentationRef, GoogleError> {
        let mut calls = self.calls.lock().expect("lock");
        calls.push(SlidesCall::Create {
            token: credential.access_token.clone(),
            title: title.to_string(),
        });
        Ok(PresentationRef {
            presentation_id: format!("pres-{}", calls.len()),
            title: Some(title.to_string()),
        })
    }

    async fn batch_update(
        &self,
        _credential: &Credential,
        presentation_id: &str,
        requests: &[MutationOp],
    ) -> Result<(), GoogleError> {
        self.calls.lock().expect("lock").push(SlidesCall::Batch {
            presentation_id: presentation_id.to_string(),
            requests: requests.to_vec(),
        });
        match self.batch_failure.lock().expect("lock").take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
