//! Stub backends and transports shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::{Notify, Semaphore};
use witching_hour::adapter::{HttpResponse, Transport};
use witching_hour::{AspectRatio, GenerationError, ImageBackend, ImageReference};

/// A request the stub transport saw.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// Replays queued responses in order; an empty queue answers 500.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, GenerationError>>>,
    requests: Mutex<Vec<CapturedRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(status: u16, body: &str) -> Self {
        let transport = Self::new();
        transport.push(status, body);
        transport
    }

    pub fn push(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn push_error(&self, err: GenerationError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<HttpResponse, GenerationError> {
        self.requests.lock().unwrap().push(CapturedRequest {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            body: body.clone(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(500, "no stub response queued")))
    }
}

/// Answers with a fresh URL per call, after replaying any queued errors.
pub struct StubBackend {
    calls: AtomicUsize,
    errors: Mutex<VecDeque<GenerationError>>,
}

impl StubBackend {
    pub fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            errors: Mutex::new(VecDeque::new()),
        }
    }

    /// Fails the first call with `error`, succeeds afterwards.
    pub fn failing(error: GenerationError) -> Self {
        let backend = Self::ok();
        backend.errors.lock().unwrap().push_back(error);
        backend
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageBackend for StubBackend {
    fn model_label(&self) -> &str {
        "stub-model"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<ImageReference, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.errors.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(ImageReference::url(format!("https://stub/{}.png", n))),
        }
    }
}

/// Blocks inside `generate` until the test releases it.
pub struct GatedBackend {
    pub entered: Notify,
    release: Semaphore,
    calls: AtomicUsize,
}

impl GatedBackend {
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release_one(&self) {
        self.release.add_permits(1);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageBackend for GatedBackend {
    fn model_label(&self) -> &str {
        "gated-model"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<ImageReference, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        let permit = self
            .release
            .acquire()
            .await
            .map_err(|e| GenerationError::Unknown(e.to_string()))?;
        permit.forget();
        Ok(ImageReference::url("https://stub/gated.png"))
    }
}
