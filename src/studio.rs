use crate::adapter::GenerationAdapter;
use crate::error::GenerationError;
use crate::gallery::Gallery;
use crate::models::{GenerationRequest, GenerationResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const IDLE_MESSAGE: &str = "Consulting the crystal ball...";

pub const LOADING_MESSAGES: [&str; 6] = [
    "Brewing the elixir...",
    "Summoning the spirits...",
    "Aligning the constellations...",
    "Whispering to the ravens...",
    "Incanting the sacred verses...",
    "Drawing the ritual circle...",
];

pub const ROTATION_INTERVAL: Duration = Duration::from_secs(3);

/// Flavor text shown while a generation is pending.
pub fn busy_message_at(elapsed: Duration) -> &'static str {
    let ticks = (elapsed.as_millis() / ROTATION_INTERVAL.as_millis()) as usize;
    if ticks == 0 {
        IDLE_MESSAGE
    } else {
        LOADING_MESSAGES[(ticks - 1) % LOADING_MESSAGES.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another submission is in flight; nothing happened.
    Busy,
    Recorded(GenerationResult),
    Failed(GenerationError),
}

struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Form → adapter → gallery, one submission at a time.
pub struct Studio {
    adapter: GenerationAdapter,
    gallery: Arc<Gallery>,
    busy: AtomicBool,
    pending_since: RwLock<Option<Instant>>,
    last_error: RwLock<Option<String>>,
}

impl Studio {
    pub fn new(adapter: GenerationAdapter) -> Self {
        Self::with_gallery(adapter, Arc::new(Gallery::new()))
    }

    pub fn with_gallery(adapter: GenerationAdapter, gallery: Arc<Gallery>) -> Self {
        Self {
            adapter,
            gallery,
            busy: AtomicBool::new(false),
            pending_since: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    pub fn gallery(&self) -> &Arc<Gallery> {
        &self.gallery
    }

    pub fn model_label(&self) -> &str {
        self.adapter.model_label()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn busy_message(&self) -> Option<&'static str> {
        if !self.is_busy() {
            return None;
        }
        let since = *self.pending_since.read().await;
        Some(busy_message_at(
            since.map(|start| start.elapsed()).unwrap_or_default(),
        ))
    }

    fn try_claim(&self) -> bool {
        let claimed = self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if !claimed {
            log::warn!("Submission ignored: a generation is already pending");
        }
        claimed
    }

    /// Runs one submission to completion; `Busy` if another is in flight.
    pub async fn submit(&self, request: GenerationRequest) -> SubmitOutcome {
        if !self.try_claim() {
            return SubmitOutcome::Busy;
        }
        let _guard = BusyGuard { flag: &self.busy };
        self.run(request).await
    }

    /// Claims the busy flag now and runs the submission on a background task,
    /// so callers can answer before the backend does. Returns `false` when
    /// another submission is in flight.
    pub fn spawn_submit(self: &Arc<Self>, request: GenerationRequest) -> bool {
        if !self.try_claim() {
            return false;
        }
        let studio = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = BusyGuard { flag: &studio.busy };
            if let SubmitOutcome::Failed(err) = studio.run(request).await {
                log::error!("❌ Background generation failed: {}", err);
            }
        });
        true
    }

    async fn run(&self, request: GenerationRequest) -> SubmitOutcome {
        *self.last_error.write().await = None;
        *self.pending_since.write().await = Some(Instant::now());

        let outcome = match self.adapter.generate(&request).await {
            Ok(result) => {
                self.gallery.record(result.clone()).await;
                SubmitOutcome::Recorded(result)
            }
            Err(err) => {
                *self.last_error.write().await = Some(err.user_message());
                SubmitOutcome::Failed(err)
            }
        };

        *self.pending_since.write().await = None;
        outcome
    }
}
