//! The "Generate CML" action.
//!
//! Generation assembles every snippet into the base expression set, so
//! it is refused while that set is missing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::ServiceResult;
use crate::notify::{Notification, NotificationSink};

#[async_trait]
pub trait CmlGenerator: Send + Sync {
    /// Whether the base expression set exists.
    async fn pcm_all_exists(&self) -> ServiceResult<bool>;

    async fn snippet_count(&self) -> ServiceResult<usize>;

    /// Runs generation and returns the service's summary.
    async fn generate_cml(&self) -> ServiceResult<String>;
}

pub struct GenerateAction {
    generator: Arc<dyn CmlGenerator>,
    notifier: Arc<dyn NotificationSink>,
    pcm_all_exists: AtomicBool,
    snippet_count: AtomicUsize,
    is_generating: AtomicBool,
}

impl GenerateAction {
    pub fn new(generator: Arc<dyn CmlGenerator>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            generator,
            notifier,
            pcm_all_exists: AtomicBool::new(false),
            snippet_count: AtomicUsize::new(0),
            is_generating: AtomicBool::new(false),
        }
    }

    /// Re-reads the cached flags. Failures count as "missing" and zero.
    pub async fn refresh(&self) {
        let exists = self.generator.pcm_all_exists().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "checking base expression set failed");
            false
        });
        let count = self.generator.snippet_count().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "counting snippets failed");
            0
        });
        self.pcm_all_exists.store(exists, Ordering::Relaxed);
        self.snippet_count.store(count, Ordering::Relaxed);
    }

    pub fn pcm_all_exists(&self) -> bool {
        self.pcm_all_exists.load(Ordering::Relaxed)
    }

    pub fn snippet_count(&self) -> usize {
        self.snippet_count.load(Ordering::Relaxed)
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating.load(Ordering::Acquire)
    }

    /// Runs generation and notifies the outcome. Returns the summary on
    /// success; `None` when refused, already running, or failed.
    pub async fn generate(&self) -> Option<String> {
        if !self.pcm_all_exists() {
            self.notifier
                .notify(Notification::error("PCM_All ExpressionSet not found"));
            return None;
        }
        if self.is_generating.swap(true, Ordering::AcqRel) {
            tracing::debug!("generation already running");
            return None;
        }

        let result = self.generator.generate_cml().await;
        self.is_generating.store(false, Ordering::Release);

        match result {
            Ok(summary) => {
                tracing::info!(%summary, "CML generated");
                self.notifier.notify(Notification::success(summary.clone()));
                Some(summary)
            }
            Err(err) => {
                tracing::warn!(error = %err, "CML generation failed");
                self.notifier.notify(Notification::error(err.to_string()));
                None
            }
        }
    }
}
