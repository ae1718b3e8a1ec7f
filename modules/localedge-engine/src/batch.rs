use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use browser_session::{SessionConfig, SessionManager};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use localedge_common::{
    BatchReport, BusinessListing, CitationRunSummary, CompetitorTarget, Config,
    DirectoryDescriptor, EngineError, ExtractionResult, FailureReason, SubmissionResult,
};
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::directories::submit;
use crate::extract::extract;
use crate::fallback::FallbackProvider;

/// Cooperative cancellation checked between batch items.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Upper bound on the random jitter added to the inter-item delay.
const DELAY_JITTER_MS: u64 = 500;

/// Run a batch strictly sequentially with per-item fault isolation.
///
/// Invariants: exactly one result per item, in submission order; an error
/// escaping `work` is converted via `tag_failure` instead of aborting the
/// batch; the politeness delay runs after every processed item regardless
/// of outcome. Once the cancel flag is set, the remaining items are
/// tagged `Cancelled` without being processed (and without delays), so
/// positional correlation with the input holds on every return path.
pub async fn run_batch<'a, T, R, F, Fut, G>(
    items: &'a [T],
    delay: Duration,
    cancel: &CancelFlag,
    mut work: F,
    mut tag_failure: G,
) -> Vec<R>
where
    F: FnMut(usize, &'a T) -> Fut,
    Fut: Future<Output = Result<R, EngineError>>,
    G: FnMut(usize, &'a T, FailureReason, String) -> R,
{
    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if cancel.is_cancelled() {
            let cancelled = EngineError::Cancelled;
            results.push(tag_failure(
                index,
                item,
                cancelled.reason(),
                cancelled.to_string(),
            ));
            continue;
        }

        let result = match work(index, item).await {
            Ok(r) => r,
            Err(e) => {
                warn!(index, error = %e, "Batch item failed");
                tag_failure(index, item, e.reason(), e.to_string())
            }
        };
        results.push(result);

        let jitter = Duration::from_millis(rand::rng().random_range(0..DELAY_JITTER_MS));
        tokio::time::sleep(delay + jitter).await;
    }
    results
}

/// Bounded-concurrency variant. Completion order is whatever it is; the
/// explicit index carried through each worker restores submission order
/// before returning, so `results[i]` still corresponds to `items[i]`.
pub async fn run_batch_concurrent<'a, T, R, F, Fut, G>(
    items: &'a [T],
    concurrency: usize,
    delay: Duration,
    cancel: &CancelFlag,
    work: F,
    tag_failure: G,
) -> Vec<R>
where
    T: Sync,
    F: Fn(usize, &'a T) -> Fut,
    Fut: Future<Output = Result<R, EngineError>>,
    G: Fn(usize, &'a T, FailureReason, String) -> R,
{
    let work = &work;
    let tag_failure = &tag_failure;
    let mut indexed: Vec<(usize, R)> = stream::iter(items.iter().enumerate())
        .map(|(index, item)| async move {
            if cancel.is_cancelled() {
                let cancelled = EngineError::Cancelled;
                return (
                    index,
                    tag_failure(index, item, cancelled.reason(), cancelled.to_string()),
                );
            }
            let result = match work(index, item).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(index, error = %e, "Batch item failed");
                    tag_failure(index, item, e.reason(), e.to_string())
                }
            };
            let jitter = Duration::from_millis(rand::rng().random_range(0..DELAY_JITTER_MS));
            tokio::time::sleep(delay + jitter).await;
            (index, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}

/// Drives one batch end to end: acquires the shared browser session
/// lazily, dispatches extraction or submission per item, and releases
/// the session exactly once when the batch finishes.
///
/// An orchestrator built with `offline` carries no session manager and
/// serves every extraction from the fallback provider instead.
pub struct BatchOrchestrator {
    config: Config,
    sessions: Option<SessionManager>,
    cancel: CancelFlag,
}

impl BatchOrchestrator {
    pub fn new(config: Config) -> Self {
        let session_config = SessionConfig {
            executable: config.chrome_executable.clone(),
            ..SessionConfig::default()
        };
        Self {
            config,
            sessions: Some(SessionManager::new(session_config)),
            cancel: CancelFlag::new(),
        }
    }

    /// No-automation mode: extraction batches yield labeled fallback
    /// payloads, citation batches report every directory as failed.
    pub fn offline(config: Config) -> Self {
        Self {
            config,
            sessions: None,
            cancel: CancelFlag::new(),
        }
    }

    /// Handle callers can use to cancel the batch between items.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Extract signals from every competitor target. `results[i]`
    /// corresponds to `targets[i]`.
    pub async fn run_extraction_batch(
        &self,
        targets: &[CompetitorTarget],
    ) -> Result<BatchReport<ExtractionResult>, EngineError> {
        let started_at = Utc::now();
        info!(targets = targets.len(), "Starting extraction batch");

        let results = match &self.sessions {
            None => {
                warn!("No automation configured, serving fallback payloads");
                self.offline_extraction(targets)
            }
            Some(manager) => {
                let session = manager
                    .acquire()
                    .await
                    .map_err(|e| EngineError::SessionStart(e.to_string()))?;
                let session = &session;
                let config = &self.config;
                let delay = Duration::from_millis(self.config.item_delay_ms);

                let results = if self.config.max_concurrency > 1 {
                    run_batch_concurrent(
                        targets,
                        self.config.max_concurrency,
                        delay,
                        &self.cancel,
                        |_, target| async move { Ok(extract(session, target, config).await) },
                        |_, _, reason, detail| ExtractionResult::Failed { reason, detail },
                    )
                    .await
                } else {
                    run_batch(
                        targets,
                        delay,
                        &self.cancel,
                        |_, target| async move { Ok(extract(session, target, config).await) },
                        |_, _, reason, detail| ExtractionResult::Failed { reason, detail },
                    )
                    .await
                };

                if let Err(e) = manager.release().await {
                    warn!(error = %e, "Session release failed");
                }
                results
            }
        };

        let failed = results.iter().filter(|r| r.is_failed()).count();
        info!(
            targets = targets.len(),
            failed, "Extraction batch complete"
        );

        Ok(BatchReport {
            batch_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            results,
        })
    }

    /// Submit a citation to every directory. Unrecognized directory types
    /// route to the generic strategy inside `submit`.
    pub async fn run_citation_batch(
        &self,
        directories: &[DirectoryDescriptor],
        listing: &BusinessListing,
    ) -> Result<(BatchReport<SubmissionResult>, CitationRunSummary), EngineError> {
        let started_at = Utc::now();
        info!(directories = directories.len(), "Starting citation batch");

        let results = match &self.sessions {
            None => directories
                .iter()
                .map(|d| SubmissionResult::Failed {
                    directory: d.name.clone(),
                    reason: FailureReason::SessionStartFailed,
                    detail: "automation not configured (offline mode)".into(),
                })
                .collect(),
            Some(manager) => {
                let session = manager
                    .acquire()
                    .await
                    .map_err(|e| EngineError::SessionStart(e.to_string()))?;
                let session = &session;
                let config = &self.config;
                let delay = Duration::from_millis(self.config.item_delay_ms);

                let results = run_batch(
                    directories,
                    delay,
                    &self.cancel,
                    |_, directory| async move { Ok(submit(session, directory, listing, config).await) },
                    |_, directory: &DirectoryDescriptor, reason, detail| SubmissionResult::Failed {
                        directory: directory.name.clone(),
                        reason,
                        detail,
                    },
                )
                .await;

                if let Err(e) = manager.release().await {
                    warn!(error = %e, "Session release failed");
                }
                results
            }
        };

        let summary = CitationRunSummary::from_results(&results);
        info!(
            total = summary.total_directories,
            submitted = summary.submitted,
            low_confidence = summary.low_confidence,
            failed = summary.failed,
            "Citation batch complete"
        );

        Ok((
            BatchReport {
                batch_id: Uuid::new_v4(),
                started_at,
                finished_at: Utc::now(),
                results,
            },
            summary,
        ))
    }

    fn offline_extraction(&self, targets: &[CompetitorTarget]) -> Vec<ExtractionResult> {
        let mut provider = FallbackProvider::new(self.config.fallback_seed);
        targets
            .iter()
            .map(|t| ExtractionResult::Fallback {
                payload: provider.synthetic_extraction(&t.url),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_sticky_and_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }
}
