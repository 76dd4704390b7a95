// Prefetch interactor - Parallel translation duration lookup

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::adapters::LookupConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// State of the duration map as seen by consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationSnapshot {
    /// Durations resolved so far, fallbacks included
    pub durations: Arc<TranslationDurationMap>,
    /// True until every lookup has finished or timed out
    pub loading: bool,
    pub resolved: usize,
    pub total: usize,
}

impl DurationSnapshot {
    /// Snapshot before any lookup has resolved
    pub fn pending(total: usize) -> Self {
        Self {
            durations: Arc::new(TranslationDurationMap::new()),
            loading: total > 0,
            resolved: 0,
            total,
        }
    }

    /// Snapshot of a finished map
    pub fn complete(durations: TranslationDurationMap) -> Self {
        let total = durations.len();
        Self {
            durations: Arc::new(durations),
            loading: false,
            resolved: total,
            total,
        }
    }
}

/// Outcome of a prefetch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub durations: TranslationDurationMap,
    /// Verses whose duration was measured
    pub fetched: usize,
    /// Verses that fell back to the default duration
    pub fallbacks: Vec<VerseRef>,
}

/// Looks up translation durations for many verses at once.
///
/// One task per verse, each with its own timeout; a failed or timed out
/// lookup contributes the fallback duration. The run completes only when
/// every task has finished.
pub struct DurationPrefetcher {
    port: Arc<dyn TranslationDurationPort>,
    fallback_frames: Frames,
    timeout: Duration,
    max_concurrency: usize,
}

impl DurationPrefetcher {
    /// Create new prefetcher from configuration
    pub fn new(
        port: Arc<dyn TranslationDurationPort>,
        settings: &TimelineSettings,
        lookup: &LookupConfig,
    ) -> Self {
        Self::with_limits(
            port,
            settings.fallback_translation_frames,
            lookup.timeout(),
            lookup.max_concurrency,
        )
    }

    pub fn with_limits(
        port: Arc<dyn TranslationDurationPort>,
        fallback_frames: Frames,
        timeout: Duration,
        max_concurrency: usize,
    ) -> Self {
        Self {
            port,
            fallback_frames,
            timeout,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Fetch all durations and return once every lookup has settled
    pub async fn prefetch(&self, verses: &[VerseRef]) -> PrefetchReport {
        let (updates, _) = watch::channel(DurationSnapshot::pending(0));
        self.prefetch_with_updates(verses, &updates).await
    }

    /// Fetch all durations, publishing a snapshot each time one resolves
    pub async fn prefetch_with_updates(
        &self,
        verses: &[VerseRef],
        updates: &watch::Sender<DurationSnapshot>,
    ) -> PrefetchReport {
        let mut seen = HashSet::new();
        let unique: Vec<VerseRef> = verses.iter().copied().filter(|v| seen.insert(*v)).collect();
        let total = unique.len();

        updates.send_replace(DurationSnapshot::pending(total));
        info!(verses = total, "Fetching translation durations");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for verse in unique.iter().copied() {
            let port = Arc::clone(&self.port);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.timeout;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = match tokio::time::timeout(timeout, port.translation_duration(&verse)).await {
                    Ok(Ok(0)) => Err(DomainError::LookupFailure(format!(
                        "Zero-length translation audio for {}",
                        verse
                    ))),
                    Ok(result) => result,
                    Err(_) => Err(DomainError::LookupFailure(format!(
                        "Lookup for {} timed out after {}ms",
                        verse,
                        timeout.as_millis()
                    ))),
                };
                (verse, outcome)
            });
        }

        let mut report = PrefetchReport::default();
        let mut resolved = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((verse, Ok(frames))) => {
                    debug!(verse = %verse, frames, "Fetched translation duration");
                    report.durations.insert(&verse, frames);
                    report.fetched += 1;
                }
                Ok((verse, Err(e))) => {
                    warn!(
                        verse = %verse,
                        error = %e,
                        fallback = self.fallback_frames,
                        "Using fallback translation duration"
                    );
                    report.durations.insert(&verse, self.fallback_frames);
                    report.fallbacks.push(verse);
                }
                Err(e) => {
                    warn!(error = %e, "Duration lookup task failed");
                }
            }

            resolved += 1;
            updates.send_replace(DurationSnapshot {
                durations: Arc::new(report.durations.clone()),
                loading: resolved < total,
                resolved,
                total,
            });
        }

        // A panicked task leaves its verse unresolved.
        for verse in &unique {
            if !report.durations.contains(verse) {
                report.durations.insert(verse, self.fallback_frames);
                report.fallbacks.push(*verse);
            }
        }
        report.fallbacks.sort();

        updates.send_replace(DurationSnapshot {
            durations: Arc::new(report.durations.clone()),
            loading: false,
            resolved: total,
            total,
        });

        info!(
            fetched = report.fetched,
            fallbacks = report.fallbacks.len(),
            "Translation durations ready"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Port answering from a table, sleeping where asked
    struct ScriptedPort {
        answers: HashMap<VerseRef, (Frames, Duration)>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedPort {
        fn new(answers: Vec<(VerseRef, Frames, u64)>) -> Self {
            Self {
                answers: answers
                    .into_iter()
                    .map(|(v, f, ms)| (v, (f, Duration::from_millis(ms))))
                    .collect(),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TranslationDurationPort for ScriptedPort {
        async fn translation_duration(&self, verse: &VerseRef) -> Result<Frames, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let answer = self.answers.get(verse).copied();
            if let Some((_, delay)) = answer {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            answer
                .map(|(frames, _)| frames)
                .ok_or_else(|| DomainError::LookupFailure(format!("no audio for {}", verse)))
        }
    }

    fn verses(n: u32) -> Vec<VerseRef> {
        (1..=n).map(|v| VerseRef::new(1, v)).collect()
    }

    #[tokio::test]
    async fn test_prefetch_collects_all_durations() {
        let port = Arc::new(ScriptedPort::new(vec![
            (VerseRef::new(1, 1), 200, 5),
            (VerseRef::new(1, 2), 300, 1),
        ]));
        let prefetcher = DurationPrefetcher::with_limits(port, 300, Duration::from_secs(5), 4);

        let report = prefetcher.prefetch(&verses(2)).await;
        assert_eq!(report.fetched, 2);
        assert!(report.fallbacks.is_empty());
        assert_eq!(report.durations.get(&VerseRef::new(1, 1)), Some(200));
        assert_eq!(report.durations.get(&VerseRef::new(1, 2)), Some(300));
    }

    #[tokio::test]
    async fn test_failures_and_timeouts_fall_back() {
        let port = Arc::new(ScriptedPort::new(vec![
            (VerseRef::new(1, 1), 200, 0),
            (VerseRef::new(1, 2), 250, 5_000),
            (VerseRef::new(1, 4), 0, 0),
        ]));
        let prefetcher = DurationPrefetcher::with_limits(port, 300, Duration::from_millis(50), 4);

        let report = prefetcher.prefetch(&verses(4)).await;
        assert_eq!(report.fetched, 1);
        assert_eq!(
            report.fallbacks,
            vec![VerseRef::new(1, 2), VerseRef::new(1, 3), VerseRef::new(1, 4)]
        );
        assert_eq!(report.durations.get(&VerseRef::new(1, 2)), Some(300));
        assert_eq!(report.durations.get(&VerseRef::new(1, 3)), Some(300));
        assert_eq!(report.durations.get(&VerseRef::new(1, 4)), Some(300));
    }

    #[tokio::test]
    async fn test_duplicate_verses_looked_up_once() {
        let port = Arc::new(ScriptedPort::new(vec![(VerseRef::new(1, 1), 200, 0)]));
        let prefetcher =
            DurationPrefetcher::with_limits(port.clone(), 300, Duration::from_secs(1), 4);

        let repeated = vec![VerseRef::new(1, 1); 3];
        let report = prefetcher.prefetch(&repeated).await;
        assert_eq!(port.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.durations.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let answers = verses(8).into_iter().map(|v| (v, 100, 20)).collect();
        let port = Arc::new(ScriptedPort::new(answers));
        let prefetcher =
            DurationPrefetcher::with_limits(port.clone(), 300, Duration::from_secs(5), 2);

        let report = prefetcher.prefetch(&verses(8)).await;
        assert_eq!(report.fetched, 8);
        assert!(port.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_snapshots_flip_loading_after_barrier() {
        let port = Arc::new(ScriptedPort::new(vec![
            (VerseRef::new(1, 1), 200, 1),
            (VerseRef::new(1, 2), 300, 30),
        ]));
        let prefetcher = DurationPrefetcher::with_limits(port, 300, Duration::from_secs(5), 4);
        let (tx, mut rx) = watch::channel(DurationSnapshot::pending(0));

        let handle =
            tokio::spawn(async move { prefetcher.prefetch_with_updates(&verses(2), &tx).await });

        let mut seen_loading = Vec::new();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            seen_loading.push(snapshot.loading);
            if !snapshot.loading {
                assert_eq!(snapshot.durations.len(), 2);
                assert_eq!(snapshot.resolved, 2);
                break;
            }
            assert!(snapshot.durations.len() < 2);
        }

        let report = handle.await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(seen_loading.last(), Some(&false));
        let last = rx.borrow().clone();
        assert_eq!(last.durations.len(), 2);
        assert!(!last.loading);
    }

    #[tokio::test]
    async fn test_empty_input_is_immediately_complete() {
        let port = Arc::new(ScriptedPort::new(vec![]));
        let prefetcher = DurationPrefetcher::with_limits(port, 300, Duration::from_secs(1), 1);
        let (tx, rx) = watch::channel(DurationSnapshot::pending(5));

        let report = prefetcher.prefetch_with_updates(&[], &tx).await;
        assert!(report.durations.is_empty());
        assert!(!rx.borrow().loading);
    }
}
