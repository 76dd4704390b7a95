// Preview interactor - Incremental timeline while durations stream in

use tokio::sync::watch;
use tracing::warn;

use crate::app::prefetch_interactor::DurationSnapshot;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::TimelineAccumulator;

/// Timeline view that follows a duration map as it fills in.
///
/// `current` is always a complete timeline, using fallbacks for verses whose
/// duration is not known yet. Only `commit` and `wait_for_authoritative`
/// return a timeline suitable for rendering.
pub struct TimelinePreview {
    accumulator: TimelineAccumulator,
    verses: Vec<VerseRef>,
    arabic_durations: Vec<Frames>,
    mode: AudioTrackMode,
    updates: watch::Receiver<DurationSnapshot>,
}

impl TimelinePreview {
    pub fn new(
        accumulator: TimelineAccumulator,
        verses: Vec<VerseRef>,
        arabic_durations: Vec<Frames>,
        mode: AudioTrackMode,
        updates: watch::Receiver<DurationSnapshot>,
    ) -> Result<Self, DomainError> {
        if verses.len() != arabic_durations.len() {
            return Err(DomainError::InvalidInput(format!(
                "{} verses but {} Arabic durations",
                verses.len(),
                arabic_durations.len()
            )));
        }

        Ok(Self {
            accumulator,
            verses,
            arabic_durations,
            mode,
            updates,
        })
    }

    pub fn mode(&self) -> AudioTrackMode {
        self.mode
    }

    /// Latest duration snapshot
    pub fn snapshot(&self) -> DurationSnapshot {
        self.updates.borrow().clone()
    }

    /// Whether translation durations are still arriving
    pub fn is_loading(&self) -> bool {
        self.mode.has_translation() && self.updates.borrow().loading
    }

    /// Timeline for the durations known right now
    pub fn current(&self) -> Result<Timeline, DomainError> {
        let durations = self.updates.borrow().durations.clone();
        self.accumulator
            .compute(&self.verses, &self.arabic_durations, self.mode, &durations)
    }

    /// The authoritative timeline, or `DurationsLoading` while lookups are pending
    pub fn commit(&self) -> Result<Timeline, DomainError> {
        if self.is_loading() {
            return Err(DomainError::DurationsLoading);
        }
        self.current()
    }

    /// Wait for the next snapshot; false once the producer is gone
    pub async fn changed(&mut self) -> bool {
        self.updates.changed().await.is_ok()
    }

    /// Wait until loading finishes, then compute the authoritative timeline.
    ///
    /// If the producer goes away mid-load the last snapshot is used.
    pub async fn wait_for_authoritative(&mut self) -> Result<Timeline, DomainError> {
        if self.mode.has_translation() {
            loop {
                let loading = self.updates.borrow_and_update().loading;
                if !loading {
                    break;
                }
                if self.updates.changed().await.is_err() {
                    warn!("Duration producer stopped before loading finished, using last snapshot");
                    break;
                }
            }
        }
        self.current()
    }
}
