// Timeline interactor - Orchestrates verse loading, duration lookup and accumulation

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::app::prefetch_interactor::{DurationPrefetcher, DurationSnapshot, PrefetchReport};
use crate::app::preview_interactor::TimelinePreview;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::TimelineAccumulator;
use crate::ports::*;
use crate::utils::time::FrameClock;

/// Timeline computation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineRequest {
    pub mode: AudioTrackMode,
    /// Skip lookups and use the fallback duration for every verse
    pub offline: bool,
}

/// Timeline computation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub mode: AudioTrackMode,
    pub frame_rate: u32,
    pub verses: Vec<VerseRef>,
    pub timeline: Timeline,
    /// Verses that used the fallback translation duration
    pub fallbacks: Vec<VerseRef>,
}

/// Verse timings converted to frames
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseFrames {
    pub verses: Vec<VerseRef>,
    pub arabic_durations: Vec<Frames>,
}

/// Interactor for the timeline use case
pub struct TimelineInteractor {
    verse_source: Arc<dyn VerseSourcePort>,
    prefetcher: Arc<DurationPrefetcher>,
    accumulator: TimelineAccumulator,
    clock: FrameClock,
}

impl TimelineInteractor {
    /// Create new timeline interactor with injected ports
    pub fn new(
        verse_source: Arc<dyn VerseSourcePort>,
        prefetcher: Arc<DurationPrefetcher>,
        settings: TimelineSettings,
    ) -> Result<Self, DomainError> {
        settings.validate()?;
        let clock = FrameClock::new(settings.frame_rate)?;

        Ok(Self {
            verse_source,
            prefetcher,
            accumulator: TimelineAccumulator::new(settings),
            clock,
        })
    }

    pub fn accumulator(&self) -> &TimelineAccumulator {
        &self.accumulator
    }

    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    /// Load verse timings and convert their durations to frames
    pub async fn load_verses(&self) -> Result<VerseFrames, DomainError> {
        let timings = self.verse_source.load_verses().await?;
        let mut frames = VerseFrames::default();

        for timing in &timings {
            frames.verses.push(timing.verse());
            frames
                .arabic_durations
                .push(self.clock.millis_to_frames(timing.duration_ms()?));
        }

        info!(verses = frames.verses.len(), "Loaded verse timings");
        Ok(frames)
    }

    /// Translation durations for every loaded verse
    pub async fn durations(&self, offline: bool) -> Result<(VerseFrames, PrefetchReport), DomainError> {
        let frames = self.load_verses().await?;
        let report = if offline {
            self.offline_report(&frames.verses)
        } else {
            self.prefetcher.prefetch(&frames.verses).await
        };
        Ok((frames, report))
    }

    /// Compute the authoritative timeline for the request
    pub async fn compute(&self, request: TimelineRequest) -> Result<TimelineResponse, DomainError> {
        info!(mode = %request.mode, offline = request.offline, "Computing timeline");
        let frames = self.load_verses().await?;

        let (timeline, report) = if !request.mode.has_translation() {
            let timeline = self.accumulator.compute(
                &frames.verses,
                &frames.arabic_durations,
                request.mode,
                &TranslationDurationMap::new(),
            )?;
            (timeline, PrefetchReport::default())
        } else if request.offline {
            let report = self.offline_report(&frames.verses);
            let timeline = self.accumulator.compute(
                &frames.verses,
                &frames.arabic_durations,
                request.mode,
                &report.durations,
            )?;
            (timeline, report)
        } else {
            let (mut preview, handle) = self.preview(frames.clone(), request.mode)?;
            let timeline = preview.wait_for_authoritative().await?;
            let report = handle.await.map_err(|e| {
                DomainError::LookupFailure(format!("Duration prefetch task failed: {}", e))
            })?;
            (timeline, report)
        };

        if !report.fallbacks.is_empty() {
            warn!(
                count = report.fallbacks.len(),
                "Some verses use the fallback translation duration"
            );
        }
        info!(
            total_frames = timeline.total_duration,
            total = %self.clock.format_frames(timeline.total_duration),
            "Timeline ready"
        );

        Ok(TimelineResponse {
            mode: request.mode,
            frame_rate: self.clock.frame_rate(),
            verses: frames.verses,
            timeline,
            fallbacks: report.fallbacks,
        })
    }

    /// Start prefetching in the background and return a preview following it
    pub fn preview(
        &self,
        frames: VerseFrames,
        mode: AudioTrackMode,
    ) -> Result<(TimelinePreview, JoinHandle<PrefetchReport>), DomainError> {
        let (updates, receiver) = watch::channel(DurationSnapshot::pending(frames.verses.len()));
        let preview = TimelinePreview::new(
            self.accumulator,
            frames.verses.clone(),
            frames.arabic_durations,
            mode,
            receiver,
        )?;

        let prefetcher = Arc::clone(&self.prefetcher);
        let verses = frames.verses;
        let handle = tokio::spawn(async move {
            prefetcher.prefetch_with_updates(&verses, &updates).await
        });

        Ok((preview, handle))
    }

    fn offline_report(&self, verses: &[VerseRef]) -> PrefetchReport {
        let fallback = self.accumulator.settings().fallback_translation_frames;
        let mut fallbacks: Vec<VerseRef> = verses.to_vec();
        fallbacks.sort();
        fallbacks.dedup();

        PrefetchReport {
            durations: fallbacks.iter().map(|v| (*v, fallback)).collect(),
            fetched: 0,
            fallbacks,
        }
    }
}
