// Domain rules - Timeline accumulation

use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;

/// Lays verses out on a frame timeline according to the audio track mode.
///
/// Every call is a pure function of its arguments, so the preview, the
/// pre-render fix-up and annotated-input reuse all produce the same result
/// for the same inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineAccumulator {
    settings: TimelineSettings,
}

impl Default for TimelineAccumulator {
    fn default() -> Self {
        Self::new(TimelineSettings::default())
    }
}

impl TimelineAccumulator {
    /// Create an accumulator with the given constants
    pub fn new(settings: TimelineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    /// Compute the timeline from scratch.
    ///
    /// Verses missing from `translation_durations` use the fallback duration.
    pub fn compute(
        &self,
        verses: &[VerseRef],
        arabic_durations: &[Frames],
        mode: AudioTrackMode,
        translation_durations: &TranslationDurationMap,
    ) -> Result<Timeline, DomainError> {
        if verses.len() != arabic_durations.len() {
            return Err(DomainError::InvalidInput(format!(
                "{} verses but {} Arabic durations",
                verses.len(),
                arabic_durations.len()
            )));
        }

        let mut current_position: Frames = 0;
        let mut placements = Vec::with_capacity(verses.len());

        for (verse, &arabic_duration) in verses.iter().zip(arabic_durations) {
            let translation_duration = self.translation_duration_for(verse, translation_durations);
            let start = current_position;

            let placement = match mode {
                AudioTrackMode::None => Placement {
                    start,
                    arabic_duration,
                    translation_start: None,
                    translation_duration: 0,
                },
                AudioTrackMode::TranslationOnly => Placement {
                    start,
                    arabic_duration,
                    translation_start: Some(start),
                    translation_duration,
                },
                AudioTrackMode::Full => Placement {
                    start,
                    arabic_duration,
                    translation_start: Some(checked_sum(
                        &[start, arabic_duration, self.settings.buffer_frames],
                        verse,
                    )?),
                    translation_duration,
                },
            };

            let span = self.verse_span(mode, arabic_duration, placement.translation_duration)?;
            current_position = checked_sum(&[current_position, span], verse)?;

            debug!(
                verse = %verse,
                start = placement.start,
                arabic = arabic_duration,
                translation = placement.translation_duration,
                "placed verse"
            );
            placements.push(placement);
        }

        let total_duration = current_position
            .checked_add(self.settings.end_buffer_frames)
            .ok_or_else(overflow)?;

        Ok(Timeline {
            placements,
            total_duration,
        })
    }

    /// Compute a timeline, preferring values already carried by the entries.
    ///
    /// When the mode plays translation audio and every entry carries a
    /// precomputed span, those spans are kept verbatim and only the total
    /// duration (and any missing translation start) is derived. Otherwise the
    /// timeline is recomputed from the map.
    pub fn resolve(
        &self,
        entries: &[TimelineEntry],
        mode: AudioTrackMode,
        translation_durations: &TranslationDurationMap,
    ) -> Result<Timeline, DomainError> {
        let all_annotated = !entries.is_empty() && entries.iter().all(|e| e.precomputed.is_some());

        if mode.has_translation() && all_annotated {
            return self.reuse_precomputed(entries, mode, translation_durations);
        }

        if entries.iter().any(|e| e.precomputed.is_some()) {
            debug!("Discarding partial precomputed spans, recomputing timeline");
        }

        let verses: Vec<VerseRef> = entries.iter().map(|e| e.verse).collect();
        let arabic: Vec<Frames> = entries.iter().map(|e| e.arabic_duration).collect();
        self.compute(&verses, &arabic, mode, translation_durations)
    }

    /// Frames a single verse occupies in the given mode
    pub fn verse_span(
        &self,
        mode: AudioTrackMode,
        arabic_duration: Frames,
        translation_duration: Frames,
    ) -> Result<Frames, DomainError> {
        let span = match mode {
            AudioTrackMode::None => Some(arabic_duration),
            AudioTrackMode::TranslationOnly => Some(translation_duration),
            AudioTrackMode::Full => arabic_duration
                .checked_add(self.settings.buffer_frames)
                .and_then(|f| f.checked_add(translation_duration)),
        };
        span.ok_or_else(overflow)
    }

    /// End position of a placement in the given mode
    pub fn placement_end(
        &self,
        placement: &Placement,
        mode: AudioTrackMode,
    ) -> Result<Frames, DomainError> {
        let span = self.verse_span(
            mode,
            placement.arabic_duration,
            placement.translation_duration,
        )?;
        placement.start.checked_add(span).ok_or_else(overflow)
    }

    /// Translation start for a verse placed at `start` that carries no explicit one
    fn translation_start(
        &self,
        mode: AudioTrackMode,
        start: Frames,
        arabic_duration: Frames,
    ) -> Result<Frames, DomainError> {
        match mode {
            AudioTrackMode::Full => start
                .checked_add(arabic_duration)
                .and_then(|f| f.checked_add(self.settings.buffer_frames))
                .ok_or_else(overflow),
            AudioTrackMode::None | AudioTrackMode::TranslationOnly => Ok(start),
        }
    }

    fn translation_duration_for(
        &self,
        verse: &VerseRef,
        translation_durations: &TranslationDurationMap,
    ) -> Frames {
        match translation_durations.get(verse) {
            Some(frames) => frames,
            None => {
                debug!(
                    verse = %verse,
                    fallback = self.settings.fallback_translation_frames,
                    "No translation duration, using fallback"
                );
                self.settings.fallback_translation_frames
            }
        }
    }

    fn reuse_precomputed(
        &self,
        entries: &[TimelineEntry],
        mode: AudioTrackMode,
        translation_durations: &TranslationDurationMap,
    ) -> Result<Timeline, DomainError> {
        debug!(verses = entries.len(), "Reusing precomputed placements");

        let mut placements = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(span) = entry.precomputed else {
                continue;
            };

            if let Some(mapped) = translation_durations.get(&entry.verse) {
                if mapped != span.translation_duration {
                    warn!(
                        verse = %entry.verse,
                        precomputed = span.translation_duration,
                        mapped,
                        "Precomputed translation duration differs from lookup, keeping precomputed"
                    );
                }
            }

            let translation_start = match span.translation_start {
                Some(translation_start) => translation_start,
                None => self.translation_start(mode, span.start, entry.arabic_duration)?,
            };

            placements.push(Placement {
                start: span.start,
                arabic_duration: entry.arabic_duration,
                translation_start: Some(translation_start),
                translation_duration: span.translation_duration,
            });
        }

        let last_end = match placements.last() {
            Some(last) => self.placement_end(last, mode)?,
            None => 0,
        };
        let total_duration = last_end
            .checked_add(self.settings.end_buffer_frames)
            .ok_or_else(overflow)?;

        Ok(Timeline {
            placements,
            total_duration,
        })
    }
}

fn checked_sum(parts: &[Frames], verse: &VerseRef) -> Result<Frames, DomainError> {
    parts
        .iter()
        .try_fold(0 as Frames, |acc, &part| acc.checked_add(part))
        .ok_or_else(|| {
            DomainError::InvalidInput(format!("Frame position overflows at verse {}", verse))
        })
}

fn overflow() -> DomainError {
    DomainError::InvalidInput("Frame position overflows".to_string())
}
