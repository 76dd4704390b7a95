// Fixup interactor - Normalises renderer props before a render

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::TimelineAccumulator;
use crate::error::{AppError, AppResult};

const TRANSLATION_START_KEYS: [&str; 2] = ["translationStart", "urduStart"];
const TRANSLATION_DURATION_KEYS: [&str; 2] = ["translationDuration", "urduDuration"];

/// What the fix-up changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixupOutcome {
    pub mode: AudioTrackMode,
    pub fps: u32,
    pub duration_in_frames: Frames,
    /// Whether the timestamps were rewritten from a timeline
    pub timeline_applied: bool,
}

/// Result of fixing a props file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixupReport {
    pub output_path: PathBuf,
    pub outcome: FixupOutcome,
}

/// Interactor for the props fix-up use case
pub struct FixupInteractor {
    accumulator: TimelineAccumulator,
}

impl FixupInteractor {
    pub fn new(accumulator: TimelineAccumulator) -> Self {
        Self { accumulator }
    }

    /// `fixed-<name>` next to the input file
    pub fn default_output_path(input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "props.json".to_string());
        input.with_file_name(format!("fixed-{}", name))
    }

    /// Read, fix and write a props file
    pub async fn fix_file(&self, input: &Path, output: Option<&Path>) -> AppResult<FixupReport> {
        if !input.exists() {
            return Err(AppError::FileNotFound {
                path: input.display().to_string(),
            });
        }

        info!("Fixing render props {}", input.display());
        let content = tokio::fs::read_to_string(input).await?;
        let mut props: Value = serde_json::from_str(&content)?;
        let outcome = self.fix_props(&mut props)?;

        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::default_output_path(input));
        tokio::fs::write(&output_path, serde_json::to_string_pretty(&props)?).await?;

        info!(
            duration_in_frames = outcome.duration_in_frames,
            fps = outcome.fps,
            "Wrote fixed props to {}",
            output_path.display()
        );
        Ok(FixupReport {
            output_path,
            outcome,
        })
    }

    /// Fix props in place. Fields this does not know about are left untouched.
    pub fn fix_props(&self, props: &mut Value) -> Result<FixupOutcome, DomainError> {
        let settings = *self.accumulator.settings();
        let props = props
            .as_object_mut()
            .ok_or_else(|| DomainError::InvalidInput("Props must be a JSON object".to_string()))?;

        let fps = match props.get("fps").and_then(Value::as_f64).map(f64::round) {
            Some(fps) if (1.0..=f64::from(u32::MAX)).contains(&fps) => fps as u32,
            _ => {
                debug!(fps = settings.frame_rate, "Using default fps");
                settings.frame_rate
            }
        };
        props.insert("fps".to_string(), Value::from(fps));

        let mode = match props.get("translationAudio") {
            None | Some(Value::Null) => AudioTrackMode::None,
            Some(Value::String(s)) => AudioTrackMode::parse(s)?,
            Some(other) => {
                return Err(DomainError::InvalidInput(format!(
                    "translationAudio must be a string, got {}",
                    other
                )))
            }
        };

        stringify_translations(props);

        let has_timestamps = props
            .get("timestamps")
            .and_then(Value::as_array)
            .map_or(false, |t| !t.is_empty());

        let duration_in_frames = if has_timestamps {
            self.apply_timeline(props, mode)?
        } else {
            match props.get("durationInFrames").and_then(Value::as_f64) {
                Some(d) if d.is_finite() && d.round() >= 1.0 => d.round() as Frames,
                _ => {
                    debug!(
                        fallback = settings.fallback_translation_frames,
                        "No usable durationInFrames, using default"
                    );
                    settings.fallback_translation_frames
                }
            }
        };
        props.insert("durationInFrames".to_string(), Value::from(duration_in_frames));

        Ok(FixupOutcome {
            mode,
            fps,
            duration_in_frames,
            timeline_applied: has_timestamps,
        })
    }

    fn apply_timeline(
        &self,
        props: &mut Map<String, Value>,
        mode: AudioTrackMode,
    ) -> Result<Frames, DomainError> {
        let verses: Vec<VerseRef> = match props.get("verses") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| DomainError::InvalidInput(format!("Invalid verses: {}", e)))?,
            None => Vec::new(),
        };
        let durations: TranslationDurationMap = match props.get("translationDurations") {
            None | Some(Value::Null) => TranslationDurationMap::new(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                DomainError::InvalidInput(format!("Invalid translationDurations: {}", e))
            })?,
        };

        let timestamps = props
            .get_mut("timestamps")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| DomainError::InvalidInput("timestamps must be an array".to_string()))?;

        if verses.len() != timestamps.len() {
            return Err(DomainError::InvalidInput(format!(
                "{} verses but {} timestamps",
                verses.len(),
                timestamps.len()
            )));
        }

        let entries = verses
            .iter()
            .zip(timestamps.iter())
            .map(|(verse, stamp)| timeline_entry(*verse, stamp))
            .collect::<Result<Vec<_>, _>>()?;

        let timeline = self.accumulator.resolve(&entries, mode, &durations)?;

        for (stamp, placement) in timestamps.iter_mut().zip(&timeline.placements) {
            let Some(stamp) = stamp.as_object_mut() else {
                continue;
            };
            stamp.insert("start".to_string(), Value::from(placement.start));
            stamp.insert(
                "durationInFrames".to_string(),
                Value::from(placement.arabic_duration),
            );
            for key in TRANSLATION_START_KEYS.iter().chain(&TRANSLATION_DURATION_KEYS) {
                stamp.remove(*key);
            }
            if let Some(translation_start) = placement.translation_start {
                stamp.insert("translationStart".to_string(), Value::from(translation_start));
                stamp.insert(
                    "translationDuration".to_string(),
                    Value::from(placement.translation_duration),
                );
            }
        }

        info!(
            verses = timeline.len(),
            total = timeline.total_duration,
            mode = %mode,
            "Rewrote timestamps"
        );
        Ok(timeline.total_duration)
    }
}

/// Accumulator entry for one timestamp record
fn timeline_entry(verse: VerseRef, stamp: &Value) -> Result<TimelineEntry, DomainError> {
    let record = stamp.as_object().ok_or_else(|| {
        DomainError::InvalidInput(format!("Timestamp for {} must be an object", verse))
    })?;

    let arabic_duration = frames_field(record, &["durationInFrames"], &verse)?.unwrap_or(0);
    let entry = TimelineEntry::new(verse, arabic_duration);

    let start = frames_field(record, &["start"], &verse)?;
    let translation_start = frames_field(record, &TRANSLATION_START_KEYS, &verse)?;
    let translation_duration = frames_field(record, &TRANSLATION_DURATION_KEYS, &verse)?;

    Ok(match translation_duration {
        Some(translation_duration) => entry.with_precomputed(PrecomputedSpan {
            start: start.unwrap_or(0),
            translation_start,
            translation_duration,
        }),
        None => entry,
    })
}

/// First present key among `keys`, as a whole frame count
fn frames_field(
    record: &Map<String, Value>,
    keys: &[&str],
    verse: &VerseRef,
) -> Result<Option<Frames>, DomainError> {
    let Some((key, value)) = keys
        .iter()
        .find_map(|k| record.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v)))
    else {
        return Ok(None);
    };

    match value.as_f64() {
        Some(n) if n.is_finite() && n >= 0.0 => Ok(Some(n.round() as Frames)),
        _ => Err(DomainError::InvalidInput(format!(
            "{} of {} must be a non-negative number, got {}",
            key, verse, value
        ))),
    }
}

/// The renderer expects translation ids as strings
fn stringify_translations(props: &mut Map<String, Value>) {
    if let Some(Value::Array(translations)) = props.get_mut("translations") {
        for translation in translations.iter_mut() {
            if let Value::Number(n) = translation {
                *translation = Value::String(n.to_string());
            }
        }
    }
}
