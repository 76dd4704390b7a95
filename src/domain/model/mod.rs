// Domain models - Core types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Video time in frames
pub type Frames = u64;

/// Identity of a single verse within a recitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseRef {
    pub chapter_id: u32,
    pub verse_number: u32,
}

impl VerseRef {
    /// Create a new verse reference
    pub fn new(chapter_id: u32, verse_number: u32) -> Self {
        Self {
            chapter_id,
            verse_number,
        }
    }

    /// Stable lookup key, `"{chapterId}:{verseNumber}"`
    pub fn key(&self) -> String {
        format!("{}:{}", self.chapter_id, self.verse_number)
    }

    /// Parse a `"{chapterId}:{verseNumber}"` key
    pub fn parse_key(key: &str) -> Result<Self, DomainError> {
        let (chapter, verse) = key
            .trim()
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidInput(format!("Invalid verse key: {}", key)))?;

        let chapter_id = chapter
            .parse::<u32>()
            .map_err(|_| DomainError::InvalidInput(format!("Invalid chapter in key: {}", key)))?;
        let verse_number = verse
            .parse::<u32>()
            .map_err(|_| DomainError::InvalidInput(format!("Invalid verse in key: {}", key)))?;

        Ok(Self::new(chapter_id, verse_number))
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter_id, self.verse_number)
    }
}

/// Which audio tracks play for each verse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioTrackMode {
    /// Arabic recitation only
    #[default]
    None,
    /// Arabic, a short buffer, then the translation audio
    #[serde(alias = "urdu")]
    Full,
    /// Translation audio only
    #[serde(alias = "urdu-only")]
    TranslationOnly,
}

impl AudioTrackMode {
    /// Parse a mode name
    pub fn parse(mode_str: &str) -> Result<Self, DomainError> {
        match mode_str.trim().to_lowercase().as_str() {
            "none" => Ok(AudioTrackMode::None),
            "full" | "urdu" => Ok(AudioTrackMode::Full),
            "translation-only" | "urdu-only" => Ok(AudioTrackMode::TranslationOnly),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown audio track mode: {}. Valid modes: none, full, translation-only",
                other
            ))),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioTrackMode::None => "none",
            AudioTrackMode::Full => "full",
            AudioTrackMode::TranslationOnly => "translation-only",
        }
    }

    /// Whether this mode plays translation audio and so needs durations
    pub fn has_translation(&self) -> bool {
        !matches!(self, AudioTrackMode::None)
    }
}

impl FromStr for AudioTrackMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AudioTrackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translation audio durations keyed by verse key.
///
/// Entries are only ever added; there is no removal API. Callers hand the
/// accumulator a snapshot of this map on every update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationDurationMap {
    entries: BTreeMap<String, Frames>,
}

impl TranslationDurationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the duration for a verse
    pub fn insert(&mut self, verse: &VerseRef, frames: Frames) {
        self.entries.insert(verse.key(), frames);
    }

    pub fn get(&self, verse: &VerseRef) -> Option<Frames> {
        self.entries.get(&verse.key()).copied()
    }

    pub fn get_key(&self, key: &str) -> Option<Frames> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, verse: &VerseRef) -> bool {
        self.entries.contains_key(&verse.key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Frames)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(VerseRef, Frames)> for TranslationDurationMap {
    fn from_iter<I: IntoIterator<Item = (VerseRef, Frames)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (verse, frames) in iter {
            map.insert(&verse, frames);
        }
        map
    }
}

/// Placement of one verse on the output timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub start: Frames,
    pub arabic_duration: Frames,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_start: Option<Frames>,
    #[serde(default)]
    pub translation_duration: Frames,
}

/// Computed timeline handed to the renderer or preview player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub placements: Vec<Placement>,
    pub total_duration: Frames,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Frame rate and buffer constants used by the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Frames per second
    pub frame_rate: u32,
    /// Silence between Arabic and translation audio
    pub buffer_frames: Frames,
    /// Silence appended after the last verse
    pub end_buffer_frames: Frames,
    /// Translation duration used when none is known
    pub fallback_translation_frames: Frames,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            buffer_frames: 15,
            end_buffer_frames: 60,
            fallback_translation_frames: 300,
        }
    }
}

impl TimelineSettings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.frame_rate == 0 {
            return Err(DomainError::ConfigInvalid(
                "frame_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Recitation timing for one verse as supplied by the verse source, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseTiming {
    pub chapter_id: u32,
    pub verse_number: u32,
    pub timestamp_from: u64,
    pub timestamp_to: u64,
}

impl VerseTiming {
    pub fn verse(&self) -> VerseRef {
        VerseRef::new(self.chapter_id, self.verse_number)
    }

    /// Length of the recitation in milliseconds
    pub fn duration_ms(&self) -> Result<u64, DomainError> {
        self.timestamp_to
            .checked_sub(self.timestamp_from)
            .ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "Verse {} ends ({}ms) before it starts ({}ms)",
                    self.verse(),
                    self.timestamp_to,
                    self.timestamp_from
                ))
            })
    }
}

/// Placement values carried over from an earlier accumulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecomputedSpan {
    pub start: Frames,
    /// Derived from the mode when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_start: Option<Frames>,
    pub translation_duration: Frames,
}

/// Accumulator input for one verse, optionally already annotated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub verse: VerseRef,
    pub arabic_duration: Frames,
    pub precomputed: Option<PrecomputedSpan>,
}

impl TimelineEntry {
    pub fn new(verse: VerseRef, arabic_duration: Frames) -> Self {
        Self {
            verse,
            arabic_duration,
            precomputed: None,
        }
    }

    pub fn with_precomputed(mut self, span: PrecomputedSpan) -> Self {
        self.precomputed = Some(span);
        self
    }
}
