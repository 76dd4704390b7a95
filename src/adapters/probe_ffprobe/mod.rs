//! FFprobe adapter for translation audio durations
//!
//! Measures each verse's translation recording by running `ffprobe` against
//! its URL and converting the container duration to frames.

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::time::FrameClock;

/// Default location of the per-verse translation recordings
pub const DEFAULT_TRANSLATION_AUDIO_BASE_URL: &str =
    "https://everyayah.com/data/translations/urdu_shamshad_ali_khan_46kbps/";

/// FFprobe-based translation duration adapter
pub struct FfprobeDurationAdapter {
    ffprobe_path: String,
    base_url: String,
    clock: FrameClock,
}

impl FfprobeDurationAdapter {
    /// Create new FFprobe adapter
    pub fn new(ffprobe_path: impl Into<String>, base_url: impl Into<String>, clock: FrameClock) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            ffprobe_path: ffprobe_path.into(),
            base_url,
            clock,
        }
    }

    /// Recording URL, `{base}{chapter:03}{verse:03}.mp3`
    pub fn audio_url(&self, verse: &VerseRef) -> String {
        format!(
            "{}{:03}{:03}.mp3",
            self.base_url, verse.chapter_id, verse.verse_number
        )
    }

    /// Parse the seconds value printed by ffprobe
    pub fn parse_duration_output(stdout: &str) -> Result<f64, DomainError> {
        let line = stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| DomainError::LookupFailure("ffprobe printed no duration".to_string()))?;

        line.parse::<f64>()
            .map_err(|_| DomainError::LookupFailure(format!("Unparseable duration: {}", line)))
    }
}

#[async_trait]
impl TranslationDurationPort for FfprobeDurationAdapter {
    async fn translation_duration(&self, verse: &VerseRef) -> Result<Frames, DomainError> {
        let url = self.audio_url(verse);
        tracing::debug!(verse = %verse, url = %url, "Probing translation audio");

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                url.as_str(),
            ])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::LookupFailure(format!("Failed to run {}: {}", self.ffprobe_path, e))
            })?;

        if !output.status.success() {
            return Err(DomainError::LookupFailure(format!(
                "ffprobe exited with {} for {}: {}",
                output.status,
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let seconds = Self::parse_duration_output(&String::from_utf8_lossy(&output.stdout))?;
        self.clock
            .seconds_to_frames(seconds)
            .map_err(|e| DomainError::LookupFailure(e.to_string()))
    }
}
