//! Frame and wall-clock time conversion

use crate::domain::errors::DomainError;
use crate::domain::model::Frames;

/// Converts between media time and video frames at a fixed frame rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    frame_rate: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self { frame_rate: 30 }
    }
}

impl FrameClock {
    /// Create a new clock
    pub fn new(frame_rate: u32) -> Result<Self, DomainError> {
        if frame_rate == 0 {
            return Err(DomainError::ConfigInvalid(
                "frame_rate must be positive".to_string(),
            ));
        }
        Ok(Self { frame_rate })
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Recitation timing in milliseconds to frames, rounded to nearest
    pub fn millis_to_frames(&self, millis: u64) -> Frames {
        (millis as f64 / 1000.0 * self.frame_rate as f64).round() as Frames
    }

    /// Measured audio length in seconds to frames, rounded up so audio is never cut
    pub fn seconds_to_frames(&self, seconds: f64) -> Result<Frames, DomainError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Audio duration must be a non-negative number of seconds, got {}",
                seconds
            )));
        }
        Ok((seconds * self.frame_rate as f64).ceil() as Frames)
    }

    pub fn frames_to_seconds(&self, frames: Frames) -> f64 {
        frames as f64 / self.frame_rate as f64
    }

    /// Format frames as HH:MM:SS.ff (ff = frame within the second)
    pub fn format_frames(&self, frames: Frames) -> String {
        let rate = self.frame_rate as u64;
        let total_seconds = frames / rate;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let frame = frames % rate;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, frame)
        } else {
            format!("{:02}:{:02}.{:02}", minutes, seconds, frame)
        }
    }
}
