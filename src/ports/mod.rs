// Ports - Interface definitions (contracts)

use crate::domain::errors::*;
use crate::domain::model::*;
use async_trait::async_trait;

/// Port for the verse list and its recitation timings
#[async_trait]
pub trait VerseSourcePort: Send + Sync {
    /// Load verses in playback order
    async fn load_verses(&self) -> Result<Vec<VerseTiming>, DomainError>;
}

/// Port for measuring the translation audio of a single verse
#[async_trait]
pub trait TranslationDurationPort: Send + Sync {
    /// Translation audio duration in frames.
    ///
    /// Implementations report failures as `DomainError::LookupFailure`; the
    /// caller decides whether to substitute the fallback.
    async fn translation_duration(&self, verse: &VerseRef) -> Result<Frames, DomainError>;
}
