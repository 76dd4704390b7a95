// Manifest duration adapter - Translation durations from a JSON table

use async_trait::async_trait;
use std::path::Path;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::error::{AppError, AppResult};
use crate::ports::*;

/// Serves translation durations recorded ahead of time as `{ "1:1": 200, ... }`
pub struct ManifestDurationAdapter {
    durations: TranslationDurationMap,
}

impl ManifestDurationAdapter {
    pub fn new(durations: TranslationDurationMap) -> Self {
        Self { durations }
    }

    /// Load a manifest file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let durations: TranslationDurationMap = serde_json::from_str(&content)?;

        for (key, _) in durations.iter() {
            VerseRef::parse_key(key)?;
        }

        tracing::info!(path = %path.display(), entries = durations.len(), "Loaded duration manifest");
        Ok(Self::new(durations))
    }
}

#[async_trait]
impl TranslationDurationPort for ManifestDurationAdapter {
    async fn translation_duration(&self, verse: &VerseRef) -> Result<Frames, DomainError> {
        self.durations
            .get(verse)
            .ok_or_else(|| DomainError::LookupFailure(format!("No manifest entry for {}", verse)))
    }
}
