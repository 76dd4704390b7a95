// JSON verse source adapter - Verse timings from a file

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Accepts `{ "verses": [...] }` or a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum VerseFile {
    Wrapped { verses: Vec<VerseTiming> },
    Bare(Vec<VerseTiming>),
}

/// Verse source backed by a JSON file of recitation timings
pub struct JsonVerseSource {
    path: PathBuf,
}

impl JsonVerseSource {
    /// Create new JSON verse source
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse verse timings from JSON text
    pub fn parse(content: &str) -> Result<Vec<VerseTiming>, DomainError> {
        let file: VerseFile = serde_json::from_str(content)
            .map_err(|e| DomainError::SourceUnavailable(format!("Invalid verse file: {}", e)))?;

        Ok(match file {
            VerseFile::Wrapped { verses } => verses,
            VerseFile::Bare(verses) => verses,
        })
    }
}

#[async_trait]
impl VerseSourcePort for JsonVerseSource {
    async fn load_verses(&self) -> Result<Vec<VerseTiming>, DomainError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::SourceUnavailable(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let verses = Self::parse(&content)?;
        tracing::debug!(path = %self.path.display(), count = verses.len(), "Loaded verse timings");
        Ok(verses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VERSES: &str = r#"{
        "verses": [
            { "chapterId": 1, "verseNumber": 1, "timestampFrom": 0, "timestampTo": 3000 },
            { "chapterId": 1, "verseNumber": 2, "timestampFrom": 3000, "timestampTo": 7000 }
        ]
    }"#;

    #[test]
    fn test_parse_wrapped_and_bare() {
        let wrapped = JsonVerseSource::parse(VERSES).unwrap();
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[1].verse(), VerseRef::new(1, 2));

        let bare = JsonVerseSource::parse(
            r#"[{ "chapterId": 2, "verseNumber": 255, "timestampFrom": 10, "timestampTo": 20 }]"#,
        )
        .unwrap();
        assert_eq!(bare[0].duration_ms().unwrap(), 10);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            JsonVerseSource::parse("{\"verses\": 3}"),
            Err(DomainError::SourceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VERSES.as_bytes()).unwrap();

        let source = JsonVerseSource::new(file.path());
        let verses = source.load_verses().await.unwrap();
        assert_eq!(verses[0].timestamp_to, 3000);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = JsonVerseSource::new("/nonexistent/verses.json");
        assert!(matches!(
            source.load_verses().await,
            Err(DomainError::SourceUnavailable(_))
        ));
    }
}
