use std::path::Path;
use std::sync::Arc;

use crate::adapters::{AppConfig, FfprobeDurationAdapter, JsonVerseSource, ManifestDurationAdapter};
use crate::app::{
    fixup_interactor::FixupInteractor, prefetch_interactor::DurationPrefetcher,
    timeline_interactor::TimelineInteractor,
};
use crate::domain::rules::TimelineAccumulator;
use crate::error::AppResult;
use crate::ports::{TranslationDurationPort, VerseSourcePort};
use crate::utils::time::FrameClock;

pub trait AppContainer: Send + Sync {
    fn timeline_interactor(&self, verses_path: &Path) -> AppResult<TimelineInteractor>;
    fn fixup_interactor(&self) -> Arc<FixupInteractor>;
    fn prefetcher(&self) -> AppResult<Arc<DurationPrefetcher>>;
}

pub struct DefaultAppContainer {
    config: AppConfig,
    duration_port: Option<Arc<dyn TranslationDurationPort>>,
    fixup_interactor: Arc<FixupInteractor>,
}

impl DefaultAppContainer {
    /// Wire the container from configuration.
    ///
    /// The duration port is only built when a command asks for lookups, so a
    /// bad manifest setting does not affect the fix-up.
    pub fn new(config: AppConfig) -> Self {
        let fixup_interactor = Arc::new(FixupInteractor::new(TimelineAccumulator::new(
            config.timeline,
        )));

        Self {
            config,
            duration_port: None,
            fixup_interactor,
        }
    }

    /// Wire the container around an existing duration port
    pub fn with_duration_port(
        config: AppConfig,
        duration_port: Arc<dyn TranslationDurationPort>,
    ) -> Self {
        Self {
            duration_port: Some(duration_port),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Durations come from the manifest when one is configured, otherwise
    /// from probing the translation recordings.
    fn duration_port(&self) -> AppResult<Arc<dyn TranslationDurationPort>> {
        if let Some(port) = &self.duration_port {
            return Ok(Arc::clone(port));
        }

        let lookup = &self.config.lookup;
        Ok(match &lookup.manifest {
            Some(manifest) => Arc::new(ManifestDurationAdapter::from_file(manifest)?),
            None => Arc::new(FfprobeDurationAdapter::new(
                lookup.ffprobe_path.clone(),
                lookup.base_url.clone(),
                FrameClock::new(self.config.timeline.frame_rate)?,
            )),
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn timeline_interactor(&self, verses_path: &Path) -> AppResult<TimelineInteractor> {
        let verse_source = Arc::new(JsonVerseSource::new(verses_path));
        Ok(TimelineInteractor::new(
            verse_source as Arc<dyn VerseSourcePort>,
            self.prefetcher()?,
            self.config.timeline,
        )?)
    }

    fn fixup_interactor(&self) -> Arc<FixupInteractor> {
        Arc::clone(&self.fixup_interactor)
    }

    fn prefetcher(&self) -> AppResult<Arc<DurationPrefetcher>> {
        Ok(Arc::new(DurationPrefetcher::new(
            self.duration_port()?,
            &self.config.timeline,
            &self.config.lookup,
        )))
    }
}
