// Adapters - External system implementations

pub mod manifest_durations;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;
pub mod verse_json;

// Re-export adapters
pub use manifest_durations::ManifestDurationAdapter;
pub use probe_ffprobe::FfprobeDurationAdapter;
pub use toml_config::{AppConfig, LookupConfig, TomlConfigAdapter};
pub use tracing_log::TracingLogAdapter;
pub use verse_json::JsonVerseSource;
