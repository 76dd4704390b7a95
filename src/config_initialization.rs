//! Configuration initialization and hierarchy management

use tracing::info;

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands};
use crate::error::AppResult;
use crate::utils::logging::LogLevel;

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> AppResult<AppConfig> {
    // Step 1: Defaults, then the first config file found
    let mut adapter = TomlConfigAdapter::new();
    adapter.discover(cli.config.as_deref())?;

    // Step 2: Override with environment variables
    adapter.apply_env_overrides()?;

    // Step 3: Override with CLI arguments
    apply_cli_overrides(adapter.config_mut(), cli)?;

    adapter.validate()?;
    Ok(adapter.into_config())
}

/// Apply CLI argument overrides to configuration; returns how many applied
pub fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> AppResult<usize> {
    let mut cli_overrides = 0;

    if let Some(level) = &cli.log_level {
        config.logging.level = LogLevel::parse(level)?;
        cli_overrides += 1;
    }
    if cli.log_json {
        config.logging.json = true;
        cli_overrides += 1;
    }

    match &cli.command {
        Commands::Compute(args) => {
            if let Some(buffer) = args.buffer_frames {
                config.timeline.buffer_frames = buffer;
                cli_overrides += 1;
            }
            if let Some(end_buffer) = args.end_buffer_frames {
                config.timeline.end_buffer_frames = end_buffer;
                cli_overrides += 1;
            }
            if let Some(fallback) = args.fallback_frames {
                config.timeline.fallback_translation_frames = fallback;
                cli_overrides += 1;
            }
            if let Some(manifest) = &args.durations {
                config.lookup.manifest = Some(manifest.clone());
                cli_overrides += 1;
            }
        }
        Commands::Durations(args) => {
            if let Some(manifest) = &args.durations {
                config.lookup.manifest = Some(manifest.clone());
                cli_overrides += 1;
            }
        }
        Commands::Fixup(_) => {}
    }

    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }
    Ok(cli_overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_compute_overrides() {
        let cli = Cli::parse_from([
            "verse-timeline",
            "--log-level",
            "debug",
            "compute",
            "--verses",
            "verses.json",
            "--durations",
            "durations.json",
            "--buffer-frames",
            "10",
            "--fallback-frames",
            "240",
        ]);

        let mut config = AppConfig::default();
        let applied = apply_cli_overrides(&mut config, &cli).unwrap();

        assert_eq!(applied, 4);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.timeline.buffer_frames, 10);
        assert_eq!(config.timeline.end_buffer_frames, 60);
        assert_eq!(config.timeline.fallback_translation_frames, 240);
        assert_eq!(config.lookup.manifest, Some(PathBuf::from("durations.json")));
    }

    #[test]
    fn test_fixup_leaves_config_alone() {
        let cli = Cli::parse_from(["verse-timeline", "fixup", "--props", "props.json"]);
        let mut config = AppConfig::default();
        assert_eq!(apply_cli_overrides(&mut config, &cli).unwrap(), 0);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let cli = Cli::parse_from([
            "verse-timeline",
            "--log-level",
            "loud",
            "fixup",
            "--props",
            "props.json",
        ]);
        assert!(apply_cli_overrides(&mut AppConfig::default(), &cli).is_err());
    }
}
