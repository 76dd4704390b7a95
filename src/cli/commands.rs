//! Command implementations

use anyhow::{Context, Result};
use tracing::info;

use crate::app::container::AppContainer;
use crate::app::prefetch_interactor::PrefetchReport;
use crate::app::timeline_interactor::{TimelineRequest, TimelineResponse, VerseFrames};
use crate::cli::args::{ComputeArgs, DurationsArgs, FixupArgs};
use crate::domain::model::AudioTrackMode;
use crate::utils::time::FrameClock;

/// Execute the compute command
pub async fn compute(container: &dyn AppContainer, args: ComputeArgs) -> Result<()> {
    let mode = AudioTrackMode::parse(&args.mode)
        .map_err(|e| anyhow::anyhow!("Invalid mode '{}': {}", args.mode, e))?;

    info!("Starting compute operation");
    info!("Verses: {}", args.verses.display());

    let interactor = container
        .timeline_interactor(&args.verses)
        .context("Failed to set up timeline computation")?;
    let response = interactor
        .compute(TimelineRequest {
            mode,
            offline: args.offline,
        })
        .await
        .with_context(|| format!("Failed to compute timeline for {}", args.verses.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&response)
            .context("Failed to serialize timeline to JSON")?;
        println!("{}", json);
    } else {
        display_timeline(&response, &interactor.clock());
    }

    info!("Compute operation completed successfully");
    Ok(())
}

/// Execute the durations command
pub async fn durations(container: &dyn AppContainer, args: DurationsArgs) -> Result<()> {
    info!("Starting durations operation");

    let interactor = container
        .timeline_interactor(&args.verses)
        .context("Failed to set up duration lookup")?;
    let (frames, report) = interactor
        .durations(false)
        .await
        .with_context(|| format!("Failed to load verses from {}", args.verses.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "durations": report.durations,
            "fetched": report.fetched,
            "fallbacks": report.fallbacks,
        }))
        .context("Failed to serialize durations to JSON")?;
        println!("{}", json);
    } else {
        display_durations(&frames, &report, &interactor.clock());
    }

    info!("Durations operation completed successfully");
    Ok(())
}

/// Execute the fixup command
pub async fn fixup(container: &dyn AppContainer, args: FixupArgs) -> Result<()> {
    info!("Starting fixup operation");

    let report = container
        .fixup_interactor()
        .fix_file(&args.props, args.out.as_deref())
        .await
        .with_context(|| format!("Failed to fix props {}", args.props.display()))?;

    println!(
        "{}: durationInFrames={} fps={} mode={}{}",
        report.output_path.display(),
        report.outcome.duration_in_frames,
        report.outcome.fps,
        report.outcome.mode,
        if report.outcome.timeline_applied {
            " (timestamps rewritten)"
        } else {
            ""
        }
    );

    info!("Fixup operation completed successfully");
    Ok(())
}

/// Display a timeline in human-readable format
fn display_timeline(response: &TimelineResponse, clock: &FrameClock) {
    let timeline = &response.timeline;

    println!("Verse Timeline ({}, {} fps)", response.mode, response.frame_rate);
    println!("==============");
    println!(
        "{:<9} {:>8} {:>8} {:>12} {:>12}",
        "Verse", "Start", "Arabic", "Translation", "Length"
    );

    for (verse, placement) in response.verses.iter().zip(&timeline.placements) {
        let translation = match placement.translation_start {
            Some(start) => clock.format_frames(start),
            None => "-".to_string(),
        };
        let marker = if response.fallbacks.contains(verse) { " *" } else { "" };
        println!(
            "{:<9} {:>8} {:>8} {:>12} {:>12}{}",
            verse.key(),
            placement.start,
            placement.arabic_duration,
            translation,
            placement.translation_duration,
            marker
        );
    }

    println!();
    println!(
        "Total: {} frames ({})",
        timeline.total_duration,
        clock.format_frames(timeline.total_duration)
    );
    if !response.fallbacks.is_empty() {
        println!("* fallback translation duration");
    }
}

/// Display looked up durations in human-readable format
fn display_durations(frames: &VerseFrames, report: &PrefetchReport, clock: &FrameClock) {
    println!("Translation Durations");
    println!("=====================");

    for verse in &frames.verses {
        let Some(duration) = report.durations.get(verse) else {
            continue;
        };
        let source = if report.fallbacks.contains(verse) {
            "fallback"
        } else {
            "measured"
        };
        println!(
            "  {:<9} {:>6} frames  {:>10}  {}",
            verse.key(),
            duration,
            clock.format_frames(duration),
            source
        );
    }

    println!();
    println!(
        "Fetched: {}, fallbacks: {}",
        report.fetched,
        report.fallbacks.len()
    );
}
