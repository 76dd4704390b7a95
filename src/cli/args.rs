//! Command-line argument definitions

use clap::Args;
use std::path::PathBuf;

/// Arguments for the compute command
#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Verse timings JSON file
    #[arg(short, long)]
    pub verses: PathBuf,

    /// Audio track mode (none, full, translation-only)
    #[arg(short, long, default_value = "none")]
    pub mode: String,

    /// Translation duration manifest used instead of probing
    #[arg(short, long)]
    pub durations: Option<PathBuf>,

    /// Use the fallback duration for every verse
    #[arg(long)]
    pub offline: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Frames between Arabic and translation audio
    #[arg(long)]
    pub buffer_frames: Option<u64>,

    /// Frames appended after the last verse
    #[arg(long)]
    pub end_buffer_frames: Option<u64>,

    /// Translation duration used when a lookup fails
    #[arg(long)]
    pub fallback_frames: Option<u64>,
}

/// Arguments for the durations command
#[derive(Args, Debug)]
pub struct DurationsArgs {
    /// Verse timings JSON file
    #[arg(short, long)]
    pub verses: PathBuf,

    /// Translation duration manifest used instead of probing
    #[arg(short, long)]
    pub durations: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the fixup command
#[derive(Args, Debug)]
pub struct FixupArgs {
    /// Renderer props JSON file
    #[arg(short, long)]
    pub props: PathBuf,

    /// Output file path (default: fixed-<name> next to the input)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}
