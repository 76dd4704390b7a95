//! CLI module for verse-timeline
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod args;
pub mod commands;

pub use args::{ComputeArgs, DurationsArgs, FixupArgs};

/// Verse timeline builder
///
/// Lays out recited verses and their translation audio on a frame timeline
/// for the video renderer.
#[derive(Parser, Debug)]
#[command(name = "verse-timeline")]
#[command(about = "Build frame timelines for recitation videos")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: verse_timeline.toml, config/verse_timeline.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the verse timeline
    Compute(args::ComputeArgs),
    /// Look up translation durations
    Durations(args::DurationsArgs),
    /// Normalise a renderer props file
    Fixup(args::FixupArgs),
}
