//! verse-timeline library
//!
//! Lays out recited verses, optional translation audio and the buffers
//! between them on a frame timeline for the video renderer.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    AudioTrackMode, Frames, Placement, Timeline, TimelineSettings, TranslationDurationMap,
    VerseRef,
};
pub use domain::rules::TimelineAccumulator;
pub use error::{AppError, AppResult};
