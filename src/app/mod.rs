// Application layer - Use case interactors

pub mod container;
pub mod fixup_interactor;
pub mod prefetch_interactor;
pub mod preview_interactor;
pub mod timeline_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use fixup_interactor::FixupInteractor;
pub use prefetch_interactor::{DurationPrefetcher, DurationSnapshot, PrefetchReport};
pub use preview_interactor::TimelinePreview;
pub use timeline_interactor::{TimelineInteractor, TimelineRequest, TimelineResponse};
