pub mod driver;
pub mod engine;
pub mod marks;
pub mod rate_limit;
pub mod render;
pub mod scheduler;
#[cfg(test)]
pub(crate) mod testing;
pub mod timebase;
pub mod zoom;

pub use driver::{DriverMessage, FrameDriver};
pub use engine::PlaybackEngine;
pub use marks::{MarkerOffset, Marks, BOOKMARK_SLOTS};
pub use rate_limit::RateLimiter;
pub use render::{Headless, Presenters, Renderer, SeekBar, ValueSnapshot, ValueTable};
pub use scheduler::{AnimationScheduler, Frame};
pub use timebase::{ClockSource, TimeBase, VideoLink};
pub use zoom::Zoom;

/// Lowest playback rate in percent
pub const MIN_PLAYBACK_RATE: u32 = 5;
/// Highest playback rate in percent
pub const MAX_PLAYBACK_RATE: u32 = 300;
pub const DEFAULT_PLAYBACK_RATE: u32 = 100;
/// Slider step for the playback rate
pub const PLAYBACK_RATE_STEP: u32 = 5;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

impl PlaybackState {
    pub fn toggled(self) -> Self {
        match self {
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Playing => PlaybackState::Paused,
        }
    }
}
