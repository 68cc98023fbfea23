pub mod mock;
pub mod offset_cache;
pub mod sync;

pub use mock::SimulatedVideo;
pub use offset_cache::{OffsetCache, OffsetCacheEntry, MAX_CACHE_ENTRIES};
pub use sync::{format_offset, VideoSync};

/// Notifications delivered by a video source
#[derive(Debug, Clone, PartialEq)]
pub enum VideoEvent {
    /// Metadata and the first frame are available; the clock is valid
    Ready,
    /// The position changed because of a seek
    TimeChanged,
    /// The host could not decode the media
    Error(String),
}

/// Trait for an attached video recording.
///
/// The engine only needs a clock it can read, seek and rate-scale; decoding
/// and pixels stay with the implementation.
pub trait VideoSource: Send {
    /// Identity used as the offset cache key (usually the file name)
    fn identity(&self) -> &str;

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Request a seek; completion is reported with `VideoEvent::TimeChanged`
    fn seek(&mut self, seconds: f64);

    /// Duration in seconds, once known
    fn duration(&self) -> Option<f64>;

    /// Native playback rate, 1.0 = real time
    fn set_playback_rate(&mut self, rate: f64);

    fn play(&mut self);

    fn pause(&mut self);

    fn is_playing(&self) -> bool;
}
