use std::time::Instant;
use tracing::debug;

use super::{PlaybackState, DEFAULT_PLAYBACK_RATE, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};
use crate::core::{log_to_video, video_to_log, Micros, MICROS_PER_SECOND};
use crate::video::VideoSource;

/// Which clock decides the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// Wall-clock deltas scaled by the playback rate
    #[default]
    Manual,
    /// Derived from the attached video's position
    VideoDriven,
}

/// An attached video together with the offset that maps it onto the log
pub struct VideoLink<'a> {
    pub source: &'a mut dyn VideoSource,
    pub offset: f64,
}

impl<'a> VideoLink<'a> {
    pub fn new(source: &'a mut dyn VideoSource, offset: f64) -> Self {
        Self { source, offset }
    }
}

/// The authoritative log-domain clock.
///
/// `current_time` is only written here and always stays inside
/// `[min_time, max_time]`.
#[derive(Debug, Clone)]
pub struct TimeBase {
    current_time: Micros,
    min_time: Micros,
    max_time: Micros,
    playback_rate: u32,
    state: PlaybackState,
    clock: ClockSource,
    last_frame: Option<Instant>,
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl TimeBase {
    pub fn new(min_time: Micros, max_time: Micros) -> Self {
        let (min_time, max_time) = ordered(min_time, max_time);
        Self {
            current_time: min_time,
            min_time,
            max_time,
            playback_rate: DEFAULT_PLAYBACK_RATE,
            state: PlaybackState::Paused,
            clock: ClockSource::Manual,
            last_frame: None,
        }
    }

    /// Get current time in microseconds
    pub fn current_time(&self) -> Micros {
        self.current_time
    }

    pub fn min_time(&self) -> Micros {
        self.min_time
    }

    pub fn max_time(&self) -> Micros {
        self.max_time
    }

    /// Get playback rate in percent
    pub fn playback_rate(&self) -> u32 {
        self.playback_rate
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn clock(&self) -> ClockSource {
        self.clock
    }

    pub fn set_clock(&mut self, clock: ClockSource) {
        if self.clock != clock {
            debug!(?clock, "clock source changed");
        }
        self.clock = clock;
        self.last_frame = None;
    }

    /// Replace the valid range, pulling the current time inside it
    pub fn set_range(&mut self, min_time: Micros, max_time: Micros) {
        let (min_time, max_time) = ordered(min_time, max_time);
        self.min_time = min_time;
        self.max_time = max_time;
        self.current_time = self.clamp(self.current_time);
    }

    pub fn clamp(&self, time: Micros) -> Micros {
        time.clamp(self.min_time, self.max_time)
    }

    /// Move to `time`, clamped to the log range.
    ///
    /// With a video driving the clock the video is seeked instead and the
    /// current time is re-derived from where it lands.
    pub fn set_current_time(&mut self, time: Micros, video: Option<VideoLink<'_>>) -> Micros {
        let time = self.clamp(time);
        match (self.clock, video) {
            (ClockSource::VideoDriven, Some(link)) => {
                link.source.seek(log_to_video(time, self.min_time, link.offset));
                self.sync_from_video(link.source.current_time(), link.offset)
            }
            _ => {
                self.current_time = time;
                time
            }
        }
    }

    /// Seek the video to `seconds` and follow it
    pub fn set_video_time(&mut self, seconds: f64, link: VideoLink<'_>) -> Micros {
        link.source.seek(seconds);
        self.sync_from_video(link.source.current_time(), link.offset)
    }

    /// Derive the current time from a video position
    pub fn sync_from_video(&mut self, video_seconds: f64, offset: f64) -> Micros {
        self.current_time = self.clamp(video_to_log(video_seconds, self.min_time, offset));
        self.current_time
    }

    /// Set the playback rate in percent. Rates outside `[5, 300]` are
    /// ignored.
    pub fn set_playback_rate(&mut self, rate: u32, video: Option<&mut dyn VideoSource>) -> bool {
        if !(MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&rate) {
            return false;
        }
        self.playback_rate = rate;
        if let Some(video) = video {
            video.set_playback_rate(rate as f64 / 100.0);
        }
        true
    }

    /// Change the playback state. The next frame after any transition has a
    /// zero delta.
    pub fn set_state(&mut self, state: PlaybackState, video: Option<&mut dyn VideoSource>) {
        self.state = state;
        self.last_frame = None;

        if let Some(video) = video {
            match state {
                PlaybackState::Playing => video.play(),
                PlaybackState::Paused => video.pause(),
            }
        }
    }

    /// Resolve the time for the frame being drawn at `now`
    pub fn advance(&mut self, now: Instant, video: Option<VideoLink<'_>>) -> Micros {
        match (self.clock, video) {
            (ClockSource::VideoDriven, Some(link)) => {
                self.sync_from_video(link.source.current_time(), link.offset);
                if self.is_playing() && !link.source.is_playing() {
                    debug!("video stopped, pausing");
                    self.set_state(PlaybackState::Paused, None);
                }
            }
            _ if self.is_playing() => {
                let delta = match self.last_frame {
                    Some(previous) => {
                        let elapsed = now.saturating_duration_since(previous).as_secs_f64();
                        (elapsed * MICROS_PER_SECOND * self.playback_rate as f64 / 100.0).floor() as Micros
                    }
                    None => 0,
                };

                self.current_time = self.current_time.saturating_add(delta);
                if self.current_time > self.max_time {
                    self.current_time = self.max_time;
                    debug!("reached end of log, pausing");
                    self.set_state(PlaybackState::Paused, None);
                } else {
                    self.last_frame = Some(now);
                }
            }
            _ => {}
        }
        self.current_time
    }
}

fn ordered(a: Micros, b: Micros) -> (Micros, Micros) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
