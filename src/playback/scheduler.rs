use std::time::{Duration, Instant};
use tracing::trace;

use super::rate_limit::RateLimiter;
use super::render::{Presenters, ValueSnapshot};
use super::timebase::{TimeBase, VideoLink};
use crate::config::EngineConfig;
use crate::core::Micros;
use crate::input::LogSource;

/// Everything a frame touches, borrowed from the session for one tick
pub struct Frame<'a> {
    pub time_base: &'a mut TimeBase,
    pub video: Option<VideoLink<'a>>,
    pub log: Option<&'a dyn LogSource>,
    pub presenters: &'a mut Presenters,
}

/// Render loop driver.
///
/// At most one frame is ever pending; invalidating while one is queued does
/// nothing. Seek bar repaints and value table refreshes go through trailing
/// rate limiters so playback does not flood them.
#[derive(Debug)]
pub struct AnimationScheduler {
    frame_interval: Duration,
    pending_frame: Option<Instant>,
    seek_bar: RateLimiter<()>,
    value_table: RateLimiter<Micros>,
    render_count: u64,
}

impl AnimationScheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            frame_interval: config.frame_interval(),
            pending_frame: None,
            seek_bar: RateLimiter::new(config.seek_bar_window()),
            value_table: RateLimiter::new(config.value_table_window()),
            render_count: 0,
        }
    }

    /// Request a frame as soon as possible. Returns false if one was
    /// already pending.
    pub fn invalidate(&mut self, now: Instant) -> bool {
        if self.pending_frame.is_some() {
            return false;
        }
        self.pending_frame = Some(now);
        true
    }

    pub fn is_frame_pending(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Frames drawn since creation
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Earliest moment anything needs to happen
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.pending_frame, self.seek_bar.deadline(), self.value_table.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Drop the pending frame and any pending limited calls
    pub fn cancel(&mut self) {
        self.pending_frame = None;
        self.seek_bar.cancel();
        self.value_table.cancel();
    }

    /// Run the pending frame if it is due, then fire due limited calls.
    /// Returns true when a frame was drawn.
    pub fn tick(&mut self, now: Instant, frame: Frame<'_>) -> bool {
        let Frame {
            time_base,
            video,
            log,
            presenters,
        } = frame;

        let due = matches!(self.pending_frame, Some(at) if at <= now);
        if !due {
            self.flush(now, log, presenters);
            return false;
        }
        self.pending_frame = None;

        let time = time_base.advance(now, video);
        presenters.renderer.draw(time);
        self.render_count += 1;
        trace!(time, renders = self.render_count, "frame drawn");

        presenters.seek_bar.set_current_time(time);
        self.value_table.call(now, time);

        if time_base.is_playing() {
            self.seek_bar.call(now, ());
            self.pending_frame = Some(now + self.frame_interval);
        } else {
            // last frame of a run, repaint right away
            self.seek_bar.cancel();
            presenters.seek_bar.repaint();
        }

        self.flush(now, log, presenters);
        true
    }

    /// Fire any rate-limited call whose window has elapsed
    pub fn flush(&mut self, now: Instant, log: Option<&dyn LogSource>, presenters: &mut Presenters) {
        if self.seek_bar.poll(now).is_some() {
            presenters.seek_bar.repaint();
        }
        if let Some(time) = self.value_table.poll(now) {
            let snapshot = match log {
                Some(log) => ValueSnapshot::capture(log, time),
                None => ValueSnapshot {
                    time,
                    values: Vec::new(),
                },
            };
            presenters.value_table.refresh(&snapshot);
        }
    }
}
