use std::time::Instant;

use super::VideoSource;

/// Video clock without any media behind it.
///
/// Advances with the wall clock while playing, scaled by the playback rate,
/// and clamps to `[0, duration]`. Used by the headless replay and in tests.
#[derive(Debug)]
pub struct SimulatedVideo {
    name: String,
    duration: f64,
    position: f64,
    rate: f64,
    playing_since: Option<Instant>,
}

impl SimulatedVideo {
    pub fn new(name: &str, duration: f64) -> Self {
        Self {
            name: name.to_string(),
            duration: duration.max(0.0),
            position: 0.0,
            rate: 1.0,
            playing_since: None,
        }
    }

    fn elapsed(&self) -> f64 {
        self.playing_since
            .map(|since| since.elapsed().as_secs_f64() * self.rate)
            .unwrap_or(0.0)
    }

    /// Fold elapsed play time into the stored position
    fn settle(&mut self) {
        self.position = (self.position + self.elapsed()).clamp(0.0, self.duration);
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }
}

impl VideoSource for SimulatedVideo {
    fn identity(&self) -> &str {
        &self.name
    }

    fn current_time(&self) -> f64 {
        (self.position + self.elapsed()).clamp(0.0, self.duration)
    }

    fn seek(&mut self, seconds: f64) {
        self.settle();
        self.position = seconds.clamp(0.0, self.duration);
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.settle();
        self.rate = rate;
    }

    fn play(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.settle();
        self.playing_since = None;
    }

    /// False once the end of the media is reached, like a finished player
    fn is_playing(&self) -> bool {
        self.playing_since.is_some() && self.current_time() < self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_clamps_to_duration() {
        let mut video = SimulatedVideo::new("flight.mp4", 30.0);
        video.seek(45.0);
        assert_eq!(video.current_time(), 30.0);

        video.seek(-1.0);
        assert_eq!(video.current_time(), 0.0);
    }

    #[test]
    fn test_paused_clock_does_not_move() {
        let mut video = SimulatedVideo::new("flight.mp4", 30.0);
        video.seek(5.0);
        video.play();
        video.pause();
        let t = video.current_time();
        assert!(t >= 5.0 && t < 5.5);
        assert!(!video.is_playing());
        assert_eq!(video.current_time(), t);
    }

    #[test]
    fn test_stops_playing_at_end() {
        let mut video = SimulatedVideo::new("flight.mp4", 10.0);
        video.play();
        assert!(video.is_playing());
        video.seek(10.0);
        assert!(!video.is_playing());
    }
}
