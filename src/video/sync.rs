use tracing::debug;

use crate::core::{EngineError, EngineResult};

/// Format an offset the way the offset field shows it.
///
/// Always signed. Values that survive rounding to three decimals print in
/// their shortest form (`+3`, `-2.5`), anything finer is cut to three.
pub fn format_offset(offset: f64) -> String {
    // -0.0 would print as "-0"
    let offset = if offset == 0.0 { 0.0 } else { offset };
    let sign = if offset >= 0.0 { "+" } else { "" };
    let fixed = format!("{:.3}", offset);

    if fixed.parse::<f64>().ok() == Some(offset) {
        format!("{}{}", sign, offset)
    } else {
        format!("{}{}", sign, fixed)
    }
}

/// User-calibrated offset between the video clock and the log clock.
///
/// `video_time = (log_time - log_min) / 1e6 + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSync {
    offset: f64,
    display: String,
}

impl Default for VideoSync {
    fn default() -> Self {
        Self {
            offset: 0.0,
            display: format_offset(0.0),
        }
    }
}

impl VideoSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset in seconds
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Text for the offset field
    pub fn display_text(&self) -> &str {
        &self.display
    }

    /// Store a new offset. Returns true when the caller should schedule a
    /// redraw, which is always unless the redraw is deferred.
    pub fn set_offset(&mut self, seconds: f64, defer_redraw: bool) -> bool {
        self.offset = seconds;
        self.display = format_offset(seconds);
        debug!(offset = seconds, "video offset set");
        !defer_redraw
    }

    /// Declare that the video's current position is the start of the log
    pub fn sync_here(&mut self, video_time: f64) -> bool {
        self.set_offset(video_time, false)
    }

    /// Shift the offset by `delta` seconds
    pub fn nudge(&mut self, delta: f64) -> bool {
        self.set_offset(self.offset + delta, false)
    }

    /// Parse text typed into the offset field
    pub fn parse_offset_text(text: &str) -> EngineResult<f64> {
        let trimmed = text.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(EngineError::UserInput(trimmed.to_string())),
        }
    }
}
