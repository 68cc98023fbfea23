pub mod error;
pub mod time;

pub use error::{EngineError, EngineResult};
pub use time::{format_time, log_to_video, parse_time, video_to_log, Micros, MICROS_PER_SECOND};
