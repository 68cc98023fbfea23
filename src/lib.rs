//! Timeline synchronization and playback engine for flight log replay.
//!
//! The engine owns the authoritative log-domain clock, keeps an optional
//! video clock locked to it through a calibrated offset, and drives a
//! coalescing render loop. Log decoding, drawing and video decoding stay
//! with the collaborators behind the traits in [`input`], [`video`] and
//! [`playback::render`].

pub mod command;
pub mod config;
pub mod core;
pub mod graph;
pub mod input;
pub mod playback;
pub mod shortcuts;
pub mod store;
pub mod video;

pub use command::{Command, JumpSize, ViewToggle};
pub use config::{EngineConfig, ViewSettings};
pub use crate::core::{EngineError, EngineResult, Micros};
pub use graph::{GraphConfig, GraphConfigManager};
pub use playback::{AnimationScheduler, FrameDriver, PlaybackEngine, PlaybackState, TimeBase};
