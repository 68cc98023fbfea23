use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::engine::PlaybackEngine;
use crate::command::Command;
use crate::input::LogSource;
use crate::video::{VideoEvent, VideoSource};

/// Messages accepted by a running [`FrameDriver`]
pub enum DriverMessage {
    Command(Command),
    Video(VideoEvent),
    OpenLog(Box<dyn LogSource>),
    AttachVideo(Box<dyn VideoSource>),
    DetachVideo,
    Shutdown,
}

/// Owns a [`PlaybackEngine`] and runs its frame loop on the tokio clock.
///
/// Every message and every tick is handled on the driver task, so the
/// engine itself never needs locking.
pub struct FrameDriver {
    engine: PlaybackEngine,
    rx: mpsc::UnboundedReceiver<DriverMessage>,
    stop_when_idle: bool,
}

impl FrameDriver {
    pub fn new(engine: PlaybackEngine) -> (Self, mpsc::UnboundedSender<DriverMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            engine,
            rx,
            stop_when_idle: false,
        };
        (driver, tx)
    }

    /// Return from [`run`](Self::run) once nothing is scheduled and no
    /// message is queued
    pub fn stop_when_idle(mut self, stop: bool) -> Self {
        self.stop_when_idle = stop;
        self
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.engine
    }

    /// Run until shutdown, until every sender is dropped, or until idle when
    /// configured to. Hands the engine back for inspection.
    pub async fn run(mut self) -> PlaybackEngine {
        info!("frame driver started");
        loop {
            self.engine.tick(now());

            let deadline = self.engine.next_deadline();
            if deadline.is_none() && self.stop_when_idle && self.rx.is_empty() {
                debug!("nothing scheduled, stopping");
                break;
            }
            let wake = deadline.map(tokio::time::Instant::from_std);

            tokio::select! {
                message = self.rx.recv() => match message {
                    Some(DriverMessage::Shutdown) | None => break,
                    Some(message) => self.handle(message),
                },
                _ = sleep_until(wake), if wake.is_some() => {}
            }
        }
        info!(renders = self.engine.render_count(), "frame driver stopped");
        self.engine
    }

    fn handle(&mut self, message: DriverMessage) {
        let now = now();
        let result = match message {
            DriverMessage::Command(command) => self.engine.dispatch(command, now),
            DriverMessage::Video(event) => self.engine.handle_video_event(event, now),
            DriverMessage::OpenLog(log) => self.engine.open_log(log, now),
            DriverMessage::AttachVideo(video) => {
                self.engine.attach_video(video);
                Ok(())
            }
            DriverMessage::DetachVideo => {
                self.engine.detach_video(now);
                Ok(())
            }
            DriverMessage::Shutdown => Ok(()),
        };
        if let Err(e) = result {
            warn!(error = %e, "message failed");
        }
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(wake: Option<tokio::time::Instant>) {
    if let Some(wake) = wake {
        tokio::time::sleep_until(wake).await;
    }
}
