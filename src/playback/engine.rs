use std::time::Instant;
use tracing::{debug, info, warn};

use super::marks::{Marks, BOOKMARK_SLOTS};
use super::render::Presenters;
use super::scheduler::{AnimationScheduler, Frame};
use super::timebase::{ClockSource, TimeBase, VideoLink};
use super::zoom::Zoom;
use super::{PlaybackState, PLAYBACK_RATE_STEP};
use crate::command::{Command, JumpSize, ViewToggle};
use crate::config::{EngineConfig, ViewSettings};
use crate::core::{parse_time, EngineError, EngineResult, Micros, MICROS_PER_SECOND};
use crate::graph::{GraphConfig, GraphConfigManager};
use crate::input::LogSource;
use crate::store::PrefStore;
use crate::video::{OffsetCache, OffsetCacheEntry, VideoEvent, VideoSource, VideoSync};

/// Labels of the layout offered when no configuration was ever saved
const EXAMPLE_GRAPHS: &[&str] = &["Motors", "Gyros"];

/// One viewing session: the open log, the optional video and every piece
/// of timeline state that goes with them.
///
/// All mutation goes through [`PlaybackEngine::dispatch`] or the source
/// lifecycle methods; each of them schedules a frame, and
/// [`PlaybackEngine::tick`] draws it.
pub struct PlaybackEngine {
    config: EngineConfig,
    store: Box<dyn PrefStore>,
    presenters: Presenters,
    time_base: TimeBase,
    scheduler: AnimationScheduler,
    sync: VideoSync,
    offset_cache: OffsetCache,
    marks: Marks,
    graphs: GraphConfigManager,
    graph_config_restored: bool,
    zoom: Zoom,
    view: ViewSettings,
    log: Option<Box<dyn LogSource>>,
    video: Option<Box<dyn VideoSource>>,
    video_ready: bool,
}

impl PlaybackEngine {
    /// Create a session, restoring persisted state from `store`
    pub fn new(config: EngineConfig, store: Box<dyn PrefStore>, presenters: Presenters) -> Self {
        let (graphs, graph_config_restored) = GraphConfigManager::load(store.as_ref());
        let offset_cache = OffsetCache::load(store.as_ref(), config.offset_cache_capacity);
        let view = ViewSettings::load(store.as_ref());
        debug!(
            graphs = graphs.active().len(),
            cached_offsets = offset_cache.len(),
            "session state restored"
        );

        Self {
            scheduler: AnimationScheduler::new(&config),
            config,
            store,
            presenters,
            time_base: TimeBase::default(),
            sync: VideoSync::new(),
            offset_cache,
            marks: Marks::new(),
            graphs,
            graph_config_restored,
            zoom: Zoom::default(),
            view,
            log: None,
            video: None,
            video_ready: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get current time in microseconds
    pub fn current_time(&self) -> Micros {
        self.time_base.current_time()
    }

    pub fn state(&self) -> PlaybackState {
        self.time_base.state()
    }

    pub fn time_base(&self) -> &TimeBase {
        &self.time_base
    }

    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn video_sync(&self) -> &VideoSync {
        &self.sync
    }

    pub fn offset_cache(&self) -> &OffsetCache {
        &self.offset_cache
    }

    pub fn graphs(&self) -> &GraphConfigManager {
        &self.graphs
    }

    pub fn view(&self) -> &ViewSettings {
        &self.view
    }

    pub fn log(&self) -> Option<&dyn LogSource> {
        self.log.as_deref()
    }

    /// True once the attached video has reported it is ready
    pub fn has_video(&self) -> bool {
        self.video.is_some() && self.video_ready
    }

    /// Frames drawn so far
    pub fn render_count(&self) -> u64 {
        self.scheduler.render_count()
    }

    /// When the driver should next call [`tick`](Self::tick)
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Open a log and select its first usable segment.
    ///
    /// If no segment opens the previous log stays active.
    pub fn open_log(&mut self, mut log: Box<dyn LogSource>, now: Instant) -> EngineResult<()> {
        let opened = (0..log.segment_count()).find(|&i| log.open_segment(i));
        let Some(index) = opened else {
            let reason = (0..log.segment_count())
                .find_map(|i| log.segment_error(i))
                .unwrap_or_else(|| "No logs in this file could be parsed successfully".to_string());
            return Err(EngineError::SourceOpen {
                identity: log.identity().to_string(),
                reason,
            });
        };

        info!(log = log.identity(), segment = index, "log opened");
        if !self.graph_config_restored && self.graphs.active().is_empty() {
            let example = GraphConfig::example(log.field_names(), EXAMPLE_GRAPHS);
            self.graphs.apply(example, self.store.as_mut());
            self.graph_config_restored = true;
        }
        self.log = Some(log);
        self.activate_segment(now);
        Ok(())
    }

    /// Switch to another segment of the open log
    pub fn select_segment(&mut self, index: usize, now: Instant) -> EngineResult<()> {
        let Some(log) = self.log.as_mut() else {
            return Err(EngineError::SourceOpen {
                identity: String::new(),
                reason: "no log is open".to_string(),
            });
        };
        if !log.open_segment(index) {
            let reason = log
                .segment_error(index)
                .unwrap_or_else(|| format!("segment {} could not be opened", index));
            return Err(EngineError::SourceOpen {
                identity: log.identity().to_string(),
                reason,
            });
        }
        info!(segment = index, "segment selected");
        self.activate_segment(now);
        Ok(())
    }

    fn activate_segment(&mut self, now: Instant) {
        let Some(log) = self.log.as_deref() else {
            return;
        };
        self.scheduler.cancel();

        self.marks.clear_export_range();
        self.presenters.renderer.set_export_range(None, None);
        self.presenters.seek_bar.set_export_range(None, None);
        self.presenters.renderer.adapt_graphs(log, self.graphs.active());

        let (min, max) = (log.min_time(), log.max_time());
        self.time_base.set_range(min, max);
        match ready_video(&mut self.video, self.video_ready) {
            Some(video) => {
                self.time_base.sync_from_video(video.current_time(), self.sync.offset());
            }
            None => {
                self.time_base.set_current_time(min, None);
            }
        }

        self.presenters
            .seek_bar
            .set_time_range(min, max, self.time_base.current_time());
        self.presenters.seek_bar.repaint();

        self.set_state(PlaybackState::Paused, now);
        self.presenters.renderer.set_zoom(self.zoom.factor());
        self.apply_cached_offset();
    }

    /// Attach a video. It only takes over the clock once it reports
    /// [`VideoEvent::Ready`].
    pub fn attach_video(&mut self, mut video: Box<dyn VideoSource>) {
        video.set_playback_rate(self.time_base.playback_rate() as f64 / 100.0);
        info!(video = video.identity(), "video attached");
        self.video = Some(video);
        self.video_ready = false;
    }

    /// Drop the video and go back to the wall clock
    pub fn detach_video(&mut self, now: Instant) {
        if let Some(video) = self.video.take() {
            info!(video = video.identity(), "video detached");
        }
        self.video_ready = false;
        self.time_base.set_clock(ClockSource::Manual);
        self.scheduler.invalidate(now);
    }

    pub fn handle_video_event(&mut self, event: VideoEvent, now: Instant) -> EngineResult<()> {
        match event {
            VideoEvent::Ready => {
                if self.video.is_none() {
                    return Ok(());
                }
                self.video_ready = true;
                self.time_base.set_clock(ClockSource::VideoDriven);
                self.set_state(PlaybackState::Paused, now);
                self.apply_cached_offset();
                self.sync_time_from_video();
            }
            VideoEvent::TimeChanged => {
                self.sync_time_from_video();
                self.scheduler.invalidate(now);
            }
            VideoEvent::Error(reason) => {
                let video = self
                    .video
                    .as_ref()
                    .map(|v| v.identity().to_string())
                    .unwrap_or_default();
                warn!(video = %video, reason = %reason, "video could not be loaded");
                self.detach_video(now);
                return Err(EngineError::UnsupportedMedia { video, reason });
            }
        }
        Ok(())
    }

    fn sync_time_from_video(&mut self) {
        if self.log.is_none() {
            return;
        }
        if let Some(video) = ready_video(&mut self.video, self.video_ready) {
            self.time_base.sync_from_video(video.current_time(), self.sync.offset());
        }
    }

    /// Apply a remembered offset for the current (log, segment, video)
    fn apply_cached_offset(&mut self) {
        let Some((log, index, video)) = self.cache_key() else {
            return;
        };
        if let Some(offset) = self.offset_cache.lookup(&log, index, &video) {
            info!(log = %log, index, video = %video, offset, "restoring cached video offset");
            self.sync.set_offset(offset, true);
            self.sync_time_from_video();
        }
    }

    fn cache_key(&self) -> Option<(String, usize, String)> {
        let log = self.log.as_deref()?;
        let index = log.segment_index()?;
        let video = self.video.as_deref().filter(|_| self.video_ready)?;
        Some((log.identity().to_string(), index, video.identity().to_string()))
    }

    /// Remember the current offset for this (log, segment, video)
    pub fn finalize_and_cache(&mut self) -> bool {
        let Some((log, index, video)) = self.cache_key() else {
            return false;
        };
        self.offset_cache.insert(OffsetCacheEntry {
            log,
            index,
            video,
            offset: self.sync.offset(),
        });
        self.offset_cache.save(self.store.as_mut());
        true
    }

    /// Serialize the workspace slots for saving to a file
    pub fn export_workspaces(&self) -> EngineResult<String> {
        Ok(self.graphs.export_workspaces()?)
    }

    /// Apply a command. Malformed text input is dropped silently.
    pub fn dispatch(&mut self, command: Command, now: Instant) -> EngineResult<()> {
        debug!(?command, "dispatch");
        match self.apply(command, now) {
            Err(EngineError::UserInput(input)) => {
                debug!(input = %input, "ignoring malformed input");
                Ok(())
            }
            other => other,
        }
    }

    fn apply(&mut self, command: Command, now: Instant) -> EngineResult<()> {
        match command {
            Command::TogglePlayback => {
                let state = self.time_base.state().toggled();
                self.set_state(state, now);
            }
            Command::Play => self.set_state(PlaybackState::Playing, now),
            Command::Pause => self.set_state(PlaybackState::Paused, now),
            Command::SetPlaybackRate(rate) => self.set_playback_rate(rate),
            Command::FasterPlayback => {
                self.set_playback_rate(self.time_base.playback_rate() + PLAYBACK_RATE_STEP);
            }
            Command::SlowerPlayback => {
                let rate = self.time_base.playback_rate().saturating_sub(PLAYBACK_RATE_STEP);
                self.set_playback_rate(rate);
            }

            Command::JumpBack(size) => {
                let amount = self.jump_amount(size);
                self.jump(-amount, now);
            }
            Command::JumpForward(size) => {
                let amount = self.jump_amount(size);
                self.jump(amount, now);
            }
            Command::JumpStart => {
                self.set_time(self.time_base.min_time(), now);
                self.set_state(PlaybackState::Paused, now);
            }
            Command::JumpEnd => {
                self.set_time(self.time_base.max_time(), now);
                self.set_state(PlaybackState::Paused, now);
            }
            Command::VideoJumpStart => {
                if self.has_video() {
                    self.set_video_time(0.0, now);
                    self.set_state(PlaybackState::Paused, now);
                }
            }
            Command::VideoJumpEnd => {
                let duration = self.video.as_ref().and_then(|v| v.duration());
                if let (true, Some(duration)) = (self.has_video(), duration) {
                    self.set_video_time(duration, now);
                    self.set_state(PlaybackState::Paused, now);
                }
            }
            Command::SeekTo(time) => self.set_time(time, now),
            Command::SetTimeText(text) => {
                let elapsed = parse_time(&text).ok_or(EngineError::UserInput(text))?;
                if self.has_video() {
                    let seconds = elapsed as f64 / MICROS_PER_SECOND + self.sync.offset();
                    self.set_video_time(seconds, now);
                } else {
                    self.set_time(self.time_base.min_time().saturating_add(elapsed), now);
                }
            }
            Command::SelectSegment(index) => self.select_segment(index, now)?,

            Command::ZoomIn { fast } => {
                let changed = self.zoom.zoom_in(fast);
                self.zoom_changed(changed, now);
            }
            Command::ZoomOut { fast } => {
                let changed = self.zoom.zoom_out(fast);
                self.zoom_changed(changed, now);
            }
            Command::ZoomReset => {
                let changed = self.zoom.reset();
                self.zoom_changed(changed, now);
            }
            Command::ToggleQuickZoom => {
                let changed = self.zoom.toggle_quick();
                self.zoom_changed(changed, now);
            }
            Command::SetZoom(level) => {
                let changed = self.zoom.set(Some(level));
                self.zoom_changed(changed, now);
            }

            Command::ToggleBookmark(index) => {
                if self.marks.set_bookmark(index, self.time_base.current_time()) {
                    self.marks_changed(now);
                }
            }
            Command::JumpToBookmark(index) => {
                if let Some(time) = self.marks.bookmark(index) {
                    self.set_time(time, now);
                }
            }
            Command::ClearBookmarks => {
                self.marks.clear_all();
                self.marks_changed(now);
            }
            Command::ToggleMarker => {
                self.marks.toggle_marker(self.time_base.current_time());
                self.marks_changed(now);
            }
            Command::JumpToMarker => {
                if let Some(time) = self.marks.marker() {
                    self.set_time(time, now);
                }
            }
            Command::ApplyMarkerToOffset => self.apply_marker_offset(now),

            Command::ToggleInTime => {
                self.marks.toggle_in(self.time_base.current_time());
                self.export_range_changed(now);
            }
            Command::ToggleOutTime => {
                self.marks.toggle_out(self.time_base.current_time());
                self.export_range_changed(now);
            }

            Command::ApplyGraphConfig(config) => {
                let changed = self.graphs.apply(config, self.store.as_mut());
                self.graphs_changed(changed, now);
            }
            Command::UndoGraphConfig => {
                let changed = self.graphs.undo(self.store.as_mut());
                self.graphs_changed(changed, now);
            }
            Command::ExpandGraph(index) => {
                let changed = self.graphs.expand(index, self.store.as_mut());
                self.graphs_changed(changed, now);
            }
            Command::CollapseGraph(index) => {
                let changed = self.graphs.collapse_to_one(index, self.store.as_mut());
                self.graphs_changed(changed, now);
            }
            Command::StoreWorkspace(slot) => {
                self.graphs.store_workspace(slot, self.store.as_mut());
            }
            Command::LoadWorkspace(slot) => {
                let changed = self.graphs.load_workspace(slot, self.store.as_mut());
                self.graphs_changed(changed, now);
            }
            Command::ImportWorkspaces(json) => {
                self.graphs.import_workspaces(&json, self.store.as_mut())?;
            }

            Command::SetVideoOffset(offset) => {
                let redraw = self.sync.set_offset(offset, false);
                self.offset_changed(redraw, now);
            }
            Command::NudgeVideoOffset { forward } => {
                let step = self.config.offset_nudge_seconds;
                let redraw = self.sync.nudge(if forward { step } else { -step });
                self.offset_changed(redraw, now);
            }
            Command::SyncVideoHere => {
                if let Some(video) = self.video.as_deref() {
                    let redraw = self.sync.sync_here(video.current_time());
                    self.offset_changed(redraw, now);
                }
            }
            Command::CommitVideoOffsetText(text) => {
                let offset = VideoSync::parse_offset_text(&text)?;
                let redraw = self.sync.set_offset(offset, false);
                self.finalize_and_cache();
                self.offset_changed(redraw, now);
            }

            Command::ToggleView(toggle) => self.toggle_view(toggle, now),
            Command::Resize { width, height } => {
                self.presenters.renderer.resize(width, height);
                self.presenters.seek_bar.resize(width);
                self.scheduler.invalidate(now);
            }
        }
        Ok(())
    }

    /// Draw the pending frame if it is due and fire due rate-limited
    /// updates. Returns true when a frame was drawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.log.is_none() {
            self.scheduler.cancel();
            return false;
        }
        let frame = Frame {
            time_base: &mut self.time_base,
            video: video_link(&mut self.video, self.video_ready, self.sync.offset()),
            log: self.log.as_deref(),
            presenters: &mut self.presenters,
        };
        self.scheduler.tick(now, frame)
    }

    fn set_state(&mut self, state: PlaybackState, now: Instant) {
        if self.time_base.state() != state {
            debug!(?state, "playback state changed");
        }
        self.time_base
            .set_state(state, ready_video(&mut self.video, self.video_ready));
        self.scheduler.invalidate(now);
    }

    fn set_playback_rate(&mut self, rate: u32) {
        // the rate reaches the video whether or not it is ready yet
        if self.time_base.set_playback_rate(rate, ready_video(&mut self.video, true)) {
            debug!(rate, "playback rate changed");
        }
    }

    fn set_time(&mut self, time: Micros, now: Instant) {
        let link = video_link(&mut self.video, self.video_ready, self.sync.offset());
        self.time_base.set_current_time(time, link);
        self.scheduler.invalidate(now);
    }

    fn set_video_time(&mut self, seconds: f64, now: Instant) {
        if let Some(link) = video_link(&mut self.video, self.video_ready, self.sync.offset()) {
            self.time_base.set_video_time(seconds, link);
        }
        self.scheduler.invalidate(now);
    }

    fn jump_amount(&self, size: JumpSize) -> Micros {
        match size {
            JumpSize::Small => self.config.small_jump_us,
            JumpSize::Fraction(fraction) => {
                (self.presenters.renderer.window_width_time() as f64 * fraction) as Micros
            }
        }
    }

    /// Move by `delta` microseconds and pause. With a video the video clock
    /// moves and the log follows.
    fn jump(&mut self, delta: Micros, now: Instant) {
        match self.video.as_deref().filter(|_| self.video_ready) {
            Some(video) => {
                let seconds = video.current_time() + delta as f64 / MICROS_PER_SECOND;
                self.set_video_time(seconds, now);
            }
            None => self.set_time(self.time_base.current_time() + delta, now),
        }
        self.set_state(PlaybackState::Paused, now);
    }

    fn zoom_changed(&mut self, changed: bool, now: Instant) {
        if changed {
            self.presenters.renderer.set_zoom(self.zoom.factor());
            self.scheduler.invalidate(now);
        }
    }

    fn marks_changed(&mut self, now: Instant) {
        let bookmarks: Vec<Option<Micros>> = (0..BOOKMARK_SLOTS).map(|i| self.marks.bookmark(i)).collect();
        self.presenters.renderer.set_marks(self.marks.marker(), &bookmarks);
        self.scheduler.invalidate(now);
    }

    fn export_range_changed(&mut self, now: Instant) {
        let (export_in, export_out) = self.marks.export_range();
        self.presenters.renderer.set_export_range(export_in, export_out);
        self.presenters.seek_bar.set_export_range(export_in, export_out);
        self.scheduler.invalidate(now);
    }

    fn graphs_changed(&mut self, changed: bool, now: Instant) {
        if !changed {
            return;
        }
        self.scheduler.cancel();
        if let Some(log) = self.log.as_deref() {
            self.presenters.renderer.adapt_graphs(log, self.graphs.active());
        }
        self.scheduler.invalidate(now);
    }

    fn offset_changed(&mut self, redraw: bool, now: Instant) {
        self.sync_time_from_video();
        if redraw {
            self.scheduler.invalidate(now);
        }
    }

    /// Fold the marker distance into the video offset and hide the marker.
    /// Without a visible marker, log and video this just toggles the marker.
    fn apply_marker_offset(&mut self, now: Instant) {
        let current = self.time_base.current_time();
        let offset = self
            .marks
            .offset_from_marker(current)
            .filter(|_| self.has_video() && self.log.is_some());

        match offset {
            Some(offset) => {
                let shifted = self.sync.offset() + offset.elapsed as f64 / MICROS_PER_SECOND;
                self.sync.set_offset(shifted, true);
                self.marks.hide_marker();
                info!(offset = shifted, "marker distance applied to video offset");
                self.sync_time_from_video();
            }
            None => self.marks.toggle_marker(current),
        }
        self.marks_changed(now);
    }

    fn toggle_view(&mut self, toggle: ViewToggle, now: Instant) {
        let view = &mut self.view;
        match toggle {
            ViewToggle::Table => view.show_table = !view.show_table,
            ViewToggle::Craft => view.show_craft = !view.show_craft,
            ViewToggle::Sticks => view.show_sticks = !view.show_sticks,
            ViewToggle::Analyser => view.show_analyser = !view.show_analyser,
            ViewToggle::Legend => view.legend_hidden = !view.legend_hidden,
            ViewToggle::TableOverlay => view.toggle_table_overlay(),
        }
        self.view.save(self.store.as_mut());
        self.presenters.renderer.apply_view(&self.view);
        self.scheduler.invalidate(now);
    }
}

/// The video, if it is attached and has reported ready
fn ready_video(video: &mut Option<Box<dyn VideoSource>>, ready: bool) -> Option<&mut dyn VideoSource> {
    match video {
        Some(video) if ready => Some(video.as_mut()),
        _ => None,
    }
}

fn video_link(video: &mut Option<Box<dyn VideoSource>>, ready: bool, offset: f64) -> Option<VideoLink<'_>> {
    ready_video(video, ready).map(|source| VideoLink::new(source, offset))
}
