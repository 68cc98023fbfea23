//! Recording collaborators shared by the playback tests.

use std::sync::{Arc, Mutex};

use super::render::{Presenters, Renderer, SeekBar, ValueSnapshot, ValueTable};
use crate::core::Micros;
use crate::graph::GraphConfig;
use crate::input::LogSource;

#[derive(Debug, Default)]
pub struct Recording {
    pub draws: Vec<Micros>,
    pub resizes: Vec<(u32, u32)>,
    pub adapts: Vec<GraphConfig>,
    pub zooms: Vec<f64>,
    pub renderer_export: (Option<Micros>, Option<Micros>),
    pub seek_ranges: Vec<(Micros, Micros)>,
    pub seek_times: Vec<Micros>,
    pub seek_export: (Option<Micros>, Option<Micros>),
    pub repaints: usize,
    pub refreshes: Vec<ValueSnapshot>,
}

pub type Shared = Arc<Mutex<Recording>>;

pub struct RecordingPresenter {
    log: Shared,
    window: Micros,
}

impl Renderer for RecordingPresenter {
    fn draw(&mut self, time: Micros) {
        self.log.lock().unwrap().draws.push(time);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.log.lock().unwrap().resizes.push((width, height));
    }

    fn adapt_graphs(&mut self, _log: &dyn LogSource, config: &GraphConfig) {
        self.log.lock().unwrap().adapts.push(config.clone());
    }

    fn set_zoom(&mut self, factor: f64) {
        self.log.lock().unwrap().zooms.push(factor);
    }

    fn window_width_time(&self) -> Micros {
        self.window
    }

    fn set_export_range(&mut self, export_in: Option<Micros>, export_out: Option<Micros>) {
        self.log.lock().unwrap().renderer_export = (export_in, export_out);
    }
}

impl SeekBar for RecordingPresenter {
    fn set_time_range(&mut self, min: Micros, max: Micros, _current: Micros) {
        self.log.lock().unwrap().seek_ranges.push((min, max));
    }

    fn set_current_time(&mut self, time: Micros) {
        self.log.lock().unwrap().seek_times.push(time);
    }

    fn set_export_range(&mut self, export_in: Option<Micros>, export_out: Option<Micros>) {
        self.log.lock().unwrap().seek_export = (export_in, export_out);
    }

    fn repaint(&mut self) {
        self.log.lock().unwrap().repaints += 1;
    }
}

impl ValueTable for RecordingPresenter {
    fn refresh(&mut self, snapshot: &ValueSnapshot) {
        self.log.lock().unwrap().refreshes.push(snapshot.clone());
    }
}

/// Presenters that write into one shared recording. The renderer reports a
/// visible window of `window` microseconds.
pub fn recording_presenters(window: Micros) -> (Presenters, Shared) {
    let shared: Shared = Arc::default();
    let make = || RecordingPresenter {
        log: shared.clone(),
        window,
    };
    let presenters = Presenters::new(Box::new(make()), Box::new(make()), Box::new(make()));
    (presenters, shared)
}

/// In-memory log with fixed segments
#[derive(Debug, Clone)]
pub struct StubLog {
    pub name: String,
    /// `(min, max)` per segment, `None` for a segment that fails to open
    pub segments: Vec<Option<(Micros, Micros)>>,
    pub fields: Vec<String>,
    pub selected: Option<usize>,
}

impl StubLog {
    pub fn new(name: &str, segments: Vec<Option<(Micros, Micros)>>) -> Self {
        Self {
            name: name.to_string(),
            segments,
            fields: vec!["motor[0]".to_string(), "gyroADC[0]".to_string()],
            selected: None,
        }
    }

    fn range(&self) -> (Micros, Micros) {
        self.selected
            .and_then(|i| self.segments.get(i).copied().flatten())
            .unwrap_or((0, 0))
    }
}

impl LogSource for StubLog {
    fn identity(&self) -> &str {
        &self.name
    }

    fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn open_segment(&mut self, index: usize) -> bool {
        match self.segments.get(index) {
            Some(Some(_)) => {
                self.selected = Some(index);
                true
            }
            _ => false,
        }
    }

    fn segment_index(&self) -> Option<usize> {
        self.selected
    }

    fn min_time(&self) -> Micros {
        self.range().0
    }

    fn max_time(&self) -> Micros {
        self.range().1
    }

    fn field_names(&self) -> &[String] {
        &self.fields
    }

    fn frame_at(&self, _time: Micros) -> Option<&[f64]> {
        Some(&[1500.0, -3.0])
    }
}
