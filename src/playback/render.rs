use crate::config::ViewSettings;
use crate::core::Micros;
use crate::graph::GraphConfig;
use crate::input::LogSource;

/// Field values at one point in time, handed to the value table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSnapshot {
    pub time: Micros,
    pub values: Vec<(String, f64)>,
}

impl ValueSnapshot {
    /// Collect the values of the frame nearest to `time`
    pub fn capture(log: &dyn LogSource, time: Micros) -> Self {
        let values = match log.frame_at(time) {
            Some(frame) => log
                .field_names()
                .iter()
                .cloned()
                .zip(frame.iter().copied())
                .collect(),
            None => Vec::new(),
        };
        Self { time, values }
    }
}

/// Trait for whatever draws the graphs.
///
/// Only `draw` runs per frame; everything else is called on configuration
/// changes.
pub trait Renderer: Send {
    /// Draw the graphs centred on `time`
    fn draw(&mut self, time: Micros);

    fn resize(&mut self, width: u32, height: u32);

    /// Rebuild the per-field drawing state for a new log or configuration
    fn adapt_graphs(&mut self, log: &dyn LogSource, config: &GraphConfig);

    /// Zoom as a factor, 1.0 = default
    fn set_zoom(&mut self, factor: f64);

    /// Width of the visible window in microseconds
    fn window_width_time(&self) -> Micros;

    fn set_export_range(&mut self, _export_in: Option<Micros>, _export_out: Option<Micros>) {}

    fn set_marks(&mut self, _marker: Option<Micros>, _bookmarks: &[Option<Micros>]) {}

    fn apply_view(&mut self, _view: &ViewSettings) {}
}

/// Trait for the seek bar below the graphs
pub trait SeekBar: Send {
    fn set_time_range(&mut self, min: Micros, max: Micros, current: Micros);

    fn set_current_time(&mut self, time: Micros);

    fn set_export_range(&mut self, export_in: Option<Micros>, export_out: Option<Micros>);

    fn repaint(&mut self);

    fn resize(&mut self, _width: u32) {}
}

/// Trait for the field value table
pub trait ValueTable: Send {
    fn refresh(&mut self, snapshot: &ValueSnapshot);
}

/// Collaborator that ignores everything, for sessions without a display
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

/// Visible window used when nothing is drawn: ten seconds
const HEADLESS_WINDOW: Micros = 10_000_000;

impl Renderer for Headless {
    fn draw(&mut self, _time: Micros) {}

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn adapt_graphs(&mut self, _log: &dyn LogSource, _config: &GraphConfig) {}

    fn set_zoom(&mut self, _factor: f64) {}

    fn window_width_time(&self) -> Micros {
        HEADLESS_WINDOW
    }
}

impl SeekBar for Headless {
    fn set_time_range(&mut self, _min: Micros, _max: Micros, _current: Micros) {}

    fn set_current_time(&mut self, _time: Micros) {}

    fn set_export_range(&mut self, _export_in: Option<Micros>, _export_out: Option<Micros>) {}

    fn repaint(&mut self) {}
}

impl ValueTable for Headless {
    fn refresh(&mut self, _snapshot: &ValueSnapshot) {}
}

/// The display collaborators the engine drives
pub struct Presenters {
    pub renderer: Box<dyn Renderer>,
    pub seek_bar: Box<dyn SeekBar>,
    pub value_table: Box<dyn ValueTable>,
}

impl Presenters {
    pub fn new(renderer: Box<dyn Renderer>, seek_bar: Box<dyn SeekBar>, value_table: Box<dyn ValueTable>) -> Self {
        Self {
            renderer,
            seek_bar,
            value_table,
        }
    }

    pub fn headless() -> Self {
        Self::new(Box::new(Headless), Box::new(Headless), Box::new(Headless))
    }
}
