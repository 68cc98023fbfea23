//! Terminal stand-ins for the graph, seek bar and value table.

use blackbox_timeline::core::{format_time, Micros};
use blackbox_timeline::graph::GraphConfig;
use blackbox_timeline::input::LogSource;
use blackbox_timeline::playback::{Presenters, Renderer, SeekBar, ValueSnapshot, ValueTable};
use tracing::{debug, info, trace};

/// Visible window at 100% zoom
const BASE_WINDOW: Micros = 10_000_000;
const MIN_BAR_WIDTH: usize = 10;
/// Values printed per table refresh
const TABLE_FIELDS: usize = 6;

pub fn presenters(columns: usize, show_values: bool) -> Presenters {
    Presenters::new(
        Box::new(ConsoleRenderer::default()),
        Box::new(ConsoleSeekBar::new(columns)),
        Box::new(ConsoleValueTable { enabled: show_values }),
    )
}

#[derive(Debug)]
struct ConsoleRenderer {
    zoom: f64,
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl Renderer for ConsoleRenderer {
    fn draw(&mut self, time: Micros) {
        trace!(time, "draw");
    }

    fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "canvas resized");
    }

    fn adapt_graphs(&mut self, log: &dyn LogSource, config: &GraphConfig) {
        for graph in config.graphs() {
            let present = graph
                .fields
                .iter()
                .filter(|f| log.field_names().contains(&f.name))
                .count();
            info!(graph = %graph.label, fields = graph.fields.len(), present, "graph");
        }
    }

    fn set_zoom(&mut self, factor: f64) {
        self.zoom = factor;
    }

    fn window_width_time(&self) -> Micros {
        (BASE_WINDOW as f64 / self.zoom) as Micros
    }

    fn set_marks(&mut self, marker: Option<Micros>, bookmarks: &[Option<Micros>]) {
        let set = bookmarks.iter().filter(|b| b.is_some()).count();
        debug!(?marker, bookmarks = set, "marks changed");
    }
}

#[derive(Debug)]
struct ConsoleSeekBar {
    columns: usize,
    min: Micros,
    max: Micros,
    current: Micros,
    export: (Option<Micros>, Option<Micros>),
}

impl ConsoleSeekBar {
    fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(MIN_BAR_WIDTH),
            min: 0,
            max: 0,
            current: 0,
            export: (None, None),
        }
    }

    fn column(&self, time: Micros) -> usize {
        let span = (self.max - self.min).max(1) as f64;
        let fraction = ((time - self.min) as f64 / span).clamp(0.0, 1.0);
        (fraction * (self.columns - 1) as f64).round() as usize
    }

    fn render(&self) -> String {
        let mut bar = vec!['-'; self.columns];
        let head = self.column(self.current);
        for cell in bar.iter_mut().take(head) {
            *cell = '=';
        }
        if let Some(t) = self.export.0 {
            bar[self.column(t)] = '[';
        }
        if let Some(t) = self.export.1 {
            bar[self.column(t)] = ']';
        }
        bar[head] = '|';

        format!(
            "{} {} / {}",
            bar.into_iter().collect::<String>(),
            format_time(self.current - self.min, true),
            format_time(self.max - self.min, true),
        )
    }
}

impl SeekBar for ConsoleSeekBar {
    fn set_time_range(&mut self, min: Micros, max: Micros, current: Micros) {
        self.min = min;
        self.max = max;
        self.current = current;
    }

    fn set_current_time(&mut self, time: Micros) {
        self.current = time;
    }

    fn set_export_range(&mut self, export_in: Option<Micros>, export_out: Option<Micros>) {
        self.export = (export_in, export_out);
    }

    fn repaint(&mut self) {
        println!("{}", self.render());
    }

    fn resize(&mut self, width: u32) {
        // roughly one column per 8 pixels
        self.columns = (width as usize / 8).max(MIN_BAR_WIDTH);
    }
}

#[derive(Debug)]
struct ConsoleValueTable {
    enabled: bool,
}

impl ValueTable for ConsoleValueTable {
    fn refresh(&mut self, snapshot: &ValueSnapshot) {
        if !self.enabled {
            return;
        }
        let values: Vec<String> = snapshot
            .values
            .iter()
            .take(TABLE_FIELDS)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        println!("  {}", values.join("  "));
    }
}
