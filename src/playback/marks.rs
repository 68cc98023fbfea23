use crate::core::{Micros, MICROS_PER_SECOND};

/// Bookmark slots, addressed by digit key. Slot 0 is never stored.
pub const BOOKMARK_SLOTS: usize = 10;

/// Distance from the marker to the current time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerOffset {
    /// Signed elapsed time in microseconds
    pub elapsed: Micros,
    /// `1e6 / |elapsed|`, absent when the marker is at the current time
    pub frequency_hz: Option<f64>,
}

/// Bookmarks, the measuring marker and the export in/out points.
///
/// Memory only; nothing here survives the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marks {
    bookmarks: [Option<Micros>; BOOKMARK_SLOTS],
    marker: Option<Micros>,
    marker_visible: bool,
    export_in: Option<Micros>,
    export_out: Option<Micros>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle bookmark `index` (1..=9): an empty slot takes `time`, an
    /// occupied slot is cleared. Returns false for an invalid index.
    pub fn set_bookmark(&mut self, index: usize, time: Micros) -> bool {
        if !(1..BOOKMARK_SLOTS).contains(&index) {
            return false;
        }
        let slot = &mut self.bookmarks[index];
        *slot = match slot {
            Some(_) => None,
            None => Some(time),
        };
        true
    }

    pub fn bookmark(&self, index: usize) -> Option<Micros> {
        self.bookmarks.get(index).copied().flatten()
    }

    /// True when at least one bookmark is set
    pub fn any(&self) -> bool {
        self.bookmarks.iter().any(Option::is_some)
    }

    pub fn clear_all(&mut self) {
        self.bookmarks = [None; BOOKMARK_SLOTS];
    }

    /// Place the marker at `time` and show it
    pub fn set_marker(&mut self, time: Micros) {
        self.marker = Some(time);
        self.marker_visible = true;
    }

    /// Show the marker at `time`, or hide it if it is already showing
    pub fn toggle_marker(&mut self, time: Micros) {
        if self.marker_visible {
            self.hide_marker();
        } else {
            self.set_marker(time);
        }
    }

    pub fn hide_marker(&mut self) {
        self.marker_visible = false;
    }

    /// Marker time while the marker is visible
    pub fn marker(&self) -> Option<Micros> {
        self.marker.filter(|_| self.marker_visible)
    }

    pub fn offset_from_marker(&self, current: Micros) -> Option<MarkerOffset> {
        let marker = self.marker()?;
        let elapsed = current - marker;
        let frequency_hz = match elapsed {
            0 => None,
            e => Some(MICROS_PER_SECOND / e.unsigned_abs() as f64),
        };
        Some(MarkerOffset { elapsed, frequency_hz })
    }

    /// Set the export in-point, or clear it when it already sits at `time`
    pub fn toggle_in(&mut self, time: Micros) {
        self.export_in = toggled(self.export_in, time);
    }

    /// Set the export out-point, or clear it when it already sits at `time`
    pub fn toggle_out(&mut self, time: Micros) {
        self.export_out = toggled(self.export_out, time);
    }

    pub fn export_range(&self) -> (Option<Micros>, Option<Micros>) {
        (self.export_in, self.export_out)
    }

    pub fn clear_export_range(&mut self) {
        self.export_in = None;
        self.export_out = None;
    }
}

fn toggled(current: Option<Micros>, time: Micros) -> Option<Micros> {
    match current {
        Some(existing) if existing == time => None,
        _ => Some(time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookmark_toggle_pair() {
        let mut marks = Marks::new();
        assert!(marks.set_bookmark(3, 1_500_000));
        assert_eq!(marks.bookmark(3), Some(1_500_000));
        assert!(marks.any());

        assert!(marks.set_bookmark(3, 9_000_000));
        assert_eq!(marks.bookmark(3), None);
        assert!(!marks.any());
    }

    #[test]
    fn test_bookmark_index_range() {
        let mut marks = Marks::new();
        assert!(!marks.set_bookmark(0, 10));
        assert!(!marks.set_bookmark(10, 10));
        assert!(marks.set_bookmark(9, 10));
        assert_eq!(marks.bookmark(42), None);
    }

    #[test]
    fn test_clear_all() {
        let mut marks = Marks::new();
        for i in 1..BOOKMARK_SLOTS {
            marks.set_bookmark(i, i as Micros);
        }
        marks.clear_all();
        assert!(!marks.any());
    }

    #[test]
    fn test_marker_offset_and_frequency() {
        let mut marks = Marks::new();
        assert!(marks.offset_from_marker(0).is_none());

        marks.set_marker(1_000_000);
        let offset = marks.offset_from_marker(1_002_000).unwrap();
        assert_eq!(offset.elapsed, 2_000);
        assert_eq!(offset.frequency_hz, Some(500.0));

        let zero = marks.offset_from_marker(1_000_000).unwrap();
        assert_eq!(zero.elapsed, 0);
        assert_eq!(zero.frequency_hz, None);
    }

    #[test]
    fn test_toggle_marker_hides_then_moves() {
        let mut marks = Marks::new();
        marks.toggle_marker(100);
        assert_eq!(marks.marker(), Some(100));
        marks.toggle_marker(200);
        assert_eq!(marks.marker(), None);
        marks.toggle_marker(300);
        assert_eq!(marks.marker(), Some(300));
    }

    #[test]
    fn test_export_points_toggle_at_same_time() {
        let mut marks = Marks::new();
        marks.toggle_in(500);
        marks.toggle_out(900);
        assert_eq!(marks.export_range(), (Some(500), Some(900)));

        marks.toggle_in(600);
        assert_eq!(marks.export_range().0, Some(600));
        marks.toggle_in(600);
        assert_eq!(marks.export_range().0, None);

        marks.clear_export_range();
        assert_eq!(marks.export_range(), (None, None));
    }
}
