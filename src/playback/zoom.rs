pub const MIN_ZOOM: u32 = 10;
pub const MAX_ZOOM: u32 = 1000;
pub const DEFAULT_ZOOM: u32 = 100;
pub const ZOOM_STEP: u32 = 10;
/// Added on top of the step when the fast modifier is held
pub const FAST_ZOOM_EXTRA: u32 = 15;

/// Graph zoom in percent, with the previous level kept for quick zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom {
    level: u32,
    previous: u32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            level: DEFAULT_ZOOM,
            previous: DEFAULT_ZOOM,
        }
    }
}

impl Zoom {
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Zoom as a scale factor for the renderer
    pub fn factor(&self) -> f64 {
        self.level as f64 / 100.0
    }

    /// Set the zoom, or go back to the previous level with `None`.
    /// Out-of-range levels are ignored.
    pub fn set(&mut self, zoom: Option<u32>) -> bool {
        let zoom = zoom.unwrap_or(self.previous);
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return false;
        }
        self.previous = self.level;
        self.level = zoom;
        true
    }

    pub fn zoom_in(&mut self, fast: bool) -> bool {
        self.set(Some(self.level + step(fast)))
    }

    pub fn zoom_out(&mut self, fast: bool) -> bool {
        match self.level.checked_sub(step(fast)) {
            Some(level) => self.set(Some(level)),
            None => false,
        }
    }

    pub fn reset(&mut self) -> bool {
        self.set(Some(DEFAULT_ZOOM))
    }

    /// Jump all the way out, or back to where we were if already there
    pub fn toggle_quick(&mut self) -> bool {
        if self.level == MIN_ZOOM {
            self.set(None)
        } else {
            self.set(Some(MIN_ZOOM))
        }
    }
}

fn step(fast: bool) -> u32 {
    if fast {
        ZOOM_STEP + FAST_ZOOM_EXTRA
    } else {
        ZOOM_STEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_steps() {
        let mut zoom = Zoom::default();
        assert!(zoom.zoom_in(false));
        assert_eq!(zoom.level(), 110);
        assert!(zoom.zoom_in(true));
        assert_eq!(zoom.level(), 135);
        assert!(zoom.zoom_out(true));
        assert!(zoom.zoom_out(false));
        assert_eq!(zoom.level(), 100);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut zoom = Zoom::default();
        assert!(!zoom.set(Some(5)));
        assert!(!zoom.set(Some(1001)));
        assert_eq!(zoom.level(), DEFAULT_ZOOM);

        zoom.set(Some(MIN_ZOOM));
        assert!(!zoom.zoom_out(false));
        assert_eq!(zoom.level(), MIN_ZOOM);

        zoom.set(Some(995));
        assert!(!zoom.zoom_in(false));
        assert_eq!(zoom.level(), 995);
    }

    #[test]
    fn test_quick_zoom_round_trip() {
        let mut zoom = Zoom::default();
        zoom.set(Some(250));
        assert!(zoom.toggle_quick());
        assert_eq!(zoom.level(), MIN_ZOOM);
        assert!(zoom.toggle_quick());
        assert_eq!(zoom.level(), 250);
    }

    #[test]
    fn test_factor() {
        let mut zoom = Zoom::default();
        zoom.set(Some(250));
        assert_eq!(zoom.factor(), 2.5);
        zoom.reset();
        assert_eq!(zoom.factor(), 1.0);
    }
}
