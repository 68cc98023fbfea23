use std::fmt;

use crate::command::{Command, JumpSize, ViewToggle};
use crate::config::EngineConfig;

/// Platform-neutral key identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Top-row digit 0-9
    Digit(u8),
    /// Letter, always uppercase
    Letter(char),
    Space,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
}

impl Key {
    pub fn letter(c: char) -> Self {
        Key::Letter(c.to_ascii_uppercase())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Digit(d) => write!(f, "{}", d),
            Key::Letter(c) => write!(f, "{}", c),
            Key::Space => f.write_str("Space"),
            Key::ArrowLeft => f.write_str("←"),
            Key::ArrowRight => f.write_str("→"),
            Key::PageUp => f.write_str("PgUp"),
            Key::PageDown => f.write_str("PgDn"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
        }
    }
}

/// Modifier keys held with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self::new(false, false, false);
    pub const CTRL: Self = Self::new(true, false, false);
    pub const SHIFT: Self = Self::new(false, true, false);
    pub const ALT: Self = Self::new(false, false, true);
    pub const ALT_SHIFT: Self = Self::new(false, true, true);

    pub const fn new(ctrl: bool, shift: bool, alt: bool) -> Self {
        Self { ctrl, shift, alt }
    }
}

/// Parse a combination written the way help shows it ("Shift+Alt+3",
/// "Ctrl+Z", "Space"). Case-insensitive; arrows also accept "Left"/"Right".
pub fn parse_combo(text: &str) -> Option<(Key, Modifiers)> {
    let mut modifiers = Modifiers::NONE;
    let mut key = None;

    for part in text.split('+').map(str::trim) {
        if key.is_some() {
            return None;
        }
        match part.to_ascii_lowercase().as_str() {
            "ctrl" => modifiers.ctrl = true,
            "shift" => modifiers.shift = true,
            "alt" => modifiers.alt = true,
            name => key = Some(parse_key(name)?),
        }
    }
    key.map(|key| (key, modifiers))
}

fn parse_key(name: &str) -> Option<Key> {
    let key = match name {
        "space" => Key::Space,
        "left" | "←" => Key::ArrowLeft,
        "right" | "→" => Key::ArrowRight,
        "pgup" | "pageup" => Key::PageUp,
        "pgdn" | "pagedown" => Key::PageDown,
        "home" => Key::Home,
        "end" => Key::End,
        _ => {
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            match c.to_digit(10) {
                Some(d) => Key::Digit(d as u8),
                None if c.is_ascii_alphabetic() => Key::letter(c),
                None => return None,
            }
        }
    };
    Some(key)
}

#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: Key,
    pub modifiers: Modifiers,
    pub command: Command,
    pub description: String,
}

impl Shortcut {
    /// Key combination as shown in help, e.g. "Shift+Alt+3"
    pub fn label(&self) -> String {
        let mut label = String::new();
        if self.modifiers.ctrl {
            label.push_str("Ctrl+");
        }
        if self.modifiers.shift {
            label.push_str("Shift+");
        }
        if self.modifiers.alt {
            label.push_str("Alt+");
        }
        label.push_str(&self.key.to_string());
        label
    }
}

/// Keyboard and mouse wheel mapping to engine commands
pub struct ShortcutManager {
    shortcuts: Vec<Shortcut>,
    wheel_fraction: f64,
}

impl ShortcutManager {
    pub fn new(config: &EngineConfig) -> Self {
        let mut manager = Self {
            shortcuts: Vec::new(),
            wheel_fraction: config.wheel_jump_fraction,
        };
        manager.register_defaults(config.page_jump_fraction);
        manager
    }

    fn register_defaults(&mut self, page_fraction: f64) {
        use Modifiers as M;

        // Playback and navigation
        self.register(Key::Space, M::NONE, Command::TogglePlayback, "Play/Pause");
        self.register(Key::ArrowLeft, M::NONE, Command::JumpBack(JumpSize::Small), "Step back");
        self.register(Key::ArrowRight, M::NONE, Command::JumpForward(JumpSize::Small), "Step forward");
        self.register(Key::PageUp, M::NONE, Command::JumpBack(JumpSize::Fraction(page_fraction)), "Page back");
        self.register(Key::PageDown, M::NONE, Command::JumpForward(JumpSize::Fraction(page_fraction)), "Page forward");
        self.register(Key::Home, M::NONE, Command::JumpStart, "Jump to log start");
        self.register(Key::End, M::NONE, Command::JumpEnd, "Jump to log end");

        // Zoom
        for (mods, fast) in [(M::SHIFT, false), (M::ALT, true), (M::ALT_SHIFT, true)] {
            self.register(Key::ArrowLeft, mods, Command::ZoomOut { fast }, "Zoom out");
            self.register(Key::ArrowRight, mods, Command::ZoomIn { fast }, "Zoom in");
        }
        self.register(Key::letter('z'), M::NONE, Command::ToggleQuickZoom, "Quick zoom");

        // Marks
        self.register(Key::letter('i'), M::NONE, Command::ToggleInTime, "Set/clear export in-point");
        self.register(Key::letter('o'), M::NONE, Command::ToggleOutTime, "Set/clear export out-point");
        self.register(Key::letter('m'), M::NONE, Command::ToggleMarker, "Set/clear marker");
        self.register(Key::letter('m'), M::ALT, Command::ApplyMarkerToOffset, "Add marker offset to video sync");

        // Graph configuration
        self.register(Key::letter('z'), M::CTRL, Command::UndoGraphConfig, "Undo graph change");
        for digit in 0..=9u8 {
            let slot = digit as usize;
            self.register(Key::Digit(digit), M::NONE, Command::LoadWorkspace(slot), &format!("Load workspace {}", digit));
            self.register(Key::Digit(digit), M::SHIFT, Command::StoreWorkspace(slot), &format!("Store workspace {}", digit));
            self.register(Key::Digit(digit), M::ALT, Command::JumpToBookmark(slot), &format!("Jump to bookmark {}", digit));
            if digit == 0 {
                self.register(Key::Digit(0), M::ALT_SHIFT, Command::ClearBookmarks, "Clear all bookmarks");
            } else {
                self.register(Key::Digit(digit), M::ALT_SHIFT, Command::ToggleBookmark(slot), &format!("Set/clear bookmark {}", digit));
            }
        }

        // View
        self.register(Key::letter('t'), M::NONE, Command::ToggleView(ViewToggle::TableOverlay), "Quick-show value table");
    }

    fn register(&mut self, key: Key, modifiers: Modifiers, command: Command, description: &str) {
        self.shortcuts.push(Shortcut {
            key,
            modifiers,
            command,
            description: description.to_string(),
        });
    }

    /// Map a key press to its command, if any
    pub fn process_key(&self, key: Key, modifiers: Modifiers) -> Option<Command> {
        self.shortcuts
            .iter()
            .find(|s| s.key == key && s.modifiers == modifiers)
            .map(|s| s.command.clone())
    }

    /// Map a wheel notch over the graph. Negative deltas scroll back.
    pub fn process_wheel(&self, delta: f64, modifiers: Modifiers) -> Option<Command> {
        if delta == 0.0 || delta.is_nan() {
            return None;
        }
        let forward = delta > 0.0;

        let command = if modifiers.alt || modifiers.shift {
            let fast = modifiers.alt;
            if forward {
                Command::ZoomIn { fast }
            } else {
                Command::ZoomOut { fast }
            }
        } else {
            let size = JumpSize::Fraction(self.wheel_fraction);
            if forward {
                Command::JumpForward(size)
            } else {
                Command::JumpBack(size)
            }
        };
        Some(command)
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Help text, one shortcut per line
    pub fn help(&self) -> String {
        self.shortcuts
            .iter()
            .map(|s| format!("  {:15} - {}", s.label(), s.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
