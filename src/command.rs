use crate::core::Micros;
use crate::graph::GraphConfig;

/// How far a jump moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpSize {
    /// The configured small step (100ms)
    Small,
    /// A fraction of the visible graph window
    Fraction(f64),
}

/// Display toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewToggle {
    Table,
    Craft,
    Sticks,
    Analyser,
    Legend,
    /// Quick-show the value table on top of the graphs
    TableOverlay,
}

/// Everything a user can ask the engine to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Playback
    TogglePlayback,
    Play,
    Pause,
    SetPlaybackRate(u32),
    FasterPlayback,
    SlowerPlayback,

    // Navigation
    JumpBack(JumpSize),
    JumpForward(JumpSize),
    JumpStart,
    JumpEnd,
    VideoJumpStart,
    VideoJumpEnd,
    /// Absolute log time
    SeekTo(Micros),
    /// Time typed into the time field, relative to the log start
    SetTimeText(String),
    /// Switch to another flight in the same file
    SelectSegment(usize),

    // Zoom
    ZoomIn { fast: bool },
    ZoomOut { fast: bool },
    ZoomReset,
    ToggleQuickZoom,
    SetZoom(u32),

    // Bookmarks and marker
    ToggleBookmark(usize),
    JumpToBookmark(usize),
    ClearBookmarks,
    ToggleMarker,
    JumpToMarker,
    ApplyMarkerToOffset,

    // Export range
    ToggleInTime,
    ToggleOutTime,

    // Graph configuration
    ApplyGraphConfig(GraphConfig),
    UndoGraphConfig,
    ExpandGraph(usize),
    CollapseGraph(usize),
    StoreWorkspace(usize),
    LoadWorkspace(usize),
    ImportWorkspaces(String),

    // Video offset
    SetVideoOffset(f64),
    /// Shift the offset by one configured step
    NudgeVideoOffset { forward: bool },
    SyncVideoHere,
    CommitVideoOffsetText(String),

    // Display
    ToggleView(ViewToggle),
    Resize { width: u32, height: u32 },
}
