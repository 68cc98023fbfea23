mod console;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use blackbox_timeline::core::format_time;
use blackbox_timeline::graph::{offered_field_names, GraphConfig};
use blackbox_timeline::input::{load_log, LogSource};
use blackbox_timeline::playback::{DriverMessage, FrameDriver, PlaybackEngine};
use blackbox_timeline::shortcuts::{parse_combo, ShortcutManager};
use blackbox_timeline::store::{JsonFileStore, MemoryStore, PrefStore};
use blackbox_timeline::video::{SimulatedVideo, VideoEvent};
use blackbox_timeline::{Command, EngineConfig};

/// Replay a flight log on the terminal, optionally locked to a video clock
#[derive(Parser, Debug)]
#[command(name = "bbtimeline", version, about)]
struct Args {
    /// Flight log to replay (CSV with a time column)
    #[arg(required_unless_present = "list_shortcuts")]
    log: Option<PathBuf>,

    /// Flight within the file to play
    #[arg(short, long, default_value_t = 0)]
    segment: usize,

    /// Playback rate in percent (5-300)
    #[arg(short, long, default_value_t = 100)]
    rate: u32,

    /// Start position relative to the log start, e.g. 01:30.5
    #[arg(long)]
    start: Option<String>,

    /// Name of a simulated video to sync against
    #[arg(long)]
    video: Option<String>,

    /// Length of the simulated video in seconds
    #[arg(long, default_value_t = 120.0)]
    video_duration: f64,

    /// Video offset in seconds, overrides any remembered offset
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<f64>,

    /// Engine tuning file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Workspace file to import before playing
    #[arg(long)]
    workspaces: Option<PathBuf>,

    /// Key presses to apply before playing, e.g. --key Shift+Right --key Alt+M
    #[arg(short, long = "key")]
    keys: Vec<String>,

    /// Seek bar width in columns
    #[arg(long, default_value_t = 60)]
    columns: usize,

    /// Print field values as playback runs
    #[arg(long)]
    values: bool,

    /// Keep preferences in memory only
    #[arg(long)]
    no_prefs: bool,

    /// Print the graphable fields of the log and exit
    #[arg(long)]
    fields: bool,

    /// Print the keyboard shortcuts and exit
    #[arg(long)]
    list_shortcuts: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to read engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let shortcuts = ShortcutManager::new(&config);
    if args.list_shortcuts {
        println!("{}", shortcuts.help());
        return Ok(());
    }
    let Some(log_path) = args.log.clone() else {
        anyhow::bail!("no log file given");
    };

    let log = load_log(&log_path)
        .await
        .with_context(|| format!("Failed to load {}", log_path.display()))?;
    if args.fields {
        for name in offered_field_names(log.field_names(), &GraphConfig::default()) {
            println!("{}", name);
        }
        return Ok(());
    }
    for index in 0..log.segment_count() {
        if let Some((start, end)) = log.segment_range(index) {
            println!("flight {}: {}", index, format_time(end - start, true));
        }
    }

    let engine = PlaybackEngine::new(
        config,
        open_store(args.no_prefs),
        console::presenters(args.columns, args.values),
    );
    let (driver, tx) = FrameDriver::new(engine);

    let shutdown = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(DriverMessage::Shutdown);
        }
    });

    let started = Local::now();
    queue_session(&args, &shortcuts, Box::new(log), &tx)?;
    drop(tx);

    let engine = driver.stop_when_idle(true).run().await;

    println!(
        "session {} - {}",
        started.format("%Y-%m-%d %H:%M:%S"),
        Local::now().format("%H:%M:%S")
    );
    println!(
        "stopped at {} after {} frames",
        format_time(engine.current_time() - engine.time_base().min_time(), true),
        engine.render_count()
    );
    if engine.has_video() {
        println!("video offset {}", engine.video_sync().display_text());
    }
    Ok(())
}

fn open_store(disabled: bool) -> Box<dyn PrefStore> {
    if disabled {
        return Box::new(MemoryStore::new());
    }
    match JsonFileStore::default_path() {
        Some(path) => {
            info!(path = %path.display(), "using preference file");
            Box::new(JsonFileStore::open(path))
        }
        None => {
            warn!("no config directory, preferences will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

/// Queue everything the session needs before playback starts
fn queue_session(
    args: &Args,
    shortcuts: &ShortcutManager,
    log: Box<dyn LogSource>,
    tx: &UnboundedSender<DriverMessage>,
) -> Result<()> {
    let send = |message: DriverMessage| {
        tx.send(message)
            .map_err(|_| anyhow::anyhow!("Frame driver stopped early"))
    };
    let command = |command: Command| send(DriverMessage::Command(command));

    send(DriverMessage::OpenLog(log))?;
    if args.segment != 0 {
        command(Command::SelectSegment(args.segment))?;
    }

    if let Some(path) = &args.workspaces {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read workspaces {}", path.display()))?;
        command(Command::ImportWorkspaces(json))?;
    }

    if let Some(name) = &args.video {
        send(DriverMessage::AttachVideo(Box::new(SimulatedVideo::new(name, args.video_duration))))?;
        send(DriverMessage::Video(VideoEvent::Ready))?;
        if let Some(offset) = args.offset {
            command(Command::SetVideoOffset(offset))?;
        }
    }

    command(Command::SetPlaybackRate(args.rate))?;
    if let Some(start) = &args.start {
        command(Command::SetTimeText(start.clone()))?;
    }

    for combo in &args.keys {
        match parse_combo(combo).and_then(|(key, mods)| shortcuts.process_key(key, mods)) {
            Some(mapped) => command(mapped)?,
            None => warn!(key = %combo, "no shortcut for key"),
        }
    }

    command(Command::Play)
}
