//! Player event loop
//!
//! Everything runs on one thread: stdin commands, the progress tick, the
//! visualizer frame cadence and the engine event drain are branches of a
//! single `select!`, each run to completion before the next.

use crate::commands::{self, Command};
use crate::config::PlayerSettings;
use crate::error::Result;
use std::fmt::Write as _;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use waveline_core::{manifest_source_for, Catalog};
use waveline_playback::{AudioEngine, PlayIcon, PlaybackController, PlayerEvent, PlayerView};
use waveline_visualizer::{DrawSurface, FrameOutcome, PixelSurface, QueuedFrameScheduler};

/// How often engine events are drained
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Columns in the text spectrum printed by `status`
const SPECTRUM_COLUMNS: u32 = 48;

/// Fetch and parse the configured manifest
pub async fn load_catalog(location: &str) -> Result<Catalog> {
    let source = manifest_source_for(location)?;
    Ok(Catalog::load(source.as_ref()).await?)
}

/// Controller plus the surface the visualizer paints on
pub struct App<E: AudioEngine> {
    controller: PlaybackController<E, QueuedFrameScheduler>,
    surface: PixelSurface,
}

impl<E: AudioEngine> App<E> {
    pub fn new(engine: E, settings: &PlayerSettings) -> Self {
        Self {
            controller: PlaybackController::new(
                engine,
                QueuedFrameScheduler::new(),
                settings.player_config(),
            ),
            surface: PixelSurface::new(settings.visualizer.width, settings.visualizer.height),
        }
    }

    /// Hand a loaded catalog to the controller
    pub fn install_catalog(&mut self, catalog: Catalog) {
        if let Err(e) = self.controller.set_catalog(catalog) {
            error!("Failed to load first track: {}", e);
        }
        self.log_events();
    }

    /// Handle one stdin line; returns false when the user asked to quit
    pub fn handle_line(&mut self, line: &str) -> bool {
        match commands::parse(line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => true,
            Err(e) => {
                println!("{e} (try 'help')");
                true
            }
        }
    }

    /// Run a parsed command; returns false for `quit`
    pub fn execute(&mut self, command: Command) -> bool {
        debug!(?command, "Command");
        let result = match command {
            Command::TogglePlay => self.controller.toggle_play_pause(),
            Command::Next => self.controller.next(),
            Command::Prev => self.controller.prev(),
            Command::Volume(level) => self.controller.set_volume(level),
            Command::Seek(fraction) => self.controller.seek(fraction),
            Command::Select(index) => self.controller.select_from_playlist(index),
            Command::List => {
                println!("{}", format_playlist(&self.controller.view()));
                Ok(())
            }
            Command::Status => {
                println!("{}", format_status(&self.controller.view()));
                println!("{}", spectrum_line(&self.surface, SPECTRUM_COLUMNS));
                Ok(())
            }
            Command::Help => {
                println!("{}", commands::HELP);
                Ok(())
            }
            Command::Quit => return false,
        };

        if let Err(e) = result {
            warn!("{:?} failed: {}", command, e);
        }
        self.log_events();
        true
    }

    /// Progress sync
    pub fn tick(&mut self) {
        self.controller.tick();
        // Progress events are too chatty for the log
        self.controller.drain_events();
    }

    /// Paint every frame the visualizer is waiting on; returns frames drawn
    pub fn render_due_frames(&mut self) -> usize {
        let due = self.controller.frame_scheduler_mut().take_due();
        let mut drawn = 0;
        for token in due {
            if let FrameOutcome::Drawn { .. } = self.controller.render_frame(token, &mut self.surface) {
                drawn += 1;
            }
        }
        drawn
    }

    /// Apply engine events and log what changed
    pub fn pump(&mut self) -> usize {
        let count = self.controller.pump_events();
        if count > 0 {
            self.log_events();
        }
        count
    }

    pub fn shutdown(&mut self) {
        self.controller.shutdown();
        self.log_events();
    }

    pub fn controller(&self) -> &PlaybackController<E, QueuedFrameScheduler> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<E, QueuedFrameScheduler> {
        &mut self.controller
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    fn log_events(&mut self) {
        for event in self.controller.drain_events() {
            match event {
                PlayerEvent::TrackChanged {
                    index,
                    title,
                    artist,
                } => info!("Track {}: {} - {}", index, title, artist),
                PlayerEvent::StateChanged { phase } => info!(?phase, "Playback state"),
                PlayerEvent::TrackFinished { index } => info!("Track {} finished", index),
                PlayerEvent::VolumeChanged { level, tier } => {
                    info!(?tier, "Volume {:.0}%", level * 100.0);
                }
                PlayerEvent::PlaylistChanged { length } => info!("Playlist has {} tracks", length),
                PlayerEvent::Error { message } => warn!("{}", message),
                PlayerEvent::ProgressUpdated { .. } => {}
            }
        }
    }
}

/// One-line summary of the player
pub fn format_status(view: &PlayerView) -> String {
    let Some(now) = &view.now_playing else {
        return "Nothing loaded".to_string();
    };
    // The glyph the play button shows, i.e. the action it offers
    let icon = match view.play_icon {
        PlayIcon::Play => "|>",
        PlayIcon::Pause => "||",
    };
    format!(
        "{icon} [{}] {} - {}  {} / {} ({:.0}%)  vol {:.0}% ({:?})",
        now.index,
        now.title,
        now.artist,
        view.elapsed,
        view.total,
        view.progress * 100.0,
        view.volume * 100.0,
        view.volume_icon,
    )
}

/// Playlist with the selected row marked
pub fn format_playlist(view: &PlayerView) -> String {
    if view.playlist.is_empty() {
        return "Playlist is empty".to_string();
    }
    let mut out = String::new();
    for item in &view.playlist {
        let marker = if item.active { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} {:>3}  {}", item.index, item.label);
    }
    out.truncate(out.trim_end().len());
    out
}

/// Downsample the painted bars into a row of block characters
pub fn spectrum_line(surface: &PixelSurface, columns: u32) -> String {
    const LEVELS: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];

    let (width, height) = (surface.width() as u32, surface.height() as u32);
    if width == 0 || height == 0 || columns == 0 {
        return String::new();
    }

    (0..columns)
        .map(|column| {
            let x = column * width / columns;
            let fill = surface.column_fill(x).min(height);
            LEVELS[(fill as usize * (LEVELS.len() - 1)) / height as usize]
        })
        .collect()
}

/// Run the player until `quit` or Ctrl-C
pub async fn run<E: AudioEngine>(engine: E, settings: PlayerSettings) -> anyhow::Result<()> {
    let mut app = App::new(engine, &settings);

    match load_catalog(&settings.manifest.location).await {
        Ok(catalog) => app.install_catalog(catalog),
        Err(e) => error!(
            "Failed to load manifest from {}: {}",
            settings.manifest.location, e
        ),
    }
    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let mut tick = interval(settings.tick_interval());
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frames = interval(settings.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut events = interval(EVENT_POLL_INTERVAL);
    events.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    if !app.handle_line(&line) {
                        break;
                    }
                }
                None => {
                    debug!("stdin closed; waiting for Ctrl-C");
                    stdin_open = false;
                }
            },
            _ = events.tick() => {
                app.pump();
            }
            _ = tick.tick() => app.tick(),
            _ = frames.tick() => {
                app.render_due_frames();
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Shutting down");
    app.shutdown();
    Ok(())
}
