//! UI sync
//!
//! A `PlayerView` is a plain description of what the player UI shows. The
//! controller keeps a small mirror of display-only fields (icon, elapsed
//! time, progress); everything else is derived from the catalog and session
//! on every render.

use crate::progress::format_time;
use crate::session::{PlaybackSession, SessionPhase};
use crate::types::PlayIcon;
use crate::volume::{Volume, VolumeTier};
use serde::Serialize;
use std::time::Duration;
use waveline_core::Catalog;
use waveline_visualizer::VisualizerState;

/// Display fields updated by engine events and progress ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayMirror {
    pub play_icon: PlayIcon,
    pub elapsed: Duration,
    pub total: Option<Duration>,
    pub progress: f32,
}

impl DisplayMirror {
    /// Back to the freshly-loaded state: play icon, zero elapsed and progress
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metadata of the selected track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowPlaying {
    pub index: usize,
    pub title: String,
    pub artist: String,
    pub image_url: String,
    /// Shown instead of `image_url` if that fails to load
    pub fallback_image_url: String,
}

/// One playlist row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistItem {
    pub index: usize,
    /// `"<title> - <artist>"`
    pub label: String,
    pub image_url: String,
    pub fallback_image_url: String,
    /// Highlighted as the selected track
    pub active: bool,
}

/// Everything the player UI shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub now_playing: Option<NowPlaying>,
    pub phase: SessionPhase,
    pub play_icon: PlayIcon,
    pub volume: f32,
    pub volume_icon: VolumeTier,
    pub progress: f32,
    pub elapsed: String,
    pub total: String,
    pub visualizer_running: bool,
    pub playlist: Vec<PlaylistItem>,
}

impl PlayerView {
    /// The highlighted playlist row, if any
    pub fn active_item(&self) -> Option<&PlaylistItem> {
        self.playlist.iter().find(|item| item.active)
    }
}

/// Render the player view from current state
pub fn render<T>(
    catalog: &Catalog,
    session: &PlaybackSession<T>,
    volume: &Volume,
    mirror: &DisplayMirror,
    visualizer: VisualizerState,
    placeholder_image: &str,
) -> PlayerView {
    let artwork = |image_url: &str| {
        if image_url.is_empty() {
            placeholder_image.to_string()
        } else {
            image_url.to_string()
        }
    };

    let selected = (session.phase() != SessionPhase::Unloaded)
        .then(|| session.current_index())
        .filter(|&index| index < catalog.len());

    let now_playing = selected.and_then(|index| {
        catalog.get(index).map(|track| NowPlaying {
            index,
            title: track.title.clone(),
            artist: track.artist.clone(),
            image_url: artwork(&track.image_url),
            fallback_image_url: placeholder_image.to_string(),
        })
    });

    let playlist = catalog
        .iter()
        .enumerate()
        .map(|(index, track)| PlaylistItem {
            index,
            label: track.display_label(),
            image_url: artwork(&track.image_url),
            fallback_image_url: placeholder_image.to_string(),
            active: selected == Some(index),
        })
        .collect();

    PlayerView {
        now_playing,
        phase: session.phase(),
        play_icon: mirror.play_icon,
        volume: volume.level(),
        volume_icon: volume.tier(),
        progress: mirror.progress,
        elapsed: format_time(mirror.elapsed),
        total: format_time(mirror.total.unwrap_or_default()),
        visualizer_running: visualizer.running,
        playlist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveline_core::Track;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Track::new("Intro", "A", "a.jpg", "a.mp3"),
            Track::new("Outro", "B", "b.jpg", "b.mp3"),
        ])
    }

    #[test]
    fn unloaded_view_highlights_nothing() {
        let session: PlaybackSession<()> = PlaybackSession::new();
        let view = render(
            &catalog(),
            &session,
            &Volume::default(),
            &DisplayMirror::default(),
            VisualizerState::default(),
            "placeholder.svg",
        );

        assert_eq!(view.now_playing, None);
        assert_eq!(view.playlist.len(), 2);
        assert!(view.active_item().is_none());
        assert_eq!(view.play_icon, PlayIcon::Play);
        assert_eq!(view.elapsed, "0:00");
        assert_eq!(view.total, "0:00");
    }

    #[test]
    fn selected_track_is_highlighted() {
        let mut session: PlaybackSession<()> = PlaybackSession::new();
        session.begin(1);

        let mirror = DisplayMirror {
            play_icon: PlayIcon::Pause,
            elapsed: Duration::from_secs(65),
            total: Some(Duration::from_secs(200)),
            progress: 0.325,
        };
        let view = render(
            &catalog(),
            &session,
            &Volume::new(0.7),
            &mirror,
            VisualizerState::default(),
            "placeholder.svg",
        );

        let now = view.now_playing.as_ref().unwrap();
        assert_eq!(now.title, "Outro");
        assert_eq!(view.active_item().unwrap().label, "Outro - B");
        assert_eq!(view.elapsed, "1:05");
        assert_eq!(view.total, "3:20");
        assert_eq!(view.volume_icon, VolumeTier::High);
    }

    #[test]
    fn artwork_falls_back_to_placeholder() {
        let catalog = Catalog::new(vec![
            Track::new("Intro", "A", "a.jpg", "a.mp3"),
            Track::new("Bare", "B", "", "b.mp3"),
        ]);
        let mut session: PlaybackSession<()> = PlaybackSession::new();
        session.begin(1);

        let view = render(
            &catalog,
            &session,
            &Volume::default(),
            &DisplayMirror::default(),
            VisualizerState::default(),
            "/img/none.svg",
        );

        let now = view.now_playing.as_ref().unwrap();
        assert_eq!(now.image_url, "/img/none.svg");
        assert_eq!(now.fallback_image_url, "/img/none.svg");
        assert_eq!(view.playlist[0].image_url, "a.jpg");
        assert_eq!(view.playlist[0].fallback_image_url, "/img/none.svg");
        assert_eq!(view.playlist[1].image_url, "/img/none.svg");
    }
}
