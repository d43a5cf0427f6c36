//! Property-based tests for the playback controller
//!
//! Uses proptest to verify invariants across many random inputs.

mod common;

use common::{catalog_of, controller};
use proptest::prelude::*;
use std::time::Duration;
use waveline_core::Catalog;
use waveline_playback::{progress_fraction, Volume, VolumeTier};

fn names(len: usize) -> Vec<String> {
    (0..len).map(|i| format!("T{i}")).collect()
}

fn catalog(len: usize) -> Catalog {
    let names = names(len);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    catalog_of(&refs)
}

#[derive(Debug, Clone)]
enum Command {
    Next,
    Prev,
    Select(usize),
    Toggle,
    Volume(f32),
    Seek(f32),
    Tick,
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Next),
        Just(Command::Prev),
        (0usize..20).prop_map(Command::Select),
        Just(Command::Toggle),
        (-1.0f32..2.0).prop_map(Command::Volume),
        (-1.0f32..2.0).prop_map(Command::Seek),
        Just(Command::Tick),
    ]
}

proptest! {
    /// Property: next then prev returns to the starting index
    #[test]
    fn next_then_prev_is_identity(len in 1usize..30, start in 0usize..30) {
        let start = start % len;
        let catalog = catalog(len);

        let next = catalog.next_index(start).unwrap();
        prop_assert_eq!(catalog.prev_index(next), Some(start));

        let mut player = controller();
        player.set_catalog(catalog).unwrap();
        player.load_track(start).unwrap();
        player.next().unwrap();
        player.prev().unwrap();
        prop_assert_eq!(player.session().current_index(), start);
    }

    /// Property: any command sequence leaves at most one live handle and tap,
    /// and the session's handle is the live one
    #[test]
    fn at_most_one_live_session(
        len in 1usize..6,
        commands in prop::collection::vec(command(), 1..40)
    ) {
        let mut player = controller();
        player.set_catalog(catalog(len)).unwrap();

        for command in commands {
            // Out-of-range selections are expected to fail; state must hold regardless
            let _ = match command {
                Command::Next => player.next(),
                Command::Prev => player.prev(),
                Command::Select(i) => player.select_from_playlist(i),
                Command::Toggle => player.toggle_play_pause(),
                Command::Volume(v) => player.set_volume(v),
                Command::Seek(f) => player.seek(f),
                Command::Tick => {
                    player.tick();
                    Ok(())
                }
            };
            player.pump_events();

            let live = player.engine().live_handles();
            prop_assert!(live.len() <= 1);
            prop_assert!(player.engine().live_taps.len() <= 1);
            prop_assert_eq!(live.first().copied(), player.session().handle());

            let view = player.view();
            prop_assert!((0.0..=1.0).contains(&view.progress));
            prop_assert!((0.0..=1.0).contains(&view.volume));
            prop_assert_eq!(
                view.visualizer_running,
                player.session().handle().is_some_and(|h| player.engine().playing(h))
            );
        }
    }

    /// Property: progress is in [0, 1] whenever the duration is positive
    #[test]
    fn progress_fraction_is_bounded(position_ms in 0u64..10_000_000, duration_ms in 1u64..10_000_000) {
        let fraction = progress_fraction(
            Duration::from_millis(position_ms),
            Some(Duration::from_millis(duration_ms)),
        ).unwrap();

        prop_assert!(fraction.is_finite());
        prop_assert!((0.0..=1.0).contains(&fraction));
    }

    /// Property: volume tier follows the level thresholds
    #[test]
    fn volume_tier_matches_level(level in -1.0f32..2.0) {
        let volume = Volume::new(level);
        let clamped = volume.level();
        let expected = if clamped == 0.0 {
            VolumeTier::Muted
        } else if clamped < 0.5 {
            VolumeTier::Low
        } else {
            VolumeTier::High
        };
        prop_assert_eq!(volume.tier(), expected);
    }

    /// Property: applying volume never amplifies a sample
    #[test]
    fn volume_never_amplifies(
        level in 0.0f32..=1.0,
        samples in prop::collection::vec(-1.0f32..1.0, 1..500)
    ) {
        let mut buffer = samples.clone();
        Volume::new(level).apply(&mut buffer);

        for (out, input) in buffer.iter().zip(&samples) {
            prop_assert!(out.abs() <= input.abs());
        }
    }
}
