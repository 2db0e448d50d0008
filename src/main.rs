use std::{
    thread,
    time::{Duration, Instant},
};

use bevy::log::{info, warn};
use thiserror::Error;

use crate::{
    config::{CONFIG_PATH, ConfigError, FlightConfig},
    device::{DeviceError, HapticDevice, buttons::Button, scripted::Pilot},
    flight::util::vec3_fmt,
    game::{LevelEntry, MenuCursor},
    haptics::HapticLoop,
    level::{Difficulty, LevelError, LevelLibrary},
};

pub mod config;
pub mod device;
pub mod flight;
pub mod game;
pub mod haptics;
pub mod level;

/// Render-side refresh rate.
const FRAME_TIME: Duration = Duration::from_micros(16_667);

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("failed to start haptic thread: {0}")]
    Io(#[from] std::io::Error),

    #[error("haptic thread panicked")]
    HapticThreadPanicked,
}

/// Switch taps that start a game and walk the level select down to `difficulty`.
fn menu_presses(difficulty: Difficulty) -> Vec<(f64, Button)> {
    let steps = LevelEntry::from(difficulty).index();

    let mut presses = vec![(1.0, Button::Center)];
    presses.extend((0..steps).map(|step| (1.5 + 0.5 * step as f64, Button::Right)));
    presses.push((1.5 + 0.5 * steps as f64, Button::Center));

    presses
}

fn main() -> Result<(), AppError> {
    let config = FlightConfig::load_or_default(CONFIG_PATH)?;
    let difficulty = Difficulty::try_from(config.run.difficulty)?;
    let library = LevelLibrary::generate(config.level.seed, &config.world);

    // simulated hands: pick the course, then flap
    let right = Pilot::new(2.0, 0.03, menu_presses(difficulty));
    let left = Pilot::new(2.0, 0.03, []);
    let felt = right.commands();

    let session = Duration::from_secs_f64(config.run.session_seconds);
    let haptics = HapticLoop::spawn(
        config,
        library,
        vec![Box::new(right) as Box<dyn HapticDevice>, Box::new(left)],
    )?;
    info!("flying the {difficulty:?} course");

    let started = Instant::now();
    let mut last_version = 0;
    let mut last_report = Instant::now();

    while started.elapsed() < session && !haptics.is_finished() {
        let snapshot = haptics.snapshot();

        if last_version > 0 && snapshot.version == last_version {
            warn!("haptic loop has not published since version {last_version}");
        }
        last_version = snapshot.version;

        if last_report.elapsed() >= Duration::from_secs(1) {
            info!(
                "[{}] score {} at {} pitch ({:.1}, {:.1}) {} pairs left",
                snapshot.state,
                snapshot.score,
                vec3_fmt(snapshot.avatar_position),
                snapshot.right_wing_pitch,
                snapshot.left_wing_pitch,
                snapshot.pairs_remaining
            );
            last_report = Instant::now();
        }

        thread::sleep(FRAME_TIME);
    }

    let last = haptics.snapshot();
    haptics.shutdown()?;

    info!(
        "session over: {} with {} points ({:?}), {} force commands sent",
        last.state,
        last.score,
        last.outcome,
        felt.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_hands_walk_to_the_configured_course() {
        assert_eq!(
            menu_presses(Difficulty::Easy),
            [(1.0, Button::Center), (1.5, Button::Center)]
        );
        assert_eq!(
            menu_presses(Difficulty::Hard),
            [
                (1.0, Button::Center),
                (1.5, Button::Right),
                (2.0, Button::Right),
                (2.5, Button::Center),
            ]
        );
    }

    #[test]
    fn unknown_course_stops_startup() {
        let err = AppError::from(Difficulty::try_from(9).unwrap_err());
        assert_eq!(
            err.to_string(),
            "unknown difficulty 9, expected 1 (easy), 2 (medium) or 3 (hard)"
        );
    }
}
