use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bevy::{
    app::{App, Plugin, Update},
    ecs::{resource::Resource, schedule::IntoScheduleConfigs, system::Res},
};

use crate::{
    device::{
        DeviceFrame, ForceOutput,
        buttons::{ButtonEvents, ButtonLatches, update_button_events},
    },
    game::{
        menu::handle_buttons,
        play::{clear_force_output, hold_boundaries, play_tick},
        session::{GameClock, Session, advance_game_clock},
        snapshot::{SharedSnapshot, publish_snapshot},
    },
    level::ActiveLevel,
};

pub mod menu;
pub mod play;
pub mod session;
pub mod snapshot;

#[cfg(test)]
mod flow_tests;

/// Walks an enum's entries in display order, wrapping at both ends.
pub trait MenuCursor: Copy + PartialEq + 'static {
    const ENTRIES: &'static [Self];

    fn first() -> Self {
        Self::ENTRIES[0]
    }

    fn index(self) -> usize {
        Self::ENTRIES.iter().position(|&e| e == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        let len = Self::ENTRIES.len();
        Self::ENTRIES[(self.index() + 1) % len]
    }

    fn previous(self) -> Self {
        let len = Self::ENTRIES.len();
        Self::ENTRIES[(self.index() + len - 1) % len]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Start,
    Quit,
}

impl MenuCursor for MenuEntry {
    const ENTRIES: &'static [Self] = &[MenuEntry::Start, MenuEntry::Quit];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEntry {
    Easy,
    Medium,
    Hard,
    Back,
}

impl MenuCursor for LevelEntry {
    const ENTRIES: &'static [Self] = &[
        LevelEntry::Easy,
        LevelEntry::Medium,
        LevelEntry::Hard,
        LevelEntry::Back,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseEntry {
    Resume,
    Restart,
    Quit,
}

impl MenuCursor for PauseEntry {
    const ENTRIES: &'static [Self] = &[PauseEntry::Resume, PauseEntry::Restart, PauseEntry::Quit];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraView {
    #[default]
    ThirdPerson,
    FirstPerson,
    SideScroll,
}

impl MenuCursor for CameraView {
    const ENTRIES: &'static [Self] = &[
        CameraView::ThirdPerson,
        CameraView::FirstPerson,
        CameraView::SideScroll,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayPhase {
    Flying,
    /// Knocked back by a pipe; `started_at` is on the game clock.
    Recoil { started_at: f64 },
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub enum GameState {
    Menu(MenuEntry),
    LevelSelect(LevelEntry),
    Play(PlayPhase),
    Pause { entry: PauseEntry, resume: PlayPhase },
    GameOver,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::Menu(MenuEntry::first())
    }
}

impl GameState {
    pub fn is_playing(&self) -> bool {
        matches!(self, GameState::Play(_))
    }

    pub fn is_holding(&self) -> bool {
        matches!(self, GameState::Pause { .. } | GameState::GameOver)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameState::Menu(_) => "menu",
            GameState::LevelSelect(_) => "level select",
            GameState::Play(PlayPhase::Flying) => "play",
            GameState::Play(PlayPhase::Recoil { .. }) => "recoil",
            GameState::Pause { .. } => "pause",
            GameState::GameOver => "game over",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised by the menu's quit entry; the haptic loop polls it once per tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct ShutdownFlag(pub Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

fn in_play(state: Res<GameState>) -> bool {
    state.is_playing()
}

fn holding(state: Res<GameState>) -> bool {
    state.is_holding()
}

/// State machine, physics tick and snapshot publishing. Expects the
/// [`FlightPlugin`](crate::flight::FlightPlugin), a
/// [`LevelLibrary`](crate::level::LevelLibrary) and a [`DeviceFrame`] source.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameState>()
            .init_resource::<Session>()
            .init_resource::<GameClock>()
            .init_resource::<ActiveLevel>()
            .init_resource::<DeviceFrame>()
            .init_resource::<ForceOutput>()
            .init_resource::<ButtonLatches>()
            .init_resource::<ButtonEvents>()
            .init_resource::<ShutdownFlag>()
            .init_resource::<SharedSnapshot>()
            .add_systems(
                Update,
                (
                    advance_game_clock,
                    clear_force_output,
                    update_button_events,
                    handle_buttons,
                    play_tick.run_if(in_play),
                    hold_boundaries.run_if(holding),
                    publish_snapshot,
                )
                    .chain(),
            );
    }
}
