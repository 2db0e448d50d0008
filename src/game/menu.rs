use bevy::{
    ecs::system::{Res, ResMut},
    log::{debug, info},
};

use crate::{
    device::buttons::{Button, ButtonEvents},
    game::{
        GameState, LevelEntry, MenuCursor, MenuEntry, PauseEntry, PlayPhase, ShutdownFlag,
        session::LevelControl,
    },
    level::Difficulty,
};

impl LevelEntry {
    pub fn difficulty(self) -> Option<Difficulty> {
        match self {
            LevelEntry::Easy => Some(Difficulty::Easy),
            LevelEntry::Medium => Some(Difficulty::Medium),
            LevelEntry::Hard => Some(Difficulty::Hard),
            LevelEntry::Back => None,
        }
    }
}

impl From<Difficulty> for LevelEntry {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => LevelEntry::Easy,
            Difficulty::Medium => LevelEntry::Medium,
            Difficulty::Hard => LevelEntry::Hard,
        }
    }
}

/// One transition per tick at most; centre wins over left, front and right
/// when several switches are let go together.
pub fn handle_buttons(
    events: Res<ButtonEvents>,
    shutdown: Res<ShutdownFlag>,
    mut state: ResMut<GameState>,
    mut level: LevelControl,
) {
    let Some(button) = events.first() else {
        return;
    };

    let next = match *state {
        GameState::Menu(entry) => match button {
            Button::Center => match entry {
                MenuEntry::Start => Some(GameState::LevelSelect(LevelEntry::first())),
                MenuEntry::Quit => {
                    info!("quit selected, shutting down");
                    shutdown.raise();
                    None
                }
            },
            Button::Left => Some(GameState::Menu(entry.previous())),
            Button::Right => Some(GameState::Menu(entry.next())),
            Button::Front => None,
        },
        GameState::LevelSelect(entry) => match button {
            Button::Center => match entry.difficulty() {
                Some(difficulty) => {
                    level.enter_level(difficulty);
                    Some(GameState::Play(PlayPhase::Flying))
                }
                None => Some(GameState::Menu(MenuEntry::first())),
            },
            Button::Left => Some(GameState::LevelSelect(entry.previous())),
            Button::Right => Some(GameState::LevelSelect(entry.next())),
            Button::Front => None,
        },
        GameState::Play(phase) => match button {
            Button::Center => {
                level.clock.stop();
                Some(GameState::Pause {
                    entry: PauseEntry::first(),
                    resume: phase,
                })
            }
            Button::Front => {
                level.restart();
                Some(GameState::Play(PlayPhase::Flying))
            }
            Button::Left => {
                level.session.camera = level.session.camera.previous();
                debug!("camera: {:?}", level.session.camera);
                None
            }
            Button::Right => {
                level.session.camera = level.session.camera.next();
                debug!("camera: {:?}", level.session.camera);
                None
            }
        },
        GameState::Pause { entry, resume } => match button {
            Button::Center => match entry {
                PauseEntry::Resume => {
                    level.clock.start();
                    Some(GameState::Play(resume))
                }
                PauseEntry::Restart => {
                    level.restart();
                    Some(GameState::Play(PlayPhase::Flying))
                }
                PauseEntry::Quit => {
                    level.clear();
                    Some(GameState::Menu(MenuEntry::first()))
                }
            },
            Button::Left => Some(GameState::Pause {
                entry: entry.previous(),
                resume,
            }),
            Button::Right => Some(GameState::Pause {
                entry: entry.next(),
                resume,
            }),
            Button::Front => None,
        },
        GameState::GameOver => {
            level.clear();
            Some(GameState::Menu(MenuEntry::first()))
        }
    };

    if let Some(next) = next {
        if next.label() != state.label() {
            info!("game state: {} -> {}", *state, next);
        }
        *state = next;
    }
}
