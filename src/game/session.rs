use bevy::{
    ecs::{
        query::With,
        resource::Resource,
        system::{Query, Res, ResMut, SystemParam},
    },
    log::info,
    time::Time,
};

use crate::{
    config::FlightConfig,
    flight::body::{Avatar, Body},
    game::{CameraView, MenuCursor},
    level::{ActiveLevel, Difficulty, LevelLibrary},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// Startup ramp that brings the actuators up to full boundary force before
/// flight begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Pending,
    Ramping,
    /// Ramp finished this tick; flight starts on the next one.
    Settled,
    Complete,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Session {
    pub difficulty: Option<Difficulty>,
    pub score: u32,
    pub outcome: Option<Outcome>,
    pub easing: Easing,
    /// Set once the front pair has been scored, cleared when it is removed.
    pub score_latched: bool,
    pub camera: CameraView,
    /// Game-clock time of the last integration step.
    pub last_tick: f64,
}

/// Level clock; stops while paused so gusts and recoil resume in phase.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct GameClock {
    elapsed: f64,
    running: bool,
}

impl GameClock {
    pub fn now(&self) -> f64 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Zeroes the clock, leaving it running or stopped.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, seconds: f64) {
        if self.running {
            self.elapsed += seconds;
        }
    }
}

pub fn advance_game_clock(time: Res<Time>, mut clock: ResMut<GameClock>) {
    clock.advance(time.delta_secs_f64());
}

/// Everything a level transition touches.
#[derive(SystemParam)]
pub struct LevelControl<'w, 's> {
    pub session: ResMut<'w, Session>,
    pub clock: ResMut<'w, GameClock>,
    pub active: ResMut<'w, ActiveLevel>,
    pub library: Res<'w, LevelLibrary>,
    pub config: Res<'w, FlightConfig>,
    pub avatar: Query<'w, 's, &'static mut Body, With<Avatar>>,
}

impl LevelControl<'_, '_> {
    fn reset_avatar(&mut self) {
        for mut body in &mut self.avatar {
            body.reset(&self.config.body);
        }
    }

    fn reset_run(&mut self) {
        self.reset_avatar();

        let session = &mut *self.session;
        session.score = 0;
        session.outcome = None;
        session.score_latched = false;
        session.camera = CameraView::first();
        session.last_tick = 0.0;

        self.clock.reset();
    }

    /// Fresh entry from the level select; always eases in.
    pub fn enter_level(&mut self, difficulty: Difficulty) {
        self.active.load(&self.library, difficulty);
        self.reset_run();

        self.session.difficulty = Some(difficulty);
        self.session.easing = Easing::Pending;
        self.clock.stop();

        info!("entering {:?} level", difficulty);
    }

    pub fn restart(&mut self) {
        let Some(difficulty) = self.session.difficulty else {
            return;
        };

        self.active.load(&self.library, difficulty);
        self.reset_run();

        if self.config.session.ease_on_restart {
            self.session.easing = Easing::Pending;
            self.clock.stop();
        } else {
            self.clock.start();
        }

        info!("restarting {:?} level", difficulty);
    }

    /// Leaves the level for the title menu.
    pub fn clear(&mut self) {
        self.active.clear();

        let session = &mut *self.session;
        session.difficulty = None;
        session.easing = Easing::Pending;
        session.score_latched = false;
        session.last_tick = 0.0;

        self.clock.reset();
        self.clock.stop();
    }
}
