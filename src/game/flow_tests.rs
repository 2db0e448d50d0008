use std::{collections::VecDeque, time::Duration};

use bevy::{app::App, math::DVec3, time::Time};

use crate::{
    config::FlightConfig,
    device::{DeviceFrame, DeviceSample, ForceOutput, buttons::Button},
    flight::{
        FlightPlugin,
        body::{Avatar, Body},
    },
    game::{
        GamePlugin, GameState, LevelEntry, MenuEntry, PauseEntry, PlayPhase, ShutdownFlag,
        session::{Easing, GameClock, Outcome, Session},
        snapshot::SharedSnapshot,
    },
    level::{ActiveLevel, Level, LevelLibrary, Pipe, PipePair, TurbulenceZone},
};

const DT: Duration = Duration::from_millis(10);

fn config() -> FlightConfig {
    let mut config = FlightConfig::default();
    config.body.initial_velocity = [-5.0, 0.0, 0.0];
    config.session.startup_seconds = 0.1;
    config
}

/// Gap far wider than the flight band, nothing to hit.
fn open_pair(x: f64) -> PipePair {
    PipePair {
        top: Pipe {
            radius: 0.03,
            height: 1.0,
            position: DVec3::new(x, 0.0, 10.0),
        },
        bottom: Pipe {
            radius: 0.03,
            height: 1.0,
            position: DVec3::new(x, 0.0, -20.0),
        },
    }
}

/// Bottom pipe covers the whole band.
fn wall_pair(x: f64) -> PipePair {
    PipePair {
        top: Pipe {
            radius: 0.03,
            height: 1.0,
            position: DVec3::new(x, 0.0, 10.0),
        },
        bottom: Pipe {
            radius: 0.03,
            height: 4.0,
            position: DVec3::new(x, 0.0, -2.0),
        },
    }
}

fn level(pairs: impl IntoIterator<Item = PipePair>) -> Level {
    Level {
        obstacles: pairs.into_iter().collect(),
        turbulence: VecDeque::new(),
    }
}

fn app(config: FlightConfig, level: Level) -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .insert_resource(config)
        .insert_resource(LevelLibrary {
            easy: level.clone(),
            medium: level.clone(),
            hard: level,
        })
        .add_plugins((FlightPlugin, GamePlugin));

    // startup systems
    app.update();
    app
}

fn tick_with(app: &mut App, frame: DeviceFrame) {
    app.insert_resource(frame);
    app.world_mut().resource_mut::<Time>().advance_by(DT);
    app.update();
}

fn tick(app: &mut App) {
    tick_with(app, DeviceFrame::default());
}

fn press(app: &mut App, button: Button) {
    let mut down = DeviceSample::default();
    down.switches[button as usize] = true;

    tick_with(app, DeviceFrame::dual(down, DeviceSample::default()));
    tick(app);
}

fn state(app: &App) -> GameState {
    *app.world().resource::<GameState>()
}

fn session(app: &App) -> Session {
    app.world().resource::<Session>().clone()
}

fn avatar(app: &mut App) -> Body {
    let mut query = app.world_mut().query_filtered::<&Body, bevy::ecs::query::With<Avatar>>();
    query
        .single(app.world())
        .expect("one avatar")
        .clone()
}

fn enter_easy(app: &mut App) {
    press(app, Button::Center);
    assert_eq!(state(app), GameState::LevelSelect(LevelEntry::Easy));
    press(app, Button::Center);
    assert_eq!(state(app), GameState::Play(PlayPhase::Flying));
}

fn settle(app: &mut App) {
    for _ in 0..100 {
        if session(app).easing == Easing::Complete {
            return;
        }
        tick(app);
    }
    panic!("startup easing never completed");
}

#[test]
fn scores_each_pair_once_and_wins() {
    let mut app = app(config(), level([open_pair(-1.0), open_pair(-3.0)]));
    enter_easy(&mut app);
    settle(&mut app);

    let mut scores = Vec::new();
    for _ in 0..300 {
        tick(&mut app);
        scores.push(session(&app).score);
        if state(&app) == GameState::GameOver {
            break;
        }
    }

    assert_eq!(state(&app), GameState::GameOver);
    assert_eq!(session(&app).outcome, Some(Outcome::Won));
    assert_eq!(session(&app).score, 40);

    // never skips or repeats an award
    assert!(scores.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 20));
    assert!(scores.iter().filter(|&&s| s == 20).count() > 1);
}

#[test]
fn collision_recoils_then_loses() {
    let mut app = app(config(), level([wall_pair(-0.5)]));
    enter_easy(&mut app);
    settle(&mut app);

    let mut recoil_started = None;
    for _ in 0..100 {
        tick(&mut app);
        if let GameState::Play(PlayPhase::Recoil { .. }) = state(&app) {
            recoil_started = Some(avatar(&mut app).position);
            break;
        }
    }
    let frozen_at = recoil_started.expect("avatar should hit the wall");
    assert_eq!(session(&app).score, 0);

    let mut pushed_back = false;
    for _ in 0..100 {
        tick(&mut app);
        if state(&app) == GameState::GameOver {
            break;
        }

        let output = *app.world().resource::<ForceOutput>();
        assert!(output.right.x >= 0.0);
        assert_eq!(output.right, output.left);
        assert_eq!(avatar(&mut app).position, frozen_at);
        pushed_back |= output.right.x > 0.0;
    }

    assert!(pushed_back);
    assert_eq!(state(&app), GameState::GameOver);
    assert_eq!(session(&app).outcome, Some(Outcome::Lost));
}

#[test]
fn pause_and_resume_do_not_ease_again() {
    let mut app = app(config(), level([open_pair(-50.0)]));
    enter_easy(&mut app);
    settle(&mut app);
    tick(&mut app);

    press(&mut app, Button::Center);
    assert!(matches!(
        state(&app),
        GameState::Pause {
            entry: PauseEntry::Resume,
            resume: PlayPhase::Flying
        }
    ));

    let paused_at = app.world().resource::<GameClock>().now();
    let position = avatar(&mut app).position;
    for _ in 0..5 {
        tick(&mut app);
    }
    assert_eq!(app.world().resource::<GameClock>().now(), paused_at);
    assert_eq!(avatar(&mut app).position, position);

    press(&mut app, Button::Center);
    assert_eq!(state(&app), GameState::Play(PlayPhase::Flying));
    tick(&mut app);

    assert_eq!(session(&app).easing, Easing::Complete);
    assert!(app.world().resource::<GameClock>().now() > paused_at);
}

#[test]
fn restart_keeps_easing_by_default() {
    let mut app = app(config(), level([open_pair(-1.0), open_pair(-50.0)]));
    enter_easy(&mut app);
    settle(&mut app);
    for _ in 0..60 {
        tick(&mut app);
    }
    assert_eq!(session(&app).score, 20);

    press(&mut app, Button::Front);

    let session = session(&app);
    assert_eq!(session.easing, Easing::Complete);
    assert_eq!(session.score, 0);
    assert_eq!(
        app.world().resource::<ActiveLevel>().level().map(|l| l.obstacles.len()),
        Some(2)
    );
    assert!(avatar(&mut app).position.x > -0.1);
}

#[test]
fn restart_can_ease_again() {
    let mut config = config();
    config.session.ease_on_restart = true;

    let mut app = app(config, level([open_pair(-50.0)]));
    enter_easy(&mut app);
    settle(&mut app);
    tick(&mut app);

    press(&mut app, Button::Center);
    press(&mut app, Button::Right);
    press(&mut app, Button::Center);

    assert_eq!(state(&app), GameState::Play(PlayPhase::Flying));
    assert_ne!(session(&app).easing, Easing::Complete);
    settle(&mut app);
}

#[test]
fn camera_cycles_while_playing() {
    let mut app = app(config(), level([open_pair(-50.0)]));
    enter_easy(&mut app);

    press(&mut app, Button::Right);
    assert_eq!(session(&app).camera, crate::game::CameraView::FirstPerson);
    press(&mut app, Button::Left);
    press(&mut app, Button::Left);
    assert_eq!(session(&app).camera, crate::game::CameraView::SideScroll);
    assert_eq!(state(&app), GameState::Play(PlayPhase::Flying));
}

#[test]
fn menu_quit_raises_shutdown() {
    let mut app = app(config(), level([open_pair(-50.0)]));

    press(&mut app, Button::Right);
    assert_eq!(state(&app), GameState::Menu(MenuEntry::Quit));
    assert!(!app.world().resource::<ShutdownFlag>().is_raised());

    press(&mut app, Button::Center);
    assert!(app.world().resource::<ShutdownFlag>().is_raised());
}

#[test]
fn level_select_back_returns_to_menu() {
    let mut app = app(config(), level([open_pair(-50.0)]));

    press(&mut app, Button::Center);
    press(&mut app, Button::Left);
    assert_eq!(state(&app), GameState::LevelSelect(LevelEntry::Back));

    press(&mut app, Button::Center);
    assert_eq!(state(&app), GameState::Menu(MenuEntry::Start));

    // the cursor starts over on the next visit
    press(&mut app, Button::Center);
    assert_eq!(state(&app), GameState::LevelSelect(LevelEntry::Easy));
}

#[test]
fn game_over_returns_to_menu_on_any_button() {
    let mut app = app(config(), level([open_pair(-0.2)]));
    enter_easy(&mut app);
    settle(&mut app);

    for _ in 0..100 {
        tick(&mut app);
        if state(&app) == GameState::GameOver {
            break;
        }
    }
    assert_eq!(state(&app), GameState::GameOver);

    press(&mut app, Button::Right);
    assert_eq!(state(&app), GameState::Menu(MenuEntry::Start));
    assert!(app.world().resource::<ActiveLevel>().level().is_none());
}

#[test]
fn actuator_output_follows_state() {
    let mut app = app(config(), level([open_pair(-50.0)]));
    let pushed = DeviceSample {
        position: DVec3::new(0.015, 0.0, 0.0),
        ..Default::default()
    };
    let frame = DeviceFrame::dual(pushed, pushed);

    // menus are slack
    tick_with(&mut app, frame);
    assert_eq!(*app.world().resource::<ForceOutput>(), ForceOutput::default());

    enter_easy(&mut app);

    // easing ramps up toward the full wall force
    let mut ramp = Vec::new();
    while session(&app).easing != Easing::Complete && ramp.len() < 50 {
        tick_with(&mut app, frame);
        ramp.push(app.world().resource::<ForceOutput>().right.x);
    }
    assert!(ramp.windows(2).all(|w| w[1] <= w[0] + 1e-9));
    assert!(ramp.iter().all(|&f| f >= -40.0 - 1e-9));
    assert!((ramp[ramp.len() - 1] + 40.0).abs() < 1e-9);

    // pause holds the boundary at full strength
    press(&mut app, Button::Center);
    tick_with(&mut app, frame);
    let output = *app.world().resource::<ForceOutput>();
    assert!((output.right.x + 40.0).abs() < 1e-9);
    assert!((output.left.x + 40.0).abs() < 1e-9);
}

#[test]
fn gusts_shake_the_hands_but_not_the_flight() {
    let calm = level([open_pair(-50.0)]);
    let mut gusty = calm.clone();
    gusty.turbulence.push_back(TurbulenceZone {
        begin_x: 1.0,
        end_x: -40.0,
        period_range: 50,
        amplitude_range: 5,
    });

    let mut calm = app(config(), calm);
    let mut gusty = app(config(), gusty);
    for app in [&mut calm, &mut gusty] {
        enter_easy(app);
        settle(app);
    }

    let mut felt_gust = false;
    for _ in 0..40 {
        tick(&mut calm);
        tick(&mut gusty);

        let (still, shaken) = (avatar(&mut calm), avatar(&mut gusty));
        assert_eq!(shaken.position, still.position);
        assert_eq!(shaken.velocity, still.velocity);
        assert_eq!(shaken.lift(), still.lift());

        let calm_output = *calm.world().resource::<ForceOutput>();
        let gusty_output = *gusty.world().resource::<ForceOutput>();
        let gust = gusty_output.right - calm_output.right;

        assert!((gusty_output.left - calm_output.left - gust).length() < 1e-9);
        assert!(gust.x.abs() < 1e-9 && gust.y.abs() < 1e-9);
        assert!(gust.z.abs() <= 5.0 + 1e-9);
        felt_gust |= gust.z.abs() > 1e-6;
    }

    assert!(felt_gust);
    assert_eq!(
        gusty.world().resource::<ActiveLevel>().level().map(|l| l.turbulence.len()),
        Some(1)
    );
}

#[test]
fn snapshot_tracks_the_session() {
    let mut app = app(config(), level([open_pair(-1.0), open_pair(-50.0)]));
    enter_easy(&mut app);
    settle(&mut app);
    tick(&mut app);

    let snapshot = app.world().resource::<SharedSnapshot>().latest();
    assert_eq!(snapshot.state, GameState::Play(PlayPhase::Flying));
    assert_eq!(snapshot.pairs_remaining, 2);
    assert_eq!(snapshot.next_pair, Some(open_pair(-1.0)));
    assert!(snapshot.avatar_position.x < 0.0);
    assert!(snapshot.version > 1);
}
