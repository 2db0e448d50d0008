use std::f64::consts::TAU;

use bevy::{
    ecs::{
        query::With,
        system::{Res, ResMut, Single},
    },
    log::{debug, info, warn},
    math::DVec3,
};

use crate::{
    config::{FlightConfig, RecoilConfig},
    device::{DeviceFrame, ForceOutput},
    flight::{
        TurbulenceRng,
        body::{Avatar, Body},
        integrator::FlightEnvironment,
        util::vec3_fmt,
    },
    game::{
        GameState, PlayPhase,
        session::{Easing, GameClock, Outcome, Session},
    },
    level::ActiveLevel,
};

fn wing_output(body: &Body) -> ForceOutput {
    ForceOutput {
        right: body.right_wing.net_force,
        left: body.left_wing.net_force,
    }
}

/// Target knock-back displacement `elapsed` seconds into a recoil.
pub fn recoil_target(recoil: &RecoilConfig, elapsed: f64) -> f64 {
    recoil.amplitude * (TAU * recoil.frequency * elapsed).sin()
}

pub fn clear_force_output(mut output: ResMut<ForceOutput>) {
    output.clear();
}

/// One tick of play: startup easing, then forces, turbulence, integration,
/// collision and scoring, and finally the actuator output for the phase.
pub fn play_tick(
    frame: Res<DeviceFrame>,
    config: Res<FlightConfig>,
    mut state: ResMut<GameState>,
    mut session: ResMut<Session>,
    mut clock: ResMut<GameClock>,
    mut active: ResMut<ActiveLevel>,
    mut rng: ResMut<TurbulenceRng>,
    mut output: ResMut<ForceOutput>,
    mut avatar: Single<&mut Body, With<Avatar>>,
) {
    let GameState::Play(mut phase) = *state else {
        return;
    };
    let Some(level) = active.level_mut() else {
        warn!("playing without a level loaded");
        return;
    };

    let (right, left) = (frame.right, frame.left);
    let total = config.session.startup_seconds;

    match session.easing {
        Easing::Pending => {
            clock.reset();
            clock.start();
            session.easing = Easing::Ramping;

            avatar.controller_startup(right.position, left.position, 0.0, total);
            *output = wing_output(&avatar);
            return;
        }
        Easing::Ramping => {
            let t = clock.now();
            avatar.controller_startup(right.position, left.position, t, total);
            *output = wing_output(&avatar);

            if t >= total {
                session.easing = Easing::Settled;
            }
            return;
        }
        Easing::Settled => {
            avatar.controller_startup(right.position, left.position, total, total);
            *output = wing_output(&avatar);

            clock.reset();
            session.score_latched = false;
            session.last_tick = 0.0;
            session.easing = Easing::Complete;

            debug!("startup easing complete");
            return;
        }
        Easing::Complete => {}
    }

    let now = clock.now();

    avatar.update_forces(
        right.position,
        left.position,
        right.velocity,
        left.velocity,
        config.world.air_density,
    );

    if let Some(zone) = level.turbulence_at(avatar.position.x) {
        avatar.apply_turbulence(now, zone.period_range, zone.amplitude_range, &mut rng.0);
    }

    if matches!(phase, PlayPhase::Flying) {
        let dt = (now - session.last_tick).max(0.0);
        let step = avatar.integrate(&FlightEnvironment::from(&config.world), dt);

        if let Some(band) = step.clamped {
            debug!("pinned to {:?} at {}", band, vec3_fmt(step.position));
        }
    }
    session.last_tick = now;

    let Some(pair) = level.next_pair().copied() else {
        session.outcome = Some(Outcome::Won);
        *state = GameState::GameOver;

        info!("course cleared with {} points", session.score);
        return;
    };

    if matches!(phase, PlayPhase::Flying) {
        if avatar.collision_detector(&pair.top) || avatar.collision_detector(&pair.bottom) {
            info!("hit a pipe at {}", vec3_fmt(avatar.position));

            phase = PlayPhase::Recoil { started_at: now };
            *state = GameState::Play(phase);
        } else {
            let x = avatar.position.x;

            if !session.score_latched && pair.reached(x) {
                session.score += config.session.points_per_pair;
                session.score_latched = true;
                debug!("score: {}", session.score);
            }
            if pair.passed(x) {
                level.pop_pair();
                session.score_latched = false;
            }
        }
    }

    match phase {
        PlayPhase::Flying => *output = wing_output(&avatar),
        PlayPhase::Recoil { started_at } => {
            let elapsed = now - started_at;
            let target = recoil_target(&config.recoil, elapsed);

            // positive lobe done, the bird has been knocked out
            if elapsed > 0.0 && target <= 0.0 {
                session.outcome = Some(Outcome::Lost);
                *state = GameState::GameOver;

                info!("crashed with {} points", session.score);
                return;
            }

            *output = ForceOutput::both(DVec3::X * config.recoil.stiffness * target);
        }
    }
}

/// Pause and game over keep the hands inside the safe envelope at full strength.
pub fn hold_boundaries(
    frame: Res<DeviceFrame>,
    mut output: ResMut<ForceOutput>,
    mut avatar: Single<&mut Body, With<Avatar>>,
) {
    avatar.controller_startup(frame.right.position, frame.left.position, 1.0, 1.0);
    *output = wing_output(&avatar);
}
