use bevy::{
    app::{App, Plugin, Startup},
    ecs::{
        resource::Resource,
        system::{Commands, Res},
    },
    log::info,
    prelude::{Deref, DerefMut},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    config::FlightConfig,
    flight::{
        body::{Avatar, Body},
        util::vec3_fmt,
    },
};

pub mod body;
pub mod collision;
pub mod integrator;
pub mod util;
pub mod wing;

/// Draws the turbulence period and amplitude every tick.
#[derive(Resource, Deref, DerefMut, Debug)]
pub struct TurbulenceRng(pub ChaCha8Rng);

pub struct FlightPlugin;

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlightConfig>()
            .add_systems(Startup, (seed_turbulence, spawn_avatar));
    }
}

fn seed_turbulence(mut commands: Commands, config: Res<FlightConfig>) {
    // offset from the level seed so gusts don't replay the course layout
    let seed = config.level.seed.rotate_left(32);
    commands.insert_resource(TurbulenceRng(ChaCha8Rng::seed_from_u64(seed)));
}

fn spawn_avatar(mut commands: Commands, config: Res<FlightConfig>) {
    let body = Body::from_config(&config.body);

    info!(
        "spawning avatar: mass {:.2} kg, launch velocity {}",
        body.mass,
        vec3_fmt(body.velocity)
    );

    commands.spawn((Avatar, body));
}
