use bevy::math::DVec3;

use crate::config::WorldConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightEnvironment {
    pub gravity: DVec3,
    pub updraft: DVec3,
    pub ceiling: f64,
    pub floor: f64,
}

impl From<&WorldConfig> for FlightEnvironment {
    fn from(world: &WorldConfig) -> Self {
        Self {
            gravity: world.gravity(),
            updraft: world.updraft(),
            ceiling: world.ceiling,
            floor: world.floor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Ceiling,
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightStep {
    pub position: DVec3,
    pub velocity: DVec3,
    pub acceleration: DVec3,
    pub clamped: Option<Band>,
}

pub fn acceleration(force: DVec3, mass: f64, area_ratio: f64, env: &FlightEnvironment) -> DVec3 {
    force / mass + env.gravity + env.updraft * area_ratio
}

/// Semi-implicit Euler step, then the ceiling/floor band acts as an inelastic wall.
pub fn step(
    position: DVec3,
    velocity: DVec3,
    force: DVec3,
    mass: f64,
    area_ratio: f64,
    env: &FlightEnvironment,
    dt: f64,
) -> FlightStep {
    let acceleration = acceleration(force, mass, area_ratio, env);

    let new_velocity = velocity + acceleration * dt;
    let new_position = position + new_velocity * dt;

    if new_position.z < env.ceiling && new_position.z > env.floor {
        return FlightStep {
            position: new_position,
            velocity: new_velocity,
            acceleration,
            clamped: None,
        };
    }

    let (band, z) = if new_position.z >= env.ceiling {
        (Band::Ceiling, env.ceiling)
    } else {
        (Band::Floor, env.floor)
    };

    FlightStep {
        position: DVec3::new(new_position.x, 0.0, z),
        velocity: DVec3::new(new_velocity.x, 0.0, 0.0),
        acceleration,
        clamped: Some(band),
    }
}
