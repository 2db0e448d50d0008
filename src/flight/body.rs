use std::f64::consts::PI;

use bevy::{ecs::component::Component, math::DVec3};
use rand::Rng;

use crate::{
    config::BodyConfig,
    flight::{
        collision::circle_hits_pipe,
        integrator::{self, FlightEnvironment, FlightStep},
        util::{
            AVATAR_RADIUS, BACK_WALL, BOTTOM_WALL, BOUNDARY_STIFFNESS, FORWARD_WALL, TOP_WALL,
            mean_ratio,
        },
        wing::Wing,
    },
    level::Pipe,
};

/// Marks the entity carrying the player's [`Body`].
#[derive(Component, Debug)]
pub struct Avatar;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Body {
    pub mass: f64,
    pub velocity: DVec3,
    pub position: DVec3,

    pub right_wing: Wing,
    pub left_wing: Wing,
}

impl Body {
    pub fn new(
        velocity: DVec3,
        wing_rest_position: DVec3,
        mass: f64,
        area: f64,
        drag_coefficient: f64,
        max_bound: f64,
        min_bound: f64,
    ) -> Self {
        Self {
            mass,
            velocity,
            position: DVec3::ZERO,
            right_wing: Wing::new(wing_rest_position, area, drag_coefficient, max_bound, min_bound),
            left_wing: Wing::new(-wing_rest_position, area, drag_coefficient, max_bound, min_bound),
        }
    }

    pub fn from_config(config: &BodyConfig) -> Self {
        Self::new(
            DVec3::from(config.initial_velocity),
            DVec3::from(config.wing_rest_offset),
            config.mass,
            config.wing_area,
            config.drag_coefficient,
            config.max_bound,
            config.min_bound,
        )
    }

    /// Back to the spawn pose with the configured launch velocity.
    pub fn reset(&mut self, config: &BodyConfig) {
        *self = Self::from_config(config);
    }

    /// Soft spring envelope around the wing's natural length plus the fixed
    /// walls of the device frame. Only the actuator feels these.
    pub fn calculate_bounds(wing: &mut Wing, device_position: DVec3) {
        let k = BOUNDARY_STIFFNESS;

        let natural = wing.natural_length();
        let max_length = natural + wing.max_bound;
        let min_length = natural + wing.min_bound;

        // measured from the body origin, which cancels out
        let wing_vector = wing.rest_position + device_position;
        let length = wing_vector.length();
        wing.current_length = length;

        let direction = wing_vector.normalize_or_zero();
        let mut force = DVec3::ZERO;

        if length < min_length {
            force += -k * (length - min_length) * direction;
        } else if length > max_length {
            force += -k * (length - max_length) * direction;
        }

        force += device_walls(device_position);

        wing.net_force += force;
    }

    /// Boundary force only, faded in over `total` seconds.
    pub fn controller_startup(
        &mut self,
        device_right: DVec3,
        device_left: DVec3,
        t: f64,
        total: f64,
    ) {
        let scale = if total > 0.0 {
            (t / total).clamp(0.0, 1.0)
        } else {
            1.0
        };

        self.right_wing.net_force = DVec3::ZERO;
        Self::calculate_bounds(&mut self.right_wing, device_right);
        self.right_wing.net_force *= scale;

        self.left_wing.net_force = DVec3::ZERO;
        Self::calculate_bounds(&mut self.left_wing, device_left);
        self.left_wing.net_force *= scale;
    }

    pub fn update_forces(
        &mut self,
        device_right: DVec3,
        device_left: DVec3,
        velocity_right: DVec3,
        velocity_left: DVec3,
        air_density: f64,
    ) {
        self.right_wing.reset_forces();
        self.left_wing.reset_forces();

        // bounds first, lift reads the length they measure
        Self::calculate_bounds(&mut self.right_wing, device_right);
        Self::calculate_bounds(&mut self.left_wing, device_left);

        self.right_wing.calculate_lift(air_density, velocity_right);
        self.left_wing.calculate_lift(air_density, velocity_left);
    }

    /// Sinusoidal gust felt through the actuators; the avatar's lift is untouched.
    pub fn apply_turbulence(
        &mut self,
        now: f64,
        period_range: u32,
        amplitude_range: u32,
        rng: &mut impl Rng,
    ) -> DVec3 {
        let period = rng.random_range(1..=period_range.max(1)) as f64;
        let amplitude = rng.random_range(1..=amplitude_range.max(1)) as f64;

        let turbulence = DVec3::Z * amplitude * (period * PI * now).sin();

        self.right_wing.net_force += turbulence;
        self.left_wing.net_force += turbulence;

        turbulence
    }

    pub fn collision_detector(&self, pipe: &Pipe) -> bool {
        circle_hits_pipe(self.position, AVATAR_RADIUS, pipe)
    }

    pub fn lift(&self) -> DVec3 {
        self.right_wing.lift_force + self.left_wing.lift_force
    }

    pub fn area_ratio(&self) -> f64 {
        mean_ratio(self.right_wing.area_ratio, self.left_wing.area_ratio)
    }

    pub fn integrate(&mut self, env: &FlightEnvironment, dt: f64) -> FlightStep {
        let step = integrator::step(
            self.position,
            self.velocity,
            self.lift(),
            self.mass,
            self.area_ratio(),
            env,
            dt,
        );

        self.position = step.position;
        self.velocity = step.velocity;

        step
    }
}

fn device_walls(device_position: DVec3) -> DVec3 {
    let k = BOUNDARY_STIFFNESS;
    let mut force = DVec3::ZERO;

    if device_position.x < FORWARD_WALL {
        force.x += -k * (device_position.x - FORWARD_WALL);
    } else if device_position.x > BACK_WALL {
        force.x += -k * (device_position.x - BACK_WALL);
    }

    // the vertical wall is half as stiff
    if device_position.z > TOP_WALL {
        force.z += -(k / 2.0) * (device_position.z - TOP_WALL);
    } else if device_position.z < BOTTOM_WALL {
        force.z += -(k / 2.0) * (device_position.z - BOTTOM_WALL);
    }

    force
}
