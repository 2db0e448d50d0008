use bevy::math::DVec3;

use crate::flight::util::{
    LIFT_EPSILON, MAX_AREA_RATIO, MIN_AREA_RATIO, WING_ANGLE_MULTIPLIER, dynamic_pressure,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Wing {
    pub rest_position: DVec3,
    pub current_length: f64,

    pub area: f64, // m^2
    pub area_ratio: f64,
    pub drag_coefficient: f64,

    pub max_bound: f64,
    pub min_bound: f64,

    /// Everything the actuator should feel, boundary springs included.
    pub net_force: DVec3,
    /// Aerodynamic force only, drives the avatar and the animation.
    pub lift_force: DVec3,
}

impl Wing {
    pub fn new(
        rest_position: DVec3,
        area: f64,
        drag_coefficient: f64,
        max_bound: f64,
        min_bound: f64,
    ) -> Self {
        Self {
            rest_position,
            current_length: rest_position.length(),
            area,
            area_ratio: MIN_AREA_RATIO,
            drag_coefficient,
            max_bound,
            min_bound,
            net_force: DVec3::ZERO,
            lift_force: DVec3::ZERO,
        }
    }

    #[inline]
    pub fn natural_length(&self) -> f64 {
        self.rest_position.length()
    }

    pub fn reset_forces(&mut self) {
        self.net_force = DVec3::ZERO;
        self.lift_force = DVec3::ZERO;
    }

    /// Fraction of the wing that is spread, never below 95% and never past fully open.
    pub fn extension_ratio(&self) -> f64 {
        let ratio = (self.current_length - self.natural_length() - self.min_bound)
            / (self.max_bound - self.min_bound);

        ratio.clamp(MIN_AREA_RATIO, MAX_AREA_RATIO)
    }

    pub fn calculate_lift(&mut self, air_density: f64, velocity: DVec3) {
        self.area_ratio = self.extension_ratio();

        let effective_area = self.area * self.area_ratio;

        // only a downward stroke past the noise floor lifts
        if velocity.z < -LIFT_EPSILON {
            let lift = lift_force(air_density, self.drag_coefficient, effective_area, velocity.z);

            self.lift_force += lift;
            self.net_force += lift;
        }
    }
}

#[inline]
pub fn lift_force(air_density: f64, drag_coefficient: f64, area: f64, stroke_speed: f64) -> DVec3 {
    DVec3::Z * dynamic_pressure(air_density, stroke_speed) * drag_coefficient * area
}

/// Rendered wing pitch for a device offset, mirrored by the caller for the left wing.
pub fn wing_pitch(rest_position: DVec3, device_position: DVec3) -> f64 {
    let resultant = rest_position + device_position;
    if resultant.length_squared() <= f64::EPSILON || rest_position.length_squared() <= f64::EPSILON {
        return 0.0;
    }

    let angle = resultant.angle_between(rest_position);
    let signed = if device_position.z < 0.0 { -angle } else { angle };

    signed * WING_ANGLE_MULTIPLIER
}
