use bevy::math::DVec3;

/// Spring stiffness of the wing-extension envelope and the forward/back walls (N/m).
pub const BOUNDARY_STIFFNESS: f64 = 4000.0;

// device-frame walls, metres from the device origin
pub const FORWARD_WALL: f64 = -0.005;
pub const BACK_WALL: f64 = 0.005;
pub const TOP_WALL: f64 = 0.037;
pub const BOTTOM_WALL: f64 = -0.037;

pub const AVATAR_RADIUS: f64 = 0.025;

/// Downward stroke speed the sensed hand has to exceed before a wing lifts.
pub const LIFT_EPSILON: f64 = 0.05;

pub const MIN_AREA_RATIO: f64 = 0.95;
pub const MAX_AREA_RATIO: f64 = 1.0;

pub const WING_ANGLE_MULTIPLIER: f64 = 20.0;

#[inline]
pub fn dynamic_pressure(air_density: f64, speed: f64) -> f64 {
    0.5 * air_density * speed * speed
}

/// Mean of two area ratios, used to scale the playability updraft.
#[inline]
pub fn mean_ratio(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

pub fn vec3_fmt(v: DVec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}
