use std::path::Path;

use bevy::{ecs::resource::Resource, math::DVec3};
use ron::de::SpannedError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH: &str = "assets/wingbeat.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error while reading file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse RON config: {0}")]
    Ron(#[from] SpannedError),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Physical description of the bird and its two wings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub mass: f64,
    pub initial_velocity: [f64; 3],
    /// Rest offset of the right wing tip; the left wing is mirrored.
    pub wing_rest_offset: [f64; 3],
    pub wing_area: f64,
    pub drag_coefficient: f64,
    pub max_bound: f64,
    pub min_bound: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 5.0,
            initial_velocity: [-0.5, 0.0, 0.0],
            wing_rest_offset: [0.0, 1.0, 0.0],
            wing_area: 1500.0,
            drag_coefficient: 1.0,
            max_bound: 0.025,
            min_bound: -0.025,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: [f64; 3],
    /// Scaled by the mean wing area ratio, counteracts gravity for playability.
    pub updraft: [f64; 3],
    pub air_density: f64,
    pub ceiling: f64,
    pub floor: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 0.0, -9.81],
            updraft: [0.0, 0.0, 9.79],
            air_density: 0.038,
            ceiling: 0.15,
            floor: -0.15,
        }
    }
}

impl WorldConfig {
    pub fn gravity(&self) -> DVec3 {
        DVec3::from(self.gravity)
    }

    pub fn updraft(&self) -> DVec3 {
        DVec3::from(self.updraft)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoilConfig {
    pub amplitude: f64,
    pub frequency: f64,
    pub stiffness: f64,
}

impl Default for RecoilConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.015,
            frequency: 1.0,
            stiffness: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Length of the device easing ramp when a level is entered.
    pub startup_seconds: f64,
    /// Re-run the easing ramp when a level is restarted.
    pub ease_on_restart: bool,
    pub points_per_pair: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            startup_seconds: 2.0,
            ease_on_restart: false,
            points_per_pair: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub seed: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self { seed: 0x57_1A_6B_EA_7 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// How long the demo binary keeps the haptic loop alive.
    pub session_seconds: f64,
    /// Course the demo hands pick: 1 easy, 2 medium, 3 hard.
    pub difficulty: u8,
    pub log_filter: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            session_seconds: 60.0,
            difficulty: 1,
            log_filter: "wingbeat=info".to_string(),
        }
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub body: BodyConfig,
    pub world: WorldConfig,
    pub recoil: RecoilConfig,
    pub session: SessionConfig,
    pub level: LevelConfig,
    pub run: RunConfig,
}

impl FlightConfig {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: FlightConfig = ron::de::from_bytes(bytes)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Falls back to the built-in tuning when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let body = &self.body;

        if !(body.mass > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "body.mass must be positive, got {}",
                body.mass
            )));
        }
        if !(body.max_bound > body.min_bound) {
            return Err(ConfigError::Invalid(format!(
                "body.max_bound ({}) must exceed body.min_bound ({})",
                body.max_bound, body.min_bound
            )));
        }
        if DVec3::from(body.wing_rest_offset).length_squared() <= 0.0 {
            return Err(ConfigError::Invalid(
                "body.wing_rest_offset must not be zero".to_string(),
            ));
        }
        if !(self.world.ceiling > self.world.floor) {
            return Err(ConfigError::Invalid(format!(
                "world.ceiling ({}) must be above world.floor ({})",
                self.world.ceiling, self.world.floor
            )));
        }
        if self.session.startup_seconds < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "session.startup_seconds must not be negative, got {}",
                self.session.startup_seconds
            )));
        }
        if !(self.run.session_seconds.is_finite() && self.run.session_seconds >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "run.session_seconds must be a finite, non-negative duration, got {}",
                self.run.session_seconds
            )));
        }
        if !(self.recoil.frequency > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "recoil.frequency must be positive, got {}",
                self.recoil.frequency
            )));
        }

        Ok(())
    }
}
