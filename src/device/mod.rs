use bevy::{
    app::{App, Plugin, PostUpdate, PreUpdate},
    ecs::{
        resource::Resource,
        system::{Res, ResMut},
    },
    log::{info, warn},
    math::DVec3,
};
use thiserror::Error;

pub mod buttons;
pub mod scripted;

pub const SWITCH_COUNT: usize = 4;
pub const MAX_DEVICES: usize = 2;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no haptic device connected")]
    NotFound,

    #[error("found {found} haptic devices, at most {max} are supported")]
    TooMany { found: usize, max: usize },

    #[error("failed to open haptic device {index}: {reason}")]
    Open { index: usize, reason: String },

    #[error("failed to calibrate haptic device {index}: {reason}")]
    Calibrate { index: usize, reason: String },
}

/// One reading of an actuator: end-effector position and velocity in the
/// device frame, plus its user switches.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceSample {
    pub position: DVec3,
    pub velocity: DVec3,
    pub switches: [bool; SWITCH_COUNT],
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceCommand {
    pub force: DVec3,
    pub torque: DVec3,
    pub gripper_force: f64,
}

impl ForceCommand {
    pub fn force(force: DVec3) -> Self {
        Self {
            force,
            ..Default::default()
        }
    }
}

/// Transport to a physical (or simulated) force-feedback device. Both calls
/// are expected to return in bounded time; the haptic loop never waits on
/// anything else.
pub trait HapticDevice: Send + Sync {
    /// Brings the device up. Called once, before anything else; failures
    /// carry the driver's reason.
    fn open(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Zeroes the encoders with the handle at rest.
    fn calibrate(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn sample(&mut self) -> DeviceSample;
    fn command(&mut self, command: ForceCommand);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceLayout {
    /// One actuator drives both wings.
    Single,
    #[default]
    Dual,
}

/// Connected actuators. The first device is always the right wing.
#[derive(Resource)]
pub struct Devices {
    pub right: Box<dyn HapticDevice>,
    pub left: Option<Box<dyn HapticDevice>>,
}

impl Devices {
    /// Opens and calibrates every connected device, in order.
    pub fn new(mut devices: Vec<Box<dyn HapticDevice>>) -> Result<Self, DeviceError> {
        let found = devices.len();
        if found > MAX_DEVICES {
            return Err(DeviceError::TooMany {
                found,
                max: MAX_DEVICES,
            });
        }

        for (index, device) in devices.iter_mut().enumerate() {
            device
                .open()
                .map_err(|reason| DeviceError::Open { index, reason })?;
            device
                .calibrate()
                .map_err(|reason| DeviceError::Calibrate { index, reason })?;
        }

        let mut devices = devices.into_iter();
        let right = devices.next().ok_or(DeviceError::NotFound)?;
        let left = devices.next();

        if left.is_none() {
            warn!("only one haptic device connected, both wings share it");
        }
        info!("{found} haptic device(s) ready");

        Ok(Self { right, left })
    }

    /// Leaves every actuator slack.
    pub fn release(&mut self) {
        self.right.command(ForceCommand::default());
        if let Some(left) = self.left.as_mut() {
            left.command(ForceCommand::default());
        }
    }
}

/// Samples for this tick. In the single layout both wings read the same
/// actuator.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceFrame {
    pub right: DeviceSample,
    pub left: DeviceSample,
    pub layout: DeviceLayout,
}

impl DeviceFrame {
    pub fn dual(right: DeviceSample, left: DeviceSample) -> Self {
        Self {
            right,
            left,
            layout: DeviceLayout::Dual,
        }
    }

    pub fn single(sample: DeviceSample) -> Self {
        Self {
            right: sample,
            left: sample,
            layout: DeviceLayout::Single,
        }
    }
}

/// Per-wing force the game wants the actuators to render this tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceOutput {
    pub right: DVec3,
    pub left: DVec3,
}

impl ForceOutput {
    pub fn both(force: DVec3) -> Self {
        Self {
            right: force,
            left: force,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// What a single shared actuator should render.
    pub fn mean(&self) -> DVec3 {
        (self.right + self.left) / 2.0
    }
}

pub fn read_devices(mut devices: ResMut<Devices>, mut frame: ResMut<DeviceFrame>) {
    let right = devices.right.sample();

    *frame = match devices.left.as_mut() {
        Some(left) => DeviceFrame::dual(right, left.sample()),
        None => DeviceFrame::single(right),
    };
}

pub fn write_devices(mut devices: ResMut<Devices>, output: Res<ForceOutput>) {
    match devices.left.as_mut() {
        Some(left) => {
            left.command(ForceCommand::force(output.left));
            devices.right.command(ForceCommand::force(output.right));
        }
        None => devices.right.command(ForceCommand::force(output.mean())),
    }
}

/// Wires device sampling before the game tick and force commands after it.
/// Needs a [`Devices`] resource.
pub struct DeviceIoPlugin;

impl Plugin for DeviceIoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DeviceFrame>()
            .init_resource::<ForceOutput>()
            .add_systems(PreUpdate, read_devices)
            .add_systems(PostUpdate, write_devices);
    }
}
