use std::{
    collections::VecDeque,
    f64::consts::TAU,
    sync::{Arc, Mutex},
    time::Instant,
};

use bevy::math::DVec3;

use crate::device::{DeviceSample, ForceCommand, HapticDevice, SWITCH_COUNT, buttons::Button};

/// Commands a [`ScriptedDevice`] has received, readable from another owner.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Arc<Mutex<Vec<ForceCommand>>>);

impl CommandLog {
    fn push(&self, command: ForceCommand) {
        let mut log = match self.0.lock() {
            Ok(log) => log,
            Err(poisoned) => poisoned.into_inner(),
        };
        log.push(command);
    }

    pub fn last(&self) -> Option<ForceCommand> {
        match self.0.lock() {
            Ok(log) => log.last().copied(),
            Err(poisoned) => poisoned.into_inner().last().copied(),
        }
    }

    pub fn len(&self) -> usize {
        match self.0.lock() {
            Ok(log) => log.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plays back a fixed queue of samples, then holds the last one.
#[derive(Debug, Default)]
pub struct ScriptedDevice {
    samples: VecDeque<DeviceSample>,
    current: DeviceSample,
    commands: CommandLog,
    open_fault: Option<String>,
    calibration_fault: Option<String>,
}

impl ScriptedDevice {
    pub fn new(samples: impl IntoIterator<Item = DeviceSample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn commands(&self) -> CommandLog {
        self.commands.clone()
    }

    pub fn fail_open(mut self, reason: impl Into<String>) -> Self {
        self.open_fault = Some(reason.into());
        self
    }

    pub fn fail_calibration(mut self, reason: impl Into<String>) -> Self {
        self.calibration_fault = Some(reason.into());
        self
    }
}

impl HapticDevice for ScriptedDevice {
    fn open(&mut self) -> Result<(), String> {
        self.open_fault.clone().map_or(Ok(()), Err)
    }

    fn calibrate(&mut self) -> Result<(), String> {
        self.calibration_fault.clone().map_or(Ok(()), Err)
    }

    fn sample(&mut self) -> DeviceSample {
        if let Some(next) = self.samples.pop_front() {
            self.current = next;
        }
        self.current
    }

    fn command(&mut self, command: ForceCommand) {
        self.commands.push(command);
    }
}

/// How long a scripted switch press stays down.
const PRESS_SECONDS: f64 = 0.1;

/// Simulated hand for the demo binary: flaps sinusoidally and taps switches
/// at scripted times to walk through the menus.
#[derive(Debug)]
pub struct Pilot {
    started: Instant,
    flap_hz: f64,
    amplitude: f64,
    presses: Vec<(f64, Button)>,
    commands: CommandLog,
}

impl Pilot {
    pub fn new(
        flap_hz: f64,
        amplitude: f64,
        presses: impl IntoIterator<Item = (f64, Button)>,
    ) -> Self {
        Self {
            started: Instant::now(),
            flap_hz,
            amplitude,
            presses: presses.into_iter().collect(),
            commands: CommandLog::default(),
        }
    }

    pub fn commands(&self) -> CommandLog {
        self.commands.clone()
    }

    pub fn sample_at(&self, t: f64) -> DeviceSample {
        let omega = TAU * self.flap_hz;

        let mut switches = [false; SWITCH_COUNT];
        for &(at, button) in &self.presses {
            if t >= at && t < at + PRESS_SECONDS {
                switches[button as usize] = true;
            }
        }

        DeviceSample {
            position: DVec3::new(0.0, 0.0, self.amplitude * (omega * t).sin()),
            velocity: DVec3::new(0.0, 0.0, self.amplitude * omega * (omega * t).cos()),
            switches,
        }
    }
}

impl HapticDevice for Pilot {
    fn sample(&mut self) -> DeviceSample {
        self.sample_at(self.started.elapsed().as_secs_f64())
    }

    fn command(&mut self, command: ForceCommand) {
        self.commands.push(command);
    }
}
