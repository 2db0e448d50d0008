use std::{
    sync::mpsc,
    thread::{self, JoinHandle},
};

use bevy::{
    MinimalPlugins,
    app::App,
    log::{Level, LogPlugin, error, info},
    utils::default,
};

use crate::{
    AppError,
    config::FlightConfig,
    device::{DeviceIoPlugin, Devices, HapticDevice},
    flight::FlightPlugin,
    game::{
        GamePlugin, ShutdownFlag,
        snapshot::{FlightSnapshot, SharedSnapshot},
    },
    level::LevelLibrary,
};

/// Headless app ticked by hand from the haptic thread. A [`Devices`]
/// resource must be inserted before the first update.
pub fn build_app(
    config: FlightConfig,
    library: LevelLibrary,
    shutdown: ShutdownFlag,
    snapshot: SharedSnapshot,
) -> App {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        LogPlugin {
            level: Level::INFO,
            filter: config.run.log_filter.clone(),
            ..default()
        },
    ))
    .insert_resource(config)
    .insert_resource(library)
    .insert_resource(shutdown)
    .insert_resource(snapshot)
    .add_plugins((DeviceIoPlugin, FlightPlugin, GamePlugin));

    // no runner: the loop below calls update() itself
    app.finish();
    app.cleanup();

    app
}

pub struct HapticLoop {
    handle: JoinHandle<()>,
    shutdown: ShutdownFlag,
    snapshot: SharedSnapshot,
}

impl HapticLoop {
    /// Starts the loop and opens `connected` on it. Returns once the devices
    /// are ready, or with the error that stopped them.
    pub fn spawn(
        config: FlightConfig,
        library: LevelLibrary,
        connected: Vec<Box<dyn HapticDevice>>,
    ) -> Result<Self, AppError> {
        let shutdown = ShutdownFlag::default();
        let snapshot = SharedSnapshot::default();

        let flag = shutdown.clone();
        let shared = snapshot.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("haptics".to_string())
            .spawn(move || {
                // logging comes up with the app, devices after it
                let mut app = build_app(config, library, flag.clone(), shared);

                match Devices::new(connected) {
                    Ok(devices) => {
                        app.insert_resource(devices);
                        ready_tx.send(Ok(())).ok();
                    }
                    Err(err) => {
                        error!("haptic devices unavailable: {err}");
                        ready_tx.send(Err(err)).ok();
                        return;
                    }
                }
                info!("haptic loop running");

                let mut ticks: u64 = 0;
                while !flag.is_raised() {
                    app.update();
                    ticks += 1;
                }

                if let Some(mut devices) = app.world_mut().get_resource_mut::<Devices>() {
                    devices.release();
                }
                info!("haptic loop stopped after {ticks} ticks");
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                handle.join().ok();
                return Err(err.into());
            }
            // hung up without reporting
            Err(_) => {
                handle.join().ok();
                return Err(AppError::HapticThreadPanicked);
            }
        }

        Ok(Self {
            handle,
            shutdown,
            snapshot,
        })
    }

    pub fn snapshot(&self) -> FlightSnapshot {
        self.snapshot.latest()
    }

    /// The loop also stops on its own when the menu's quit entry is chosen.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn shutdown(self) -> Result<(), AppError> {
        self.shutdown.raise();
        self.handle
            .join()
            .map_err(|_| AppError::HapticThreadPanicked)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::{
        config::WorldConfig,
        device::{DeviceError, DeviceSample, ForceCommand, scripted::ScriptedDevice},
    };

    #[test]
    fn loop_publishes_and_releases_devices() {
        let device = ScriptedDevice::new([DeviceSample::default()]);
        let commands = device.commands();

        let haptics = HapticLoop::spawn(
            FlightConfig::default(),
            LevelLibrary::generate(1, &WorldConfig::default()),
            vec![Box::new(device) as Box<dyn HapticDevice>],
        )
        .expect("haptic thread should start");

        let deadline = Instant::now() + Duration::from_secs(10);
        while haptics.snapshot().version < 10 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        let snapshot = haptics.snapshot();
        assert!(snapshot.version >= 10);
        assert_eq!(snapshot.state.label(), "menu");

        haptics.shutdown().expect("haptic thread should join");
        assert_eq!(commands.last(), Some(ForceCommand::default()));
    }

    #[test]
    fn failed_bring_up_is_reported_to_the_caller() {
        let device = ScriptedDevice::default().fail_calibration("encoder fault");
        let commands = device.commands();

        let result = HapticLoop::spawn(
            FlightConfig::default(),
            LevelLibrary::generate(1, &WorldConfig::default()),
            vec![Box::new(device) as Box<dyn HapticDevice>],
        );

        assert!(matches!(
            result,
            Err(AppError::Device(DeviceError::Calibrate { index: 0, .. }))
        ));
        assert!(commands.is_empty());
    }
}
