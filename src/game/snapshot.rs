use std::sync::{Arc, Mutex, TryLockError};

use bevy::{
    ecs::{
        query::With,
        resource::Resource,
        system::{Local, Query, Res},
    },
    math::DVec3,
};

use crate::{
    device::DeviceFrame,
    flight::{
        body::{Avatar, Body},
        wing::wing_pitch,
    },
    game::{CameraView, GameState, session::{GameClock, Outcome, Session}},
    level::{ActiveLevel, PipePair},
};

/// What the render side needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightSnapshot {
    /// Bumped on every publish.
    pub version: u64,
    pub state: GameState,
    pub score: u32,
    pub outcome: Option<Outcome>,
    pub elapsed: f64,

    pub avatar_position: DVec3,
    pub avatar_velocity: DVec3,
    pub right_wing_pitch: f64,
    pub left_wing_pitch: f64,
    pub camera: CameraView,

    pub pairs_remaining: usize,
    pub next_pair: Option<PipePair>,
}

/// Latest snapshot, written by the haptic thread and copied out by readers.
#[derive(Resource, Debug, Clone, Default)]
pub struct SharedSnapshot(Arc<Mutex<FlightSnapshot>>);

impl SharedSnapshot {
    /// Never blocks; returns `false` if a reader held the slot and this
    /// snapshot was dropped.
    pub fn publish(&self, snapshot: FlightSnapshot) -> bool {
        match self.0.try_lock() {
            Ok(mut slot) => {
                *slot = snapshot;
                true
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                *poisoned.into_inner() = snapshot;
                true
            }
            Err(TryLockError::WouldBlock) => false,
        }
    }

    pub fn latest(&self) -> FlightSnapshot {
        match self.0.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

pub fn publish_snapshot(
    mut version: Local<u64>,
    shared: Res<SharedSnapshot>,
    state: Res<GameState>,
    session: Res<Session>,
    clock: Res<GameClock>,
    active: Res<ActiveLevel>,
    frame: Res<DeviceFrame>,
    avatar: Query<&Body, With<Avatar>>,
) {
    let mut snapshot = FlightSnapshot {
        version: *version + 1,
        state: *state,
        score: session.score,
        outcome: session.outcome,
        elapsed: clock.now(),
        camera: session.camera,
        pairs_remaining: active.level().map_or(0, |level| level.obstacles.len()),
        next_pair: active.level().and_then(|level| level.next_pair().copied()),
        ..Default::default()
    };

    if let Ok(body) = avatar.single() {
        snapshot.avatar_position = body.position;
        snapshot.avatar_velocity = body.velocity;
        snapshot.right_wing_pitch = wing_pitch(body.right_wing.rest_position, frame.right.position);
        // mirrored so both wings flap the same way on screen
        snapshot.left_wing_pitch = -wing_pitch(body.left_wing.rest_position, frame.left.position);
    }

    if shared.publish(snapshot) {
        *version += 1;
    }
}
