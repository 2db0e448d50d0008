use bevy::ecs::{
    resource::Resource,
    system::{Res, ResMut},
};

use crate::device::{DeviceFrame, DeviceLayout, SWITCH_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchState {
    #[default]
    Idle,
    Pressed,
    Held,
    Released,
}

impl SwitchState {
    pub fn next(self, down: bool) -> Self {
        match (self, down) {
            (SwitchState::Idle | SwitchState::Released, true) => SwitchState::Pressed,
            (SwitchState::Pressed | SwitchState::Held, true) => SwitchState::Held,
            (SwitchState::Pressed | SwitchState::Held, false) => SwitchState::Released,
            (SwitchState::Idle | SwitchState::Released, false) => SwitchState::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Select, or pause while playing.
    Center = 0,
    Left = 1,
    /// Restart while playing.
    Front = 2,
    Right = 3,
}

impl Button {
    pub const ALL: [Button; SWITCH_COUNT] =
        [Button::Center, Button::Left, Button::Front, Button::Right];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchLatch {
    pub states: [SwitchState; SWITCH_COUNT],
}

impl SwitchLatch {
    /// Advances every switch and reports which ones were let go this tick.
    pub fn update(&mut self, switches: [bool; SWITCH_COUNT]) -> [bool; SWITCH_COUNT] {
        let mut released = [false; SWITCH_COUNT];

        for (i, down) in switches.into_iter().enumerate() {
            self.states[i] = self.states[i].next(down);
            released[i] = self.states[i] == SwitchState::Released;
        }

        released
    }
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ButtonLatches {
    pub right: SwitchLatch,
    pub left: SwitchLatch,
}

/// Press-then-release events for this tick, from either hand.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEvents {
    pub released: [bool; SWITCH_COUNT],
}

impl ButtonEvents {
    pub fn just_released(&self, button: Button) -> bool {
        self.released[button as usize]
    }

    pub fn any(&self) -> bool {
        self.released.iter().any(|&released| released)
    }

    pub fn first(&self) -> Option<Button> {
        Button::ALL.into_iter().find(|&b| self.just_released(b))
    }
}

pub fn update_button_events(
    frame: Res<DeviceFrame>,
    mut latches: ResMut<ButtonLatches>,
    mut events: ResMut<ButtonEvents>,
) {
    let mut released = latches.right.update(frame.right.switches);

    // a single device is sampled once, not twice
    if frame.layout == DeviceLayout::Dual {
        let left = latches.left.update(frame.left.switches);
        for (merged, left) in released.iter_mut().zip(left) {
            *merged |= left;
        }
    }

    events.released = released;
}
