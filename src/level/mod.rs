use std::collections::VecDeque;

use bevy::{ecs::resource::Resource, math::DVec3};
use thiserror::Error;

use crate::config::WorldConfig;

pub mod generator;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("unknown difficulty {0}, expected 1 (easy), 2 (medium) or 3 (hard)")]
    UnknownDifficulty(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl TryFrom<u8> for Difficulty {
    type Error = LevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(LevelError::UnknownDifficulty(other)),
        }
    }
}

/// Vertical cylinder; `position` is the base, the pipe extends `height` along +z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub radius: f64,
    pub height: f64,
    pub position: DVec3,
}

impl Pipe {
    /// Signed distance along x from the pipe's leading edge to `x`; travel is toward -x.
    #[inline]
    pub fn leading_edge_offset(&self, x: f64) -> f64 {
        x - self.position.x - self.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipePair {
    pub top: Pipe,
    pub bottom: Pipe,
}

impl PipePair {
    pub fn reached(&self, x: f64) -> bool {
        self.top.leading_edge_offset(x) <= 0.0 && self.bottom.leading_edge_offset(x) <= 0.0
    }

    /// The avatar is a full metre beyond the pair.
    pub fn passed(&self, x: f64) -> bool {
        self.top.leading_edge_offset(x) <= -1.0 && self.bottom.leading_edge_offset(x) <= -1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbulenceZone {
    pub begin_x: f64,
    pub end_x: f64,
    pub period_range: u32,
    pub amplitude_range: u32,
}

impl TurbulenceZone {
    pub fn contains(&self, x: f64) -> bool {
        x <= self.begin_x && x >= self.end_x
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level {
    pub obstacles: VecDeque<PipePair>,
    pub turbulence: VecDeque<TurbulenceZone>,
}

impl Level {
    pub fn next_pair(&self) -> Option<&PipePair> {
        self.obstacles.front()
    }

    /// Zone under `x`, discarding zones that are already behind the avatar.
    pub fn turbulence_at(&mut self, x: f64) -> Option<TurbulenceZone> {
        while let Some(zone) = self.turbulence.front() {
            if x < zone.end_x {
                self.turbulence.pop_front();
                continue;
            }

            return zone.contains(x).then_some(*zone);
        }

        None
    }

    pub fn pop_pair(&mut self) -> Option<PipePair> {
        self.obstacles.pop_front()
    }
}

/// Pristine generated level for every difficulty.
#[derive(Resource, Debug, Clone)]
pub struct LevelLibrary {
    pub easy: Level,
    pub medium: Level,
    pub hard: Level,
}

impl LevelLibrary {
    pub fn generate(seed: u64, world: &WorldConfig) -> Self {
        Self {
            easy: generator::generate(Difficulty::Easy, seed, world),
            medium: generator::generate(Difficulty::Medium, seed.wrapping_add(1), world),
            hard: generator::generate(Difficulty::Hard, seed.wrapping_add(2), world),
        }
    }

    pub fn get(&self, difficulty: Difficulty) -> &Level {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// Working copy of the level being played; queues are consumed as the avatar advances.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveLevel(pub Option<Level>);

impl ActiveLevel {
    pub fn load(&mut self, library: &LevelLibrary, difficulty: Difficulty) {
        self.0 = Some(library.get(difficulty).clone());
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn level(&self) -> Option<&Level> {
        self.0.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.0.as_mut()
    }
}
