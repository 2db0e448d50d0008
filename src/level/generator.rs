use std::collections::VecDeque;

use bevy::{log::debug, math::DVec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    config::WorldConfig,
    level::{Difficulty, Level, Pipe, PipePair, TurbulenceZone},
};

pub const PIPE_RADIUS: f64 = 0.03;
/// How far every pipe reaches past the ceiling or floor.
pub const PIPE_EXTENSION: f64 = 1.0;
/// The course starts this far ahead of the spawn point.
pub const COURSE_OFFSET: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeTuning {
    pub min_gap: f64,
    pub max_gap: f64,
    pub min_spacing: f64,
    pub max_spacing: f64,
    pub pairs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbulenceTuning {
    pub min_length: f64,
    pub max_length: f64,
    pub zones: usize,
    pub min_spacing: f64,
    pub period_range: u32,
    pub amplitude_range: u32,
}

impl Difficulty {
    pub fn pipe_tuning(self) -> PipeTuning {
        match self {
            Difficulty::Easy => PipeTuning {
                min_gap: 0.14,
                max_gap: 0.18,
                min_spacing: 1.2,
                max_spacing: 2.2,
                pairs: 20,
            },
            Difficulty::Medium => PipeTuning {
                min_gap: 0.10,
                max_gap: 0.12,
                min_spacing: 1.2,
                max_spacing: 2.0,
                pairs: 30,
            },
            Difficulty::Hard => PipeTuning {
                min_gap: 0.09,
                max_gap: 0.11,
                min_spacing: 1.2,
                max_spacing: 1.8,
                pairs: 40,
            },
        }
    }

    pub fn turbulence_tuning(self) -> TurbulenceTuning {
        match self {
            Difficulty::Easy => TurbulenceTuning {
                min_length: 1.0,
                max_length: 3.0,
                zones: 3,
                min_spacing: 5.0,
                period_range: 50,
                amplitude_range: 5,
            },
            Difficulty::Medium => TurbulenceTuning {
                min_length: 3.0,
                max_length: 5.0,
                zones: 6,
                min_spacing: 2.0,
                period_range: 50,
                amplitude_range: 7,
            },
            Difficulty::Hard => TurbulenceTuning {
                min_length: 5.0,
                max_length: 7.0,
                zones: 9,
                min_spacing: 1.0,
                period_range: 50,
                amplitude_range: 10,
            },
        }
    }
}

#[inline]
fn lerp(min: f64, max: f64, t: f64) -> f64 {
    min + (max - min) * t
}

pub fn generate(difficulty: Difficulty, seed: u64, world: &WorldConfig) -> Level {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let obstacles = generate_pipes(&difficulty.pipe_tuning(), world, &mut rng);
    let last_x = obstacles
        .back()
        .map(|pair| pair.top.position.x)
        .unwrap_or(COURSE_OFFSET);
    let turbulence = generate_turbulence(&difficulty.turbulence_tuning(), last_x, &mut rng);

    debug!(
        "generated {:?} level: {} pipe pairs, {} turbulence zones, course ends at x={:.2}",
        difficulty,
        obstacles.len(),
        turbulence.len(),
        last_x
    );

    Level {
        obstacles,
        turbulence,
    }
}

pub fn generate_pipes(
    tuning: &PipeTuning,
    world: &WorldConfig,
    rng: &mut impl Rng,
) -> VecDeque<PipePair> {
    let (ceiling, floor) = (world.ceiling, world.floor);
    let mut x = COURSE_OFFSET;

    (0..tuning.pairs)
        .map(|_| {
            x -= lerp(tuning.min_spacing, tuning.max_spacing, rng.random());

            let gap = lerp(tuning.min_gap, tuning.max_gap, rng.random());
            // keep the whole gap inside the band so neither pipe is empty
            let gap_center = lerp(floor + gap / 2.0, ceiling - gap / 2.0, rng.random());

            let top = Pipe {
                radius: PIPE_RADIUS,
                height: ceiling - gap_center - gap / 2.0 + PIPE_EXTENSION,
                position: DVec3::new(x, 0.0, gap_center + gap / 2.0),
            };
            let bottom = Pipe {
                radius: PIPE_RADIUS,
                height: gap_center - floor - gap / 2.0 + PIPE_EXTENSION,
                position: DVec3::new(x, 0.0, floor - PIPE_EXTENSION),
            };

            PipePair { top, bottom }
        })
        .collect()
}

/// Zones are laid out front to back and never start past the last pipe.
pub fn generate_turbulence(
    tuning: &TurbulenceTuning,
    last_x: f64,
    rng: &mut impl Rng,
) -> VecDeque<TurbulenceZone> {
    let max_spacing = (last_x.abs() / tuning.zones.max(1) as f64).max(tuning.min_spacing);
    let mut zones = VecDeque::with_capacity(tuning.zones);
    let mut x = 0.0;

    for _ in 0..tuning.zones {
        let begin_x = x - lerp(tuning.min_spacing, max_spacing, rng.random());
        if begin_x <= last_x {
            break;
        }

        let end_x = begin_x - lerp(tuning.min_length, tuning.max_length, rng.random());
        zones.push_back(TurbulenceZone {
            begin_x,
            end_x,
            period_range: tuning.period_range,
            amplitude_range: tuning.amplitude_range,
        });

        x = end_x;
    }

    zones
}
