use bevy::math::DVec3;

use crate::level::Pipe;

/// Circle against the pipe's side profile in the x/z plane, a rectangle with
/// rounded corners once the avatar radius is added.
pub fn circle_hits_pipe(center: DVec3, radius: f64, pipe: &Pipe) -> bool {
    let half_height = pipe.height / 2.0;
    let pipe_center = pipe.position + DVec3::Z * half_height;

    let dx = (center.x - pipe_center.x).abs();
    let dz = (center.z - pipe_center.z).abs();

    if dx > pipe.radius + radius || dz > half_height + radius {
        return false;
    }

    if dx <= pipe.radius || dz <= half_height {
        return true;
    }

    let corner_distance = (dx - pipe.radius).powi(2) + (dz - half_height).powi(2);

    corner_distance <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f64 = 0.025;

    fn pipe() -> Pipe {
        // spans z in [0, 1], centred on x = -2
        Pipe {
            radius: 0.03,
            height: 1.0,
            position: DVec3::new(-2.0, 0.0, 0.0),
        }
    }

    #[test]
    fn misses_outside_bounding_box() {
        let pipe = pipe();

        assert!(!circle_hits_pipe(DVec3::new(-2.0 + 0.0551, 0.0, 0.5), R, &pipe));
        assert!(!circle_hits_pipe(DVec3::new(-2.0 - 0.0551, 0.0, 0.5), R, &pipe));
        assert!(!circle_hits_pipe(DVec3::new(-2.0, 0.0, 1.0251), R, &pipe));
        assert!(!circle_hits_pipe(DVec3::new(-2.0, 0.0, -0.0251), R, &pipe));
    }

    #[test]
    fn hits_inside_core_box() {
        let pipe = pipe();

        assert!(circle_hits_pipe(DVec3::new(-2.0, 0.0, 0.5), R, &pipe));
        assert!(circle_hits_pipe(DVec3::new(-2.02, 0.0, 0.99), R, &pipe));
        // edge bands of the rounded rectangle
        assert!(circle_hits_pipe(DVec3::new(-2.0 + 0.054, 0.0, 0.5), R, &pipe));
        assert!(circle_hits_pipe(DVec3::new(-2.0, 0.0, 1.024), R, &pipe));
    }

    #[test]
    fn corners_are_rounded() {
        let pipe = pipe();

        // 0.015 past the corner on both axes, distance ~0.021
        assert!(circle_hits_pipe(DVec3::new(-2.0 + 0.045, 0.0, 1.015), R, &pipe));
        // 0.024 on both axes, distance ~0.034: inside the box but outside the rounded corner
        assert!(!circle_hits_pipe(DVec3::new(-2.0 + 0.054, 0.0, 1.024), R, &pipe));
    }

    #[test]
    fn lateral_offset_is_ignored() {
        let pipe = pipe();

        assert!(circle_hits_pipe(DVec3::new(-2.0, 5.0, 0.5), R, &pipe));
    }
}
