use bevy::prelude::*;

use crate::camera::probe::CollisionProbe;
use crate::config::OverrideConfig;

/// Unit vector pointing behind an unrotated camera.
const BACKWARD: Vec3 = Vec3::Z;

/// Where the override camera goes this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub pivot: Vec3,
    /// Distance at which the probe hit something, if it did.
    pub hit: Option<f32>,
}

/// Third person orbit around a pivot above the target.
///
/// Angles are in degrees. `horizontal` is a compass heading (clockwise seen from above),
/// `vertical` lifts the camera above the pivot when positive.
#[derive(Clone, Debug)]
pub struct OrbitRig {
    horizontal: f32,
    vertical: f32,
    vertical_min: f32,
    vertical_max: f32,
    pub distance: f32,
    pub height: f32,
    pub sensitivity: f32,
    pub collision_radius: f32,
}

impl Default for OrbitRig {
    fn default() -> Self {
        Self::from_config(&OverrideConfig::default())
    }
}

impl OrbitRig {
    pub fn from_config(config: &OverrideConfig) -> Self {
        let vertical_min = config.vertical_min.min(config.vertical_max);
        let vertical_max = config.vertical_min.max(config.vertical_max);
        Self {
            horizontal: 0.0,
            vertical: config.initial_vertical.clamp(vertical_min, vertical_max),
            vertical_min,
            vertical_max,
            distance: config.distance.max(0.0),
            height: config.height,
            sensitivity: config.sensitivity,
            collision_radius: config.collision_radius.max(0.0),
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.horizontal
    }

    pub fn vertical(&self) -> f32 {
        self.vertical
    }

    pub fn vertical_bounds(&self) -> (f32, f32) {
        (self.vertical_min, self.vertical_max)
    }

    pub fn set_angles(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal = horizontal;
        self.vertical = vertical.clamp(self.vertical_min, self.vertical_max);
    }

    /// Points the rig along a heading, e.g. the direction the target is facing.
    pub fn face(&mut self, heading: f32) {
        self.horizontal = heading;
    }

    /// Rotates the rig by a pointer delta (Y up-positive). Ignored unless free look is held.
    pub fn update_look(&mut self, delta_x: f32, delta_y: f32, free_look_held: bool) {
        if !free_look_held {
            return;
        }
        self.horizontal += delta_x * self.sensitivity;
        self.vertical -= delta_y * self.sensitivity;
        self.vertical = self.vertical.clamp(self.vertical_min, self.vertical_max);
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            -self.horizontal.to_radians(),
            -self.vertical.to_radians(),
            0.0,
        )
    }

    pub fn pivot(&self, target_position: Vec3) -> Vec3 {
        target_position + Vec3::Y * self.height
    }

    /// Camera pose for the current angles, pulled in front of whatever the probe hits.
    pub fn compute_pose(&self, target_position: Vec3, probe: &impl CollisionProbe) -> CameraPose {
        let pivot = self.pivot(target_position);
        let offset = self.orientation() * BACKWARD * self.distance;
        let desired = pivot + offset;

        let (position, hit) = match Dir3::new(offset) {
            Ok(direction) => {
                match probe.cast(pivot, direction, self.distance, self.collision_radius) {
                    Some(hit) => {
                        let pulled_in = (hit - self.collision_radius).clamp(0.0, self.distance);
                        (pivot + direction * pulled_in, Some(hit))
                    }
                    None => (desired, None),
                }
            }
            // Zero distance: nothing to sweep.
            Err(_) => (desired, None),
        };

        let rotation = Transform::from_translation(position)
            .looking_at(pivot, Vec3::Y)
            .rotation;

        CameraPose {
            position,
            rotation,
            pivot,
            hit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::probe::NoCollision;

    fn rig(distance: f32, height: f32) -> OrbitRig {
        OrbitRig::from_config(&OverrideConfig {
            distance,
            height,
            ..default()
        })
    }

    #[test]
    fn pose_behind_target_heading_south() {
        let mut rig = rig(3.5, 1.5);
        rig.set_angles(180.0, 10.0);

        let pose = rig.compute_pose(Vec3::new(10.0, 0.0, 5.0), &NoCollision);

        assert_eq!(pose.pivot, Vec3::new(10.0, 1.5, 5.0));
        let expected = pose.pivot + rig.orientation() * (BACKWARD * 3.5);
        assert!(pose.position.distance(expected) < 1e-4);
        assert!(pose.position.distance(Vec3::new(10.0, 2.107_768, 1.553_173)) < 1e-3);
        assert_eq!(pose.hit, None);
    }

    #[test]
    fn camera_looks_at_pivot_without_roll() {
        let mut rig = rig(3.5, 1.5);
        rig.set_angles(37.0, 25.0);

        let pose = rig.compute_pose(Vec3::new(-2.0, 0.5, 4.0), &NoCollision);

        let forward = pose.rotation * Vec3::NEG_Z;
        let to_pivot = (pose.pivot - pose.position).normalize();
        assert!(forward.distance(to_pivot) < 1e-4);
        let right = pose.rotation * Vec3::X;
        assert!(right.y.abs() < 1e-4);
    }

    #[test]
    fn heading_zero_puts_camera_behind_forward_facing_target() {
        let mut rig = rig(4.0, 0.0);
        rig.set_angles(0.0, 0.0);

        let pose = rig.compute_pose(Vec3::ZERO, &NoCollision);

        // Targets face -Z, so behind is +Z.
        assert!(pose.position.distance(Vec3::new(0.0, 0.0, 4.0)) < 1e-4);
    }

    #[test]
    fn hit_pulls_camera_in_front_of_obstacle() {
        let mut rig = rig(3.5, 1.5);
        rig.collision_radius = 0.3;
        rig.set_angles(0.0, 10.0);

        let probe = |_: Vec3, _: Dir3, max: f32, radius: f32| {
            assert_eq!(max, 3.5);
            assert_eq!(radius, 0.3);
            Some(2.0)
        };
        let pose = rig.compute_pose(Vec3::new(1.0, 0.0, 1.0), &probe);

        assert_eq!(pose.hit, Some(2.0));
        assert!((pose.position.distance(pose.pivot) - 1.7).abs() < 1e-4);
    }

    #[test]
    fn hit_closer_than_radius_keeps_camera_at_pivot() {
        let rig = rig(3.5, 1.5);
        let probe = |_: Vec3, _: Dir3, _: f32, _: f32| Some(0.1);

        let pose = rig.compute_pose(Vec3::new(0.0, 0.0, 2.0), &probe);

        assert!(pose.position.distance(pose.pivot) < 1e-5);
        assert!(pose.rotation.is_finite());
    }

    #[test]
    fn pose_never_exceeds_distance() {
        let mut rig = rig(3.5, 1.5);
        for step in 0..36 {
            rig.set_angles(step as f32 * 10.0, step as f32 * 7.0 - 30.0);
            for hit in [None, Some(0.0), Some(1.0), Some(3.4), Some(10.0)] {
                let probe = move |_: Vec3, _: Dir3, _: f32, _: f32| hit;
                let pose = rig.compute_pose(Vec3::new(3.0, 1.0, -2.0), &probe);
                let reached = pose.position.distance(pose.pivot);
                assert!(reached <= 3.5 + 1e-4);
                if let Some(hit) = hit {
                    assert!(reached <= hit + 1e-4);
                }
            }
        }
    }

    #[test]
    fn look_is_ignored_without_free_look() {
        let mut rig = rig(3.5, 1.5);
        let before = (rig.horizontal(), rig.vertical());

        rig.update_look(50.0, -20.0, false);

        assert_eq!((rig.horizontal(), rig.vertical()), before);
    }

    #[test]
    fn vertical_angle_stays_clamped() {
        let mut rig = rig(3.5, 1.5);
        let (min, max) = rig.vertical_bounds();
        let deltas = [
            (1.0, 400.0),
            (-3.0, -900.0),
            (0.5, 12.5),
            (0.0, -0.01),
            (7.0, 1e6),
            (2.0, -1e6),
        ];

        for (dx, dy) in deltas {
            rig.update_look(dx, dy, true);
            assert!(rig.vertical() >= min && rig.vertical() <= max);
        }
    }

    #[test]
    fn pointer_motion_follows_sensitivity() {
        let mut rig = rig(3.5, 1.5);
        rig.sensitivity = 0.5;
        rig.set_angles(0.0, 10.0);

        rig.update_look(10.0, 4.0, true);

        assert_eq!(rig.horizontal(), 5.0);
        assert_eq!(rig.vertical(), 8.0);
    }

    #[test]
    fn inverted_bounds_are_normalised() {
        let rig = OrbitRig::from_config(&OverrideConfig {
            vertical_min: 45.0,
            vertical_max: -5.0,
            ..default()
        });

        assert_eq!(rig.vertical_bounds(), (-5.0, 45.0));
    }
}
