use std::sync::Arc;

use log::warn;

use crate::{
    collider::MeshCollider,
    collision::{
        ControllerSettings, GroundHit, MoveRequest, MoveResult, Vec3, collide_and_slide, ground,
    },
    error::CollisionError,
    space,
};

/// Output of a single `CharacterEntity::update()` or `move_by()` call.
#[derive(Clone, Copy, Debug)]
pub struct StepOutcome {
    /// New ellipsoid center position (world space).
    pub position: Vec3,
    /// Whether either pass rested on walkable ground.
    pub grounded: bool,
    /// Lateral pass (movement perpendicular to `up`).
    pub horizontal: MoveResult,
    /// Gravity-axis pass, run from the end of the lateral pass.
    pub vertical: MoveResult,
    /// Whether the character was pulled down onto ground after both passes.
    pub snapped: bool,
}

/// An ellipsoid-shaped character moving through shared static colliders.
///
/// Colliders are immutable snapshots behind `Arc`, so any number of characters
/// can hold the same world.
#[derive(Clone, Debug)]
pub struct CharacterEntity {
    /// Ellipsoid center (world space).
    pub position: Vec3,
    /// World units per second.
    pub velocity: Vec3,
    pub grounded: bool,
    radius: Vec3,
    colliders: Vec<Arc<MeshCollider>>,
}

impl CharacterEntity {
    /// New character at rest. Every radius component must be finite and > 0.
    pub fn new(position: Vec3, radius: Vec3) -> Result<Self, CollisionError> {
        validate_radius(&radius)?;
        Ok(Self {
            position,
            velocity: Vec3::zeros(),
            grounded: false,
            radius,
            colliders: Vec::new(),
        })
    }

    #[inline]
    pub fn radius(&self) -> Vec3 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: Vec3) -> Result<(), CollisionError> {
        validate_radius(&radius)?;
        self.radius = radius;
        Ok(())
    }

    pub fn add_collider(&mut self, collider: Arc<MeshCollider>) {
        self.colliders.push(collider);
    }

    pub fn with_collider(mut self, collider: Arc<MeshCollider>) -> Self {
        self.add_collider(collider);
        self
    }

    #[inline]
    pub fn colliders(&self) -> &[Arc<MeshCollider>] {
        &self.colliders
    }

    pub fn clear_colliders(&mut self) {
        self.colliders.clear();
    }

    /// Advance one tick of `dt` seconds under gravity.
    ///
    /// Behavior
    /// - Integrates gravity into `velocity`, capped at `terminal_speed` along
    ///   the gravity direction.
    /// - Moves by `velocity * dt` through [`Self::move_by`].
    /// - A blocked vertical pass reduces the vertical speed to what was
    ///   actually travelled, so landing kills the fall speed.
    /// - A character that was grounded before the tick, lost contact during
    ///   it and is not moving up is snapped back onto walkable ground within
    ///   `ground_snap_distance`.
    /// - A grounded character with a small downward speed is put at rest
    ///   (vertical speed exactly zero).
    ///
    /// A non-finite velocity or `dt` skips the tick.
    pub fn update(&mut self, dt: f32, settings: &ControllerSettings) -> StepOutcome {
        if !dt.is_finite() || !space::is_finite(&self.velocity) {
            warn!(
                "skipping character update: dt={dt}, velocity={:?}",
                self.velocity
            );
            return self.stationary();
        }
        if dt <= 0.0 {
            return self.stationary();
        }

        let up = settings.up;
        let was_grounded = self.grounded;
        self.velocity += settings.gravity_vector() * dt;
        let fall_speed = -self.velocity.dot(&up);
        if fall_speed > settings.terminal_speed {
            self.velocity += up * (fall_speed - settings.terminal_speed);
        }

        let mut outcome = self.slide(self.velocity * dt, settings);

        let (lateral, _) = space::split_along(&self.velocity, &up);
        if outcome.vertical.last_contact.is_some() {
            let achieved = (outcome.vertical.end_pos - outcome.horizontal.end_pos).dot(&up);
            self.velocity = lateral + up * (achieved / dt);
        }

        if was_grounded && !self.grounded && self.velocity.dot(&up) <= 0.0 {
            let (position, hit) = ground::snap_to_ground(
                &self.colliders,
                self.position,
                self.radius,
                settings.ground_snap_distance,
                settings,
            );
            if hit.is_some() {
                self.position = position;
                self.grounded = true;
                outcome.position = position;
                outcome.grounded = true;
                outcome.snapped = true;
            }
        }

        let vertical_speed = self.velocity.dot(&up);
        if self.grounded && vertical_speed <= 0.0 && -vertical_speed < settings.rest_speed_epsilon
        {
            self.velocity = lateral;
        }

        outcome
    }

    /// Move by a caller-composed world displacement without touching
    /// `velocity`.
    ///
    /// The displacement is split along `up`: the lateral part slides first,
    /// then the vertical part stops on walkable ground instead of sliding
    /// down it.
    pub fn move_by(&mut self, displacement: Vec3, settings: &ControllerSettings) -> StepOutcome {
        if !space::is_finite(&displacement) {
            warn!("skipping non-finite character displacement {displacement:?}");
            return self.stationary();
        }
        self.slide(displacement, settings)
    }

    /// Sweep down by at most `max_distance` without moving.
    pub fn probe_ground(&self, max_distance: f32, settings: &ControllerSettings) -> Option<GroundHit> {
        ground::probe_ground(
            &self.colliders,
            self.position,
            self.radius,
            max_distance,
            settings,
        )
    }

    fn slide(&mut self, displacement: Vec3, settings: &ControllerSettings) -> StepOutcome {
        let (lateral, vertical) = space::split_along(&displacement, &settings.up);

        let horizontal = collide_and_slide(
            &self.colliders,
            MoveRequest::new(self.position, lateral, self.radius),
            settings,
        );
        let vertical = collide_and_slide(
            &self.colliders,
            MoveRequest::new(horizontal.end_pos, vertical, self.radius).stop_on_walkable(),
            settings,
        );

        self.position = vertical.end_pos;
        self.grounded = horizontal.grounded || vertical.grounded;

        StepOutcome {
            position: self.position,
            grounded: self.grounded,
            horizontal,
            vertical,
            snapped: false,
        }
    }

    fn stationary(&self) -> StepOutcome {
        let idle = MoveResult {
            end_pos: self.position,
            grounded: self.grounded,
            last_contact: None,
            passes: 0,
            remaining: Vec3::zeros(),
        };
        StepOutcome {
            position: self.position,
            grounded: self.grounded,
            horizontal: idle,
            vertical: idle,
            snapped: false,
        }
    }
}

fn validate_radius(radius: &Vec3) -> Result<(), CollisionError> {
    match radius.iter().position(|r| !r.is_finite() || *r <= 0.0) {
        Some(axis) => Err(CollisionError::InvalidRadius {
            axis,
            value: radius[axis],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn floor() -> Arc<MeshCollider> {
        let h = 100.0;
        let verts = vec![
            Vec3::new(-h, 0.0, -h),
            Vec3::new(-h, 0.0, h),
            Vec3::new(h, 0.0, h),
            Vec3::new(h, 0.0, -h),
        ];
        Arc::new(MeshCollider::from_indexed(verts, &[0, 1, 2, 0, 2, 3]).unwrap())
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let err = CharacterEntity::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 1.0)).unwrap_err();
        assert_eq!(err, CollisionError::InvalidRadius { axis: 1, value: 0.0 });

        assert!(CharacterEntity::new(Vec3::zeros(), Vec3::new(1.0, 1.0, f32::NAN)).is_err());
        assert!(CharacterEntity::new(Vec3::zeros(), Vec3::new(-0.5, 1.0, 1.0)).is_err());

        let mut c = CharacterEntity::new(Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        assert!(c.set_radius(Vec3::new(1.0, f32::INFINITY, 1.0)).is_err());
        assert_eq!(c.radius(), Vec3::repeat(1.0));
    }

    #[test]
    fn falls_lands_and_comes_to_rest() {
        let settings = ControllerSettings::default();
        let mut c = CharacterEntity::new(Vec3::new(0.0, 3.0, 0.0), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(floor());

        for _ in 0..120 {
            c.update(DT, &settings);
        }

        assert!(c.grounded);
        assert_eq!(c.velocity.y, 0.0);
        assert!(c.position.y >= 1.0);
        assert_relative_eq!(c.position.y, 1.0, epsilon = 0.01);
    }

    #[test]
    fn landing_kills_fall_speed() {
        let settings = ControllerSettings::default();
        let mut c = CharacterEntity::new(Vec3::new(0.0, 1.05, 0.0), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(floor());
        c.velocity = Vec3::new(0.0, -20.0, 0.0);

        let outcome = c.update(DT, &settings);

        assert!(outcome.grounded);
        assert!(outcome.vertical.last_contact.is_some());
        // Only ~0.05 of the ~0.34 frame displacement was travelled.
        assert!(c.velocity.y > -5.0 && c.velocity.y <= 0.0);
    }

    #[test]
    fn airborne_fall_is_capped_at_terminal_speed() {
        let settings = ControllerSettings::default();
        let mut c = CharacterEntity::new(Vec3::new(0.0, 1000.0, 0.0), Vec3::repeat(1.0)).unwrap();

        for _ in 0..10 {
            c.update(1.0, &settings);
        }

        assert!(!c.grounded);
        assert_relative_eq!(c.velocity.y, -settings.terminal_speed, epsilon = 1e-3);
    }

    #[test]
    fn walking_into_a_wall_stays_grounded() {
        let settings = ControllerSettings::default();
        let h = 100.0;
        let wall = Arc::new(
            MeshCollider::from_indexed(
                vec![
                    Vec3::new(3.0, -h, -h),
                    Vec3::new(3.0, -h, h),
                    Vec3::new(3.0, h, h),
                    Vec3::new(3.0, h, -h),
                ],
                &[0, 1, 2, 0, 2, 3],
            )
            .unwrap(),
        );
        let mut c = CharacterEntity::new(Vec3::new(0.0, 1.001, 0.0), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(floor())
            .with_collider(wall);

        for _ in 0..60 {
            c.velocity.x = 5.0;
            c.update(DT, &settings);
        }

        assert!(c.grounded);
        assert!(c.position.x <= 2.0);
        assert!(c.position.x > 1.9);
        assert_relative_eq!(c.position.y, 1.0, epsilon = 0.01);
    }

    #[test]
    fn non_finite_velocity_skips_the_update() {
        let settings = ControllerSettings::default();
        let start = Vec3::new(0.0, 5.0, 0.0);
        let mut c = CharacterEntity::new(start, Vec3::repeat(1.0))
            .unwrap()
            .with_collider(floor());
        c.velocity = Vec3::new(f32::NAN, 0.0, 0.0);

        let outcome = c.update(DT, &settings);
        assert_eq!(outcome.position, start);
        assert_eq!(c.position, start);
        assert_eq!(outcome.vertical.passes, 0);

        let outcome = c.move_by(Vec3::new(0.0, f32::INFINITY, 0.0), &settings);
        assert_eq!(outcome.position, start);
    }

    #[test]
    fn move_by_leaves_velocity_alone() {
        let settings = ControllerSettings::default();
        let mut c = CharacterEntity::new(Vec3::new(0.0, 4.0, 0.0), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(floor());
        c.velocity = Vec3::new(1.0, 2.0, 3.0);

        let outcome = c.move_by(Vec3::new(2.0, -10.0, 0.0), &settings);

        assert!(outcome.grounded);
        assert_eq!(c.velocity, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(c.position.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(c.position.y, 1.0, epsilon = 0.01);
    }

    #[test]
    fn characters_share_colliders() {
        let world = floor();
        let a = CharacterEntity::new(Vec3::new(0.0, 2.0, 0.0), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(world.clone());
        let mut b = CharacterEntity::new(Vec3::new(5.0, 2.0, 0.0), Vec3::repeat(0.5))
            .unwrap()
            .with_collider(world.clone());

        assert_eq!(Arc::strong_count(&world), 3);
        assert!(Arc::ptr_eq(&a.colliders()[0], &b.colliders()[0]));

        b.clear_colliders();
        assert_eq!(Arc::strong_count(&world), 2);
    }

    #[test]
    fn ground_probe_reports_distance() {
        let settings = ControllerSettings::default();
        let c = CharacterEntity::new(Vec3::new(0.0, 3.0, 0.0), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(floor());

        let hit = c.probe_ground(5.0, &settings).unwrap();
        assert!(hit.walkable);
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal, Vec3::y(), epsilon = 1e-5);
        assert!(c.probe_ground(1.5, &settings).is_none());
    }

    /// Ramp through the origin rising along +X at `angle_deg`.
    fn ramp(angle_deg: f32) -> Arc<MeshCollider> {
        let (s, c) = angle_deg.to_radians().sin_cos();
        let l = 50.0;
        let verts = vec![
            Vec3::new(-l * c, -l * s, -l),
            Vec3::new(-l * c, -l * s, l),
            Vec3::new(l * c, l * s, l),
            Vec3::new(l * c, l * s, -l),
        ];
        Arc::new(MeshCollider::from_indexed(verts, &[0, 1, 2, 0, 2, 3]).unwrap())
    }

    #[test]
    fn walking_downhill_stays_grounded() {
        let settings = ControllerSettings::default();
        let mut c = CharacterEntity::new(Vec3::new(10.0, 5.0, 0.3), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(ramp(20.0));
        for _ in 0..120 {
            c.update(DT, &settings);
        }
        assert!(c.grounded);

        let start_x = c.position.x;
        let mut snaps = 0;
        for _ in 0..60 {
            c.velocity.x = -5.0;
            let outcome = c.update(DT, &settings);
            assert!(outcome.grounded);
            assert!(c.grounded);
            snaps += outcome.snapped as u32;
        }

        assert!(snaps > 0);
        assert_relative_eq!(c.position.x, start_x - 5.0, epsilon = 0.05);
        assert_eq!(c.velocity.y, 0.0);
    }

    #[test]
    fn snapping_can_be_disabled() {
        let settings = ControllerSettings::default().with_ground_snap(0.0);
        let mut c = CharacterEntity::new(Vec3::new(10.0, 5.0, 0.3), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(ramp(20.0));
        for _ in 0..120 {
            c.update(DT, &settings);
        }

        c.velocity.x = -5.0;
        let outcome = c.update(DT, &settings);
        assert!(!outcome.snapped);
        assert!(!outcome.grounded);
    }

    #[test]
    fn jumping_is_not_snapped_back() {
        let settings = ControllerSettings::default();
        let mut c = CharacterEntity::new(Vec3::new(0.0, 1.001, 0.3), Vec3::repeat(1.0))
            .unwrap()
            .with_collider(floor());
        c.update(DT, &settings);
        assert!(c.grounded);

        c.velocity.y = 5.0;
        let outcome = c.update(DT, &settings);

        assert!(!outcome.snapped);
        assert!(!c.grounded);
        assert!(c.position.y > 1.05);
        assert!(c.velocity.y > 4.0);
    }
}
