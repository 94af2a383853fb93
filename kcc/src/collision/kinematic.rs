use std::sync::Arc;

use super::{
    ground,
    plane::Plane,
    settings::{ControllerSettings, SlideMode},
    types::{CollisionPacket, Contact, Vec3},
};
use crate::{collider::MeshCollider, space};

/// Parameters for a single collide-and-slide movement attempt.
///
/// - Movement is expressed as a desired world-space translation for this step.
/// - The ellipsoid is swept in ellipsoid space (unit sphere), stopped just short
///   of the nearest contact, and the leftover movement slides along the contact.
#[derive(Clone, Copy, Debug)]
pub struct MoveRequest {
    /// Starting world position of the ellipsoid center.
    pub start_pos: Vec3,
    /// Desired world-space translation for this step.
    pub desired_translation: Vec3,
    /// Ellipsoid radii (all components > 0).
    pub radius: Vec3,
    /// When false, striking walkable ground ends the movement at the contact
    /// instead of sliding along it. Used for the gravity pass so a character
    /// standing on a slope does not creep down it.
    pub slide_on_walkable: bool,
}

impl MoveRequest {
    #[inline]
    pub fn new(start_pos: Vec3, desired_translation: Vec3, radius: Vec3) -> Self {
        Self {
            start_pos,
            desired_translation,
            radius,
            slide_on_walkable: true,
        }
    }

    #[inline]
    pub fn stop_on_walkable(mut self) -> Self {
        self.slide_on_walkable = false;
        self
    }
}

/// Result of a collide-and-slide step.
#[derive(Clone, Copy, Debug)]
pub struct MoveResult {
    /// Final world position of the ellipsoid center.
    pub end_pos: Vec3,
    /// Whether any contact of this step was walkable ground.
    pub grounded: bool,
    /// Last contact encountered during the step, in ellipsoid space.
    pub last_contact: Option<Contact>,
    /// Collision queries run.
    pub passes: u32,
    /// World-space translation left unconsumed when the pass budget ran out.
    pub remaining: Vec3,
}

/// Mutable slide state, all in ellipsoid space.
struct Slide<'a> {
    colliders: &'a [Arc<MeshCollider>],
    request: &'a MoveRequest,
    settings: &'a ControllerSettings,
    position: Vec3,
    velocity: Vec3,
    grounded: bool,
    last_contact: Option<Contact>,
    passes: u32,
}

impl Slide<'_> {
    /// Query the world for the current velocity. Records the contact and the
    /// grounded state.
    fn query(&mut self) -> Option<Contact> {
        let mut packet =
            CollisionPacket::from_ellipsoid(self.position, self.velocity, self.request.radius);
        self.passes += 1;

        let contact = packet.resolve(self.colliders)?;
        self.last_contact = Some(contact);
        if self.contact_is_walkable(&contact) {
            self.grounded = true;
        }
        log::trace!(
            "slide pass {}: hit at t={:.4} dist={:.4}",
            self.passes,
            contact.t,
            contact.distance
        );
        Some(contact)
    }

    #[inline]
    fn contact_is_walkable(&self, contact: &Contact) -> bool {
        ground::is_walkable(
            contact,
            &self.request.radius,
            &self.settings.up,
            self.settings.walkable_slope,
        )
    }

    #[inline]
    fn exhausted_velocity(&self) -> bool {
        self.velocity.norm() < self.settings.min_move
    }

    #[inline]
    fn finish(&mut self) {
        self.velocity = Vec3::zeros();
    }
}

/// Collide-and-slide an ellipsoid through static triangle geometry.
///
/// Algorithm:
/// - Transform position and translation into ellipsoid space.
/// - Query the nearest contact over all colliders; with no contact, move fully.
/// - On contact, advance to just short of it (`very_close_distance`) and turn
///   the leftover movement along the sliding plane (`SlideMode::Recursive`), or
///   along the crease of the first two planes (`SlideMode::TwoPlane`).
/// - Stop when the leftover is negligible or the pass budget is spent; the
///   position reached so far is always accepted.
///
/// `request.radius` must be finite and > 0 on every axis; `CharacterEntity`
/// checks this at construction.
pub fn collide_and_slide(
    colliders: &[Arc<MeshCollider>],
    request: MoveRequest,
    settings: &ControllerSettings,
) -> MoveResult {
    let radius = request.radius;
    debug_assert!(
        space::is_valid_radius(&radius),
        "ellipsoid radius must be finite and > 0, got {radius:?}"
    );
    let mut slide = Slide {
        colliders,
        request: &request,
        settings,
        position: space::to_ellipsoid(&request.start_pos, &radius),
        velocity: space::to_ellipsoid(&request.desired_translation, &radius),
        grounded: false,
        last_contact: None,
        passes: 0,
    };

    match settings.mode {
        SlideMode::Recursive => slide_recursive(&mut slide),
        SlideMode::TwoPlane => slide_two_plane(&mut slide),
    }

    if !slide.exhausted_velocity() {
        log::debug!(
            "slide budget of {} passes exhausted, {:.4} left unconsumed",
            settings.pass_budget(),
            slide.velocity.norm()
        );
    }

    MoveResult {
        end_pos: space::to_world(&slide.position, &radius),
        grounded: slide.grounded,
        last_contact: slide.last_contact,
        passes: slide.passes,
        remaining: space::to_world(&slide.velocity, &radius),
    }
}

/// Project the leftover onto each new sliding plane, up to `max_recursion_depth` passes.
fn slide_recursive(slide: &mut Slide<'_>) {
    let very_close = slide.settings.very_close_distance;

    for _ in 0..slide.settings.max_recursion_depth.max(1) {
        if slide.exhausted_velocity() {
            slide.finish();
            return;
        }

        let Some(contact) = slide.query() else {
            slide.position += slide.velocity;
            slide.finish();
            return;
        };

        let destination = slide.position + slide.velocity;
        let mut new_base = slide.position;
        let mut intersection = contact.intersection_point;

        // Stop short of the surface; move the touch point back by the same gap.
        if contact.distance >= very_close {
            new_base += space::with_length(&slide.velocity, contact.distance - very_close);
            intersection -= space::with_length(&slide.velocity, very_close);
        }
        slide.position = new_base;

        if !slide.request.slide_on_walkable && slide.contact_is_walkable(&contact) {
            slide.finish();
            return;
        }

        let normal = sliding_normal(&new_base, &intersection, &contact.plane);
        let sliding_plane = Plane::new(intersection, normal);
        let new_destination = sliding_plane.project_point(&destination);
        let new_velocity = new_destination - intersection;

        if new_velocity.norm() < very_close {
            slide.finish();
            return;
        }
        slide.velocity = new_velocity;
    }
}

/// Fixed pass count. The first plane clips the destination, the second turns
/// the movement along the crease of both planes, later passes only advance to
/// the contact.
fn slide_two_plane(slide: &mut Slide<'_>) {
    let very_close = slide.settings.very_close_distance;
    let mut destination = slide.position + slide.velocity;
    let mut first_plane: Option<Plane> = None;

    for pass in 0..slide.settings.slide_passes.max(1) {
        if slide.exhausted_velocity() {
            slide.finish();
            return;
        }

        let Some(contact) = slide.query() else {
            slide.position = destination;
            slide.finish();
            return;
        };

        let short_distance = (contact.distance - very_close).max(0.0);
        slide.position += space::with_length(&slide.velocity, short_distance);

        if !slide.request.slide_on_walkable && slide.contact_is_walkable(&contact) {
            slide.finish();
            return;
        }

        let normal = sliding_normal(
            &contact.sphere_center,
            &contact.intersection_point,
            &contact.plane,
        );
        let plane = Plane::new(contact.intersection_point, normal);

        match (pass, first_plane) {
            (0, _) => {
                destination = clip_destination(&plane, &destination, very_close);
                first_plane = Some(plane);
            }
            (1, Some(first)) => match crease_velocity(
                &first.normal,
                &plane.normal,
                &slide.position,
                &destination,
            ) {
                Some(velocity) => destination = slide.position + velocity,
                // Same plane again: clip against it once more.
                None => destination = clip_destination(&plane, &destination, very_close),
            },
            _ => {
                slide.finish();
                return;
            }
        }
        slide.velocity = destination - slide.position;
    }
}

/// Normal of the sliding plane at a contact: from the touch point toward the
/// sphere center. Falls back to the struck triangle's normal when that
/// direction is degenerate or points behind the surface.
fn sliding_normal(center: &Vec3, touch_point: &Vec3, contact_plane: &Plane) -> Vec3 {
    match (center - touch_point).try_normalize(f32::EPSILON) {
        Some(n) if n.dot(&contact_plane.normal) >= 0.0 => n,
        _ => contact_plane.normal,
    }
}

/// Push `destination` back out of `plane` so the unit sphere ends on its front
/// side with a `very_close` gap.
#[inline]
fn clip_destination(plane: &Plane, destination: &Vec3, very_close: f32) -> Vec3 {
    let long_radius = 1.0 + very_close;
    let depth = plane.signed_distance_to(destination) - long_radius;
    if depth < 0.0 {
        destination - plane.normal * depth
    } else {
        *destination
    }
}

/// Movement from `position` toward `destination` restricted to the crease
/// line of two planes. `None` when the planes are parallel.
pub fn crease_velocity(
    first_normal: &Vec3,
    second_normal: &Vec3,
    position: &Vec3,
    destination: &Vec3,
) -> Option<Vec3> {
    let crease = first_normal.cross(second_normal).try_normalize(1.0e-6)?;
    let along = (destination - position).dot(&crease);
    Some(crease * along)
}
