use super::{
    plane::Plane,
    solver::lowest_root,
    types::{CollisionPacket, Contact, Triangle, Vec3},
};

/// Whether `point`, assumed coplanar with the triangle `(a, b, c)`, lies inside it.
///
/// Points on an edge count as inside. Zero-area triangles contain nothing.
pub fn point_in_triangle(point: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    let u = b - a;
    let v = c - a;
    let w = point - a;

    let v_cross_w = v.cross(&w);
    let v_cross_u = v.cross(&u);
    if v_cross_w.dot(&v_cross_u) < 0.0 {
        return false;
    }

    let u_cross_w = u.cross(&w);
    let u_cross_v = u.cross(&v);
    if u_cross_w.dot(&u_cross_v) < 0.0 {
        return false;
    }

    let denom = u_cross_v.norm();
    if denom <= f32::MIN_POSITIVE {
        return false;
    }

    let r = v_cross_w.norm() / denom;
    let t = u_cross_w.norm() / denom;
    r + t <= 1.0
}

/// Sweep the packet's unit sphere along its ellipsoid-space velocity against
/// one ellipsoid-space triangle and return the earliest contact, if any.
///
/// Back-facing and degenerate triangles are ignored.
pub fn sweep_sphere_triangle(packet: &CollisionPacket, triangle: &Triangle) -> Option<Contact> {
    let plane = triangle.plane();
    if !plane.is_front_facing_to(&packet.e_normalized_velocity) {
        return None;
    }

    let base = packet.e_base_point;
    let velocity = packet.e_velocity;

    let signed_dist = plane.signed_distance_to(&base);
    let normal_dot_velocity = plane.normal.dot(&velocity);

    // Interval [t0, t1] during which the sphere overlaps the plane.
    let (t0, embedded) = if normal_dot_velocity == 0.0 {
        if signed_dist.abs() >= 1.0 {
            return None;
        }
        (0.0, true)
    } else {
        let mut t0 = (-1.0 - signed_dist) / normal_dot_velocity;
        let mut t1 = (1.0 - signed_dist) / normal_dot_velocity;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > 1.0 || t1 < 0.0 {
            return None;
        }
        (t0.clamp(0.0, 1.0), false)
    };

    // Sphere touches the face interior first.
    if !embedded {
        let plane_point = base - plane.normal + velocity * t0;
        if point_in_triangle(&plane_point, &triangle.a, &triangle.b, &triangle.c) {
            return Some(contact_at(packet, triangle, plane, t0, plane_point));
        }
    }

    // Otherwise the earliest hit, if any, is on a vertex or an edge.
    let mut best: Option<(f32, Vec3)> = None;
    for vertex in [triangle.a, triangle.b, triangle.c] {
        let bound = best.map_or(1.0, |(t, _)| t);
        if let Some(t) = sweep_vertex(&base, &velocity, &vertex, bound) {
            best = Some((t, vertex));
        }
    }
    for (from, to) in [
        (triangle.a, triangle.b),
        (triangle.b, triangle.c),
        (triangle.c, triangle.a),
    ] {
        let bound = best.map_or(1.0, |(t, _)| t);
        if let Some(hit) = sweep_edge(&base, &velocity, &from, &to, bound) {
            best = Some(hit);
        }
    }

    best.map(|(t, point)| contact_at(packet, triangle, plane, t, point))
}

/// Time in `(0, max_t)` when the unit sphere first reaches `vertex`.
fn sweep_vertex(base: &Vec3, velocity: &Vec3, vertex: &Vec3, max_t: f32) -> Option<f32> {
    let a = velocity.norm_squared();
    let b = 2.0 * velocity.dot(&(base - vertex));
    let c = (vertex - base).norm_squared() - 1.0;
    lowest_root(a, b, c, max_t)
}

/// Time in `(0, max_t)` and contact point when the unit sphere first reaches
/// the segment `from → to`.
fn sweep_edge(
    base: &Vec3,
    velocity: &Vec3,
    from: &Vec3,
    to: &Vec3,
    max_t: f32,
) -> Option<(f32, Vec3)> {
    let edge = to - from;
    let edge_sq = edge.norm_squared();
    if edge_sq <= f32::MIN_POSITIVE {
        return None;
    }

    let base_to_vertex = from - base;
    let velocity_sq = velocity.norm_squared();
    let edge_dot_velocity = edge.dot(velocity);
    let edge_dot_base_to_vertex = edge.dot(&base_to_vertex);

    let a = edge_sq * -velocity_sq + edge_dot_velocity * edge_dot_velocity;
    let b = edge_sq * (2.0 * velocity.dot(&base_to_vertex))
        - 2.0 * edge_dot_velocity * edge_dot_base_to_vertex;
    let c = edge_sq * (1.0 - base_to_vertex.norm_squared())
        + edge_dot_base_to_vertex * edge_dot_base_to_vertex;

    let t = lowest_root(a, b, c, max_t)?;

    // Foot of the perpendicular must fall on the finite segment.
    let f = (edge_dot_velocity * t - edge_dot_base_to_vertex) / edge_sq;
    (0.0..=1.0).contains(&f).then(|| (t, from + edge * f))
}

#[inline]
fn contact_at(
    packet: &CollisionPacket,
    triangle: &Triangle,
    plane: Plane,
    t: f32,
    intersection_point: Vec3,
) -> Contact {
    let t = t.clamp(0.0, 1.0);
    Contact {
        distance: t * packet.e_velocity.norm(),
        t,
        intersection_point,
        sphere_center: packet.e_base_point + packet.e_velocity * t,
        plane,
        triangle: *triangle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Large CCW quad at height `y` facing +Y, as two triangles.
    fn floor(y: f32, half: f32) -> [Triangle; 2] {
        let p00 = Vec3::new(-half, y, -half);
        let p01 = Vec3::new(-half, y, half);
        let p11 = Vec3::new(half, y, half);
        let p10 = Vec3::new(half, y, -half);
        [Triangle::new(p00, p01, p11), Triangle::new(p00, p11, p10)]
    }

    fn unit_packet(base: Vec3, velocity: Vec3) -> CollisionPacket {
        CollisionPacket::from_ellipsoid(base, velocity, Vec3::repeat(1.0))
    }

    #[test]
    fn centroid_is_inside() {
        let tris = [
            Triangle::new(Vec3::zeros(), Vec3::z(), Vec3::x()),
            Triangle::new(
                Vec3::new(1.0, 2.0, 3.0),
                Vec3::new(-4.0, 0.5, 2.0),
                Vec3::new(0.3, -1.0, 7.0),
            ),
            Triangle::new(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(100.0, 0.0, 0.0),
                Vec3::new(0.0, 0.01, 0.0),
            ),
        ];
        for tri in tris {
            assert!(point_in_triangle(&tri.centroid(), &tri.a, &tri.b, &tri.c));
        }
    }

    #[test]
    fn points_outside_hull_are_outside() {
        let (a, b, c) = (Vec3::zeros(), Vec3::x(), Vec3::z());
        assert!(!point_in_triangle(&Vec3::new(1.0, 0.0, 1.0), &a, &b, &c));
        assert!(!point_in_triangle(&Vec3::new(-0.1, 0.0, 0.5), &a, &b, &c));
        assert!(!point_in_triangle(&Vec3::new(0.5, 0.0, -0.1), &a, &b, &c));
        assert!(!point_in_triangle(&Vec3::new(0.6, 0.0, 0.6), &a, &b, &c));
    }

    #[test]
    fn vertices_and_edge_midpoints_are_inside() {
        let (a, b, c) = (Vec3::zeros(), Vec3::x() * 2.0, Vec3::z() * 2.0);
        assert!(point_in_triangle(&a, &a, &b, &c));
        assert!(point_in_triangle(&((a + b) * 0.5), &a, &b, &c));
        assert!(point_in_triangle(&((b + c) * 0.5), &a, &b, &c));
    }

    #[test]
    fn degenerate_triangle_contains_nothing() {
        let (a, b, c) = (Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0);
        assert!(!point_in_triangle(&(Vec3::x() * 0.5), &a, &b, &c));
    }

    #[test]
    fn falling_onto_floor_hits_at_t_0_4() {
        let packet = unit_packet(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -10.0, 0.0));
        let contact = floor(0.0, 10.0)
            .iter()
            .filter_map(|tri| sweep_sphere_triangle(&packet, tri))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .expect("floor should be hit");

        assert_relative_eq!(contact.t, 0.4, epsilon = 1e-5);
        assert_relative_eq!(contact.distance, 4.0, epsilon = 1e-4);
        assert_relative_eq!(contact.sphere_center.y, 1.0, epsilon = 1e-4);
        assert_relative_eq!(contact.intersection_point.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(contact.plane.normal, Vec3::y());
    }

    #[test]
    fn back_face_is_ignored() {
        // Moving up through a floor from below.
        let packet = unit_packet(Vec3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 10.0, 0.0));
        for tri in floor(0.0, 10.0) {
            assert!(sweep_sphere_triangle(&packet, &tri).is_none());
        }
    }

    #[test]
    fn moving_away_or_too_short_misses() {
        let short = unit_packet(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -3.0, 0.0));
        let parallel_far = unit_packet(Vec3::new(0.0, 2.0, 0.0), Vec3::new(5.0, 0.0, 0.0));
        for tri in floor(0.0, 10.0) {
            assert!(sweep_sphere_triangle(&short, &tri).is_none());
            assert!(sweep_sphere_triangle(&parallel_far, &tri).is_none());
        }
    }

    #[test]
    fn vertex_hit_from_the_side() {
        // Small triangle in the y=0 plane; sphere skims just above the plane
        // and strikes vertex (0,0,0) head-on along +X.
        let tri = Triangle::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let packet = unit_packet(Vec3::new(-3.0, 0.5, 0.0), Vec3::new(4.0, -0.001, 0.0));
        let contact = sweep_sphere_triangle(&packet, &tri).expect("vertex or edge hit");

        // Center must be at unit distance from the contact point at impact.
        let gap = (contact.sphere_center - contact.intersection_point).norm();
        assert_relative_eq!(gap, 1.0, epsilon = 1e-3);
        assert!(contact.t > 0.0 && contact.t < 1.0);
        assert!(contact.intersection_point.x.abs() < 1e-3);
    }

    #[test]
    fn edge_hit_reports_point_on_segment() {
        // Vertical wall facing -X spanning z in [-5, 5], y in [0, 4].
        // A sphere passing beside its +Z edge strikes that edge.
        let wall = Triangle::new(
            Vec3::new(2.0, 0.0, -5.0),
            Vec3::new(2.0, 0.0, 5.0),
            Vec3::new(2.0, 4.0, 5.0),
        );
        let packet = unit_packet(Vec3::new(0.0, 1.0, 5.5), Vec3::new(4.0, 0.0, 0.0));
        let contact = sweep_sphere_triangle(&packet, &wall).expect("edge hit");
        assert_relative_eq!(contact.intersection_point.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(contact.intersection_point.z, 5.0, epsilon = 1e-4);
        let gap = (contact.sphere_center - contact.intersection_point).norm();
        assert_relative_eq!(gap, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn embedded_sphere_sliding_parallel_still_finds_edges() {
        // Sphere already intersecting the floor plane, moving parallel to it,
        // toward a triangle whose nearest vertex lies ahead.
        let tri = Triangle::new(
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 2.0),
            Vec3::new(5.0, 0.0, 0.0),
        );
        let packet = unit_packet(Vec3::new(0.0, 0.5, 0.0), Vec3::new(4.0, 0.0, 0.0));
        let contact = sweep_sphere_triangle(&packet, &tri).expect("embedded sweep hit");
        assert!(contact.t > 0.0 && contact.t < 1.0);
        assert!(contact.intersection_point.x <= 3.0 + 1e-4);
    }

    #[test]
    fn degenerate_triangle_never_hits() {
        let tri = Triangle::new(Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0);
        let packet = unit_packet(Vec3::new(0.5, 3.0, 0.0), Vec3::new(0.0, -5.0, 0.0));
        assert!(sweep_sphere_triangle(&packet, &tri).is_none());
    }
}
