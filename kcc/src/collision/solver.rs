/// Below this magnitude the quadratic term is treated as zero.
const DEGENERATE_A: f32 = 1.0e-9;

/// Smallest root of `a·t² + b·t + c = 0` strictly inside `(0, max_r)`.
///
/// Returns `None` when the discriminant is negative or neither root is in range.
/// A vanishing `a` falls back to the linear root `-c / b`.
pub fn lowest_root(a: f32, b: f32, c: f32, max_r: f32) -> Option<f32> {
    let in_range = |r: f32| r > 0.0 && r < max_r;

    if a.abs() < DEGENERATE_A {
        if b.abs() < DEGENERATE_A {
            return None;
        }
        let r = -c / b;
        return in_range(r).then_some(r);
    }

    let determinant = b * b - 4.0 * a * c;
    if determinant < 0.0 {
        return None;
    }

    let sqrt_d = determinant.sqrt();
    let mut r1 = (-b - sqrt_d) / (2.0 * a);
    let mut r2 = (-b + sqrt_d) / (2.0 * a);
    if r1 > r2 {
        std::mem::swap(&mut r1, &mut r2);
    }

    if in_range(r1) {
        Some(r1)
    } else if in_range(r2) {
        Some(r2)
    } else {
        None
    }
}
