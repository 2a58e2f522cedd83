//! Geometric primitives for anti-aliased rendering
//!
//! Distances and coverage values used by the software canvas when it
//! fills discs and strokes line segments.

/// Smoothstep interpolation for anti-aliasing.
///
/// Returns smooth transition from 0 to 1 as t goes from 0 to 1.
/// Uses Hermite interpolation: 3t² - 2t³
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Compute anti-aliased coverage from signed distance.
///
/// # Arguments
/// * `d` - Signed distance to shape boundary (positive = inside)
/// * `aa_width` - Width of the anti-aliasing transition zone
///
/// # Returns
/// * `d >= 0`: 1.0 (fully inside)
/// * `d < -aa_width`: 0.0 (fully outside)
/// * Otherwise: smooth transition using smoothstep
#[inline]
pub fn aa_alpha_from_distance(d: f32, aa_width: f32) -> f32 {
    if d >= 0.0 {
        1.0
    } else {
        let t = (d / aa_width + 1.0).clamp(0.0, 1.0);
        smoothstep(t)
    }
}

/// Signed distance to a disc: positive inside, negative outside.
#[inline]
pub fn disc_distance(px: f32, py: f32, cx: f32, cy: f32, radius: f32) -> f32 {
    let dx = px - cx;
    let dy = py - cy;
    radius - (dx * dx + dy * dy).sqrt()
}

/// Projection parameter of P onto segment AB.
///
/// 0.0 at A, 1.0 at B, outside [0, 1] beyond the endpoints.
/// A degenerate segment (A == B) projects everything onto A.
#[inline]
pub fn segment_param(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let vx = bx - ax;
    let vy = by - ay;
    let len2 = vx * vx + vy * vy;
    if len2 <= f32::EPSILON {
        return 0.0;
    }
    ((px - ax) * vx + (py - ay) * vy) / len2
}

/// Calculate shortest distance from point P to line segment AB.
///
/// # Algorithm
/// Uses point-to-line projection to find the closest point on segment AB:
///
/// 1. Compute vectors: v = B - A (segment direction), w = P - A (point offset)
/// 2. Project P onto infinite line AB: t = dot(v, w) / dot(v, v)
/// 3. Clamp t to [0, 1] to stay within segment
/// 4. Return distance from P to the clamped projection point
///
/// # Reference
/// <https://en.wikipedia.org/wiki/Distance_from_a_point_to_a_line>
#[inline]
pub fn distance_to_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let vx = bx - ax; // Segment direction vector
    let vy = by - ay;
    let wx = px - ax; // Vector from segment start to point
    let wy = py - ay;

    // c1 = dot(v, w): projection of w onto v (unnormalized)
    let c1 = vx * wx + vy * wy;
    if c1 <= 0.0 {
        // Point projects before segment start: closest point is A
        return (wx * wx + wy * wy).sqrt();
    }

    // c2 = dot(v, v) = |v|²: squared length of segment
    let c2 = vx * vx + vy * vy;
    if c2 <= c1 {
        // Point projects after segment end: closest point is B
        let dx = px - bx;
        let dy = py - by;
        return (dx * dx + dy * dy).sqrt();
    }

    let t = c1 / c2;
    let proj_x = ax + t * vx;
    let proj_y = ay + t * vy;
    let dx = px - proj_x;
    let dy = py - proj_y;
    (dx * dx + dy * dy).sqrt()
}
