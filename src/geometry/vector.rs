use serde::{Deserialize, Serialize};

/// 2-D displacement between two board positions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64) -> Self {
        Vector { dx, dy }
    }

    pub fn between(from: [f64; 2], to: [f64; 2]) -> Self {
        Vector::new(to[0] - from[0], to[1] - from[1])
    }

    /// Signed magnitude of the 2-D cross product. Positive when `b` turns
    /// counter-clockwise from `a` in a y-up frame.
    pub fn cross(a: Vector, b: Vector) -> f64 {
        a.dx * b.dy - a.dy * b.dx
    }

    pub fn dot(a: Vector, b: Vector) -> f64 {
        a.dx * b.dx + a.dy * b.dy
    }

    pub fn length(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    /// Signed angle in radians rotating `a` onto `b`, in `(-PI, PI]`.
    pub fn signed_angle(a: Vector, b: Vector) -> f64 {
        Vector::cross(a, b).atan2(Vector::dot(a, b))
    }

    /// Unsigned angle in radians between `a` and `b`, in `[0, PI]`.
    pub fn angle(a: Vector, b: Vector) -> f64 {
        Vector::signed_angle(a, b).abs()
    }
}

/// Orientation of `r` relative to the directed line `p -> q`:
/// positive, negative or zero for left, right and collinear.
fn orientation(p: [f64; 2], q: [f64; 2], r: [f64; 2]) -> f64 {
    Vector::cross(Vector::between(p, q), Vector::between(p, r))
}

/// `r` lies within the bounding box of `p..q`; only meaningful when collinear.
fn within_box(p: [f64; 2], q: [f64; 2], r: [f64; 2]) -> bool {
    r[0] >= p[0].min(q[0])
        && r[0] <= p[0].max(q[0])
        && r[1] >= p[1].min(q[1])
        && r[1] <= p[1].max(q[1])
}

/// True iff closed segments `p1-p2` and `p3-p4` touch or cross.
///
/// Segments that share an endpoint never intersect, which lets several edges
/// fan out of the same node.
pub fn segments_intersect(p1: [f64; 2], p2: [f64; 2], p3: [f64; 2], p4: [f64; 2]) -> bool {
    if p1 == p3 || p1 == p4 || p2 == p3 || p2 == p4 {
        return false;
    }

    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_box(p3, p4, p1))
        || (d2 == 0.0 && within_box(p3, p4, p2))
        || (d3 == 0.0 && within_box(p1, p2, p3))
        || (d4 == 0.0 && within_box(p1, p2, p4))
}
