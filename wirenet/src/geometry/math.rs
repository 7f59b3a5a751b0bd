use super::tolerance::{ordered, EPS_POS};
use crate::model::{Axis, Point};

/// Squared distance from `p` to segment `ab` and the clamped parameter of
/// the closest point.
pub fn seg_distance_sq(p: Point, a: Point, b: Point) -> (f32, f32) {
    let vx = b.x - a.x; let vy = b.y - a.y;
    let wx = p.x - a.x; let wy = p.y - a.y;
    let vv = vx*vx + vy*vy;
    let mut t = if vv > 0.0 { (wx*vx + wy*vy) / vv } else { 0.0 };
    if t < 0.0 { t = 0.0; } else if t > 1.0 { t = 1.0; }
    let projx = a.x + t * vx; let projy = a.y + t * vy;
    let dx = p.x - projx; let dy = p.y - projy;
    (dx*dx + dy*dy, t)
}

pub fn dist_point_to_seg(p: Point, a: Point, b: Point) -> f32 {
    seg_distance_sq(p, a, b).0.sqrt()
}

/// Unclamped projection parameter of `p` onto the line through `ab`.
pub fn project_param(p: Point, a: Point, b: Point) -> f32 {
    let vx = b.x - a.x; let vy = b.y - a.y;
    let vv = vx*vx + vy*vy;
    if vv > 0.0 { ((p.x - a.x)*vx + (p.y - a.y)*vy) / vv } else { 0.0 }
}

#[inline]
pub fn orient(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `c` lies on the infinite line through `ab` (area test scaled by |ab|).
pub fn collinear(a: Point, b: Point, c: Point, eps: f32) -> bool {
    let len = a.dist_sq(b).sqrt();
    if len <= EPS_POS { return a.dist_sq(c).sqrt() <= eps; }
    (orient(a, b, c) / len).abs() <= eps
}

/// `p` lies on segment `ab` strictly away from both endpoints.
pub fn on_segment_interior(p: Point, a: Point, b: Point, eps: f32) -> bool {
    let (d2, _) = seg_distance_sq(p, a, b);
    d2 <= eps * eps && p.dist_sq(a) > eps * eps && p.dist_sq(b) > eps * eps
}

/// Length of the overlap of two closed intervals (0 when disjoint).
pub fn overlap_len(a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    let (a0, a1) = ordered(a0, a1);
    let (b0, b1) = ordered(b0, b1);
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

/// Extent of segment `ab` along `axis`, ordered.
pub fn extent_along(axis: Axis, a: Point, b: Point) -> (f32, f32) {
    ordered(axis.along(a), axis.along(b))
}
