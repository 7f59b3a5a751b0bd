// Centralized tolerances and helpers for wire geometry

pub const EPS_POS: f32 = 1e-4;            // point coincidence threshold (model units)
pub const EPS_DENOM: f32 = 1e-8;          // denominator guard for ratios

// Default slack for mapping component pins onto straight runs
pub const MAP_TOL: f32 = 0.5;
// Gap-to-snapshot distance under which a stroke match counts as "close"
pub const STROKE_MATCH_TOL: f32 = 0.5;

#[inline] pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 { x.max(lo).min(hi) }

/// Ordered pair `(min, max)`.
#[inline]
pub fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Snap `v` to a multiple of `grid`; non-positive grids disable snapping.
#[inline]
pub fn snap(v: f32, grid: f32) -> f32 {
    if grid > 0.0 { (v / grid).round() * grid } else { v }
}
