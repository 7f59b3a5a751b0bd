// Centralized ingestion limits to harden against untrusted snapshot documents

// Scene size caps
pub const MAX_WIRES: usize = 200_000;
pub const MAX_COMPONENTS: usize = 50_000;
pub const MAX_JUNCTIONS: usize = 200_000;

// Polylines
pub const MAX_POINTS_PER_WIRE: usize = 8_000;
pub const MAX_POINTS_TOTAL: usize = 2_000_000;

// Numeric bounds
pub const COORD_MIN: f32 = -10_000_000.0;
pub const COORD_MAX: f32 =  10_000_000.0;
pub const WIDTH_MAX: f32 = 10_000.0;

#[inline]
pub fn in_coord_bounds(x: f32) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

// zero and negative widths are legal: they defer to the net class
#[inline]
pub fn in_width_bounds(w: f32) -> bool { w.is_finite() && w <= WIDTH_MAX }
