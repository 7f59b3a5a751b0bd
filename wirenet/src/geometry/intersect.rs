// Segment-segment intersection in f64 with tolerances.
// Classifies proper crossings, endpoint touches, and collinear overlaps.

use crate::model::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegIntersection {
    None,
    // Interior crossing (not at endpoints within tolerance)
    Proper { t: f64, u: f64, at: Point },
    // At least one endpoint touches the other segment; t/u clamped to [0,1]
    Touch { t: f64, u: f64, at: Point },
    // Collinear overlapping span as parameter ranges on each segment (ordered)
    CollinearOverlap { t0: f64, t1: f64, u0: f64, u1: f64 },
}

#[inline]
fn orient(ax: f64, ay: f64, bx: f64, by: f64, cx: f64, cy: f64) -> f64 {
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

#[inline]
fn within(x: f64, eps: f64) -> bool { x.abs() <= eps }

#[inline]
fn clamp01(x: f64) -> f64 { x.clamp(0.0, 1.0) }

// Project both segments onto the dominant axis of AB and intersect the
// parameter ranges.
fn collinear_overlap(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64), eps: f64) -> SegIntersection {
    let horizontal = (b.0 - a.0).abs() >= (b.1 - a.1).abs();
    let pick = |p: (f64, f64)| if horizontal { p.0 } else { p.1 };
    let (pa, pb, pc, pd) = (pick(a), pick(b), pick(c), pick(d));
    let len_ab = pb - pa;
    let len_cd = pd - pc;
    if within(len_ab, eps) {
        let u = if within(len_cd, eps) { 0.0 } else { (pa - pc) / len_cd };
        if !(-eps..=1.0 + eps).contains(&u) { return SegIntersection::None; }
        return SegIntersection::Touch { t: 0.0, u: clamp01(u), at: Point::new(a.0 as f32, a.1 as f32) };
    }
    let tc = (pc - pa) / len_ab;
    let td = (pd - pa) / len_ab;
    let lo = tc.min(td).max(0.0);
    let hi = tc.max(td).min(1.0);
    if hi < lo - eps { return SegIntersection::None; }
    let to_u = |t: f64| if within(len_cd, eps) { 0.0 } else { (pa + t * len_ab - pc) / len_cd };
    let (u0, u1) = (to_u(lo), to_u(hi));
    let (u0, u1) = if u0 <= u1 { (u0, u1) } else { (u1, u0) };
    SegIntersection::CollinearOverlap { t0: lo, t1: hi.max(lo), u0, u1 }
}

pub fn intersect_segments(a: Point, b: Point, c: Point, d: Point, eps_pos: f32, eps_denom: f32) -> SegIntersection {
    let a = (a.x as f64, a.y as f64); let b = (b.x as f64, b.y as f64);
    let c = (c.x as f64, c.y as f64); let d = (d.x as f64, d.y as f64);
    let eps = eps_pos as f64;

    let o1 = orient(a.0, a.1, b.0, b.1, c.0, c.1);
    let o2 = orient(a.0, a.1, b.0, b.1, d.0, d.1);
    let o3 = orient(c.0, c.1, d.0, d.1, a.0, a.1);
    let o4 = orient(c.0, c.1, d.0, d.1, b.0, b.1);

    if within(o1, eps) && within(o2, eps) && within(o3, eps) && within(o4, eps) {
        return collinear_overlap(a, b, c, d, eps);
    }

    let straddle1 = (o1 > 0.0) != (o2 > 0.0) || within(o1, eps) || within(o2, eps);
    let straddle2 = (o3 > 0.0) != (o4 > 0.0) || within(o3, eps) || within(o4, eps);
    if !(straddle1 && straddle2) {
        return SegIntersection::None;
    }

    let (rx, ry) = (b.0 - a.0, b.1 - a.1);
    let (sx, sy) = (d.0 - c.0, d.1 - c.1);
    let rxs = rx * sy - ry * sx;
    if within(rxs, eps_denom as f64) {
        return SegIntersection::None;
    }
    let (qx, qy) = (c.0 - a.0, c.1 - a.1);
    let t = (qx * sy - qy * sx) / rxs;
    let u = (qx * ry - qy * rx) / rxs;
    if t < -eps || t > 1.0 + eps || u < -eps || u > 1.0 + eps {
        return SegIntersection::None;
    }
    let at = Point::new((a.0 + t * rx) as f32, (a.1 + t * ry) as f32);
    let touch = within(t, eps) || within(1.0 - t, eps) || within(u, eps) || within(1.0 - u, eps);
    if touch {
        SegIntersection::Touch { t: clamp01(t), u: clamp01(u), at }
    } else {
        SegIntersection::Proper { t, u, at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EP: f32 = 1e-4;
    const ED: f32 = 1e-8;

    fn p(x: f32, y: f32) -> Point { Point::new(x, y) }

    #[test]
    fn plus_crossing_is_proper() {
        let r = intersect_segments(p(0.0, 50.0), p(100.0, 50.0), p(40.0, 0.0), p(40.0, 100.0), EP, ED);
        match r {
            SegIntersection::Proper { t, u, at } => {
                assert!((t - 0.4).abs() < 1e-9 && (u - 0.5).abs() < 1e-9);
                assert_eq!(at, p(40.0, 50.0));
            }
            _ => panic!("expected proper, got {:?}", r),
        }
    }

    #[test]
    fn tee_is_touch_with_interior_param_on_the_bar() {
        let r = intersect_segments(p(0.0, 0.0), p(100.0, 0.0), p(30.0, 0.0), p(30.0, 50.0), EP, ED);
        match r {
            SegIntersection::Touch { t, u, .. } => {
                assert!((t - 0.3).abs() < 1e-9);
                assert!(u.abs() < 1e-9);
            }
            _ => panic!("expected touch, got {:?}", r),
        }
    }

    #[test]
    fn collinear_overlap_ranges() {
        let r = intersect_segments(p(0.0, 0.0), p(3.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), EP, ED);
        match r {
            SegIntersection::CollinearOverlap { t0, t1, .. } => assert!(t0 >= 0.33 && t1 <= 0.67),
            _ => panic!("expected overlap"),
        }
    }

    #[test]
    fn parallel_disjoint_is_none() {
        let r = intersect_segments(p(0.0, 0.0), p(10.0, 0.0), p(0.0, 5.0), p(10.0, 5.0), EP, ED);
        assert_eq!(r, SegIntersection::None);
    }
}
