//! Intersection pre-pass of the topology build.
//!
//! Stored wires are never modified here. The pass produces working
//! polylines in which every true crossing of two perpendicular
//! axis-aligned segments and every T contact (a wire end landing inside
//! another wire's segment) is an explicit vertex.

use std::collections::{HashMap, HashSet};

use crate::geometry::intersect::{intersect_segments, SegIntersection};
use crate::geometry::math::{on_segment_interior, project_param};
use crate::geometry::tolerance::EPS_DENOM;
use crate::model::{Axis, Point, Wire, WireId};

const CELL: f32 = 64.0;

/// Uniform bucket grid over segment bounding boxes.
#[derive(Debug, Default)]
pub struct SegmentGrid {
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

#[inline]
fn cell_ix(v: f32) -> i32 {
    (v / CELL).floor() as i32
}

impl SegmentGrid {
    pub fn new() -> Self {
        SegmentGrid::default()
    }

    pub fn insert(&mut self, idx: usize, a: Point, b: Point, pad: f32) {
        let (ix0, ix1) = (cell_ix(a.x.min(b.x) - pad), cell_ix(a.x.max(b.x) + pad));
        let (iy0, iy1) = (cell_ix(a.y.min(b.y) - pad), cell_ix(a.y.max(b.y) + pad));
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                self.buckets.entry((ix, iy)).or_default().push(idx);
            }
        }
    }

    /// Segments whose padded box covers the cell of `p`.
    pub fn near(&self, p: Point) -> &[usize] {
        self.buckets
            .get(&(cell_ix(p.x), cell_ix(p.y)))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every unordered pair sharing at least one bucket, once.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut tested: HashSet<(usize, usize)> = HashSet::new();
        let mut out = Vec::new();
        for list in self.buckets.values() {
            if list.len() < 2 {
                continue;
            }
            for a in 0..list.len() {
                for b in (a + 1)..list.len() {
                    let (i, j) = (list[a], list[b]);
                    let pair = if i < j { (i, j) } else { (j, i) };
                    if tested.insert(pair) {
                        out.push(pair);
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }
}

/// A stored wire as seen by the topology build.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkingWire {
    pub id: WireId,
    pub points: Vec<Point>,
    /// For each working segment, the index of the stored segment it lies on.
    pub sources: Vec<usize>,
}

impl WorkingWire {
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SplitPlan {
    pub wires: Vec<WorkingWire>,
    pub crossings: usize,
    pub tees: usize,
}

#[derive(Clone, Copy)]
struct Seg {
    wire: usize,
    index: usize,
    a: Point,
    b: Point,
    axis: Axis,
    // first kept segment of its wire
    starts_wire: bool,
}

pub fn split_at_intersections(wires: &[Wire], eps: f32) -> SplitPlan {
    let mut segs: Vec<Seg> = Vec::new();
    for (wi, w) in wires.iter().enumerate() {
        let n = w.segment_count();
        for i in 0..n {
            let (a, b) = (w.points[i], w.points[i + 1]);
            if a.key() == b.key() {
                continue;
            }
            segs.push(Seg {
                wire: wi,
                index: i,
                a,
                b,
                axis: Axis::of_points(a, b),
                starts_wire: segs.last().map_or(true, |s: &Seg| s.wire != wi),
            });
        }
    }

    let mut grid = SegmentGrid::new();
    for (i, s) in segs.iter().enumerate() {
        grid.insert(i, s.a, s.b, eps);
    }

    // inserted vertices per flattened segment, as (param, point)
    let mut inserts: Vec<Vec<(f32, Point)>> = vec![Vec::new(); segs.len()];
    let mut plan = SplitPlan::default();

    for (i, j) in grid.candidate_pairs() {
        let (si, sj) = (segs[i], segs[j]);
        if si.wire == sj.wire {
            continue;
        }
        let hit = intersect_segments(si.a, si.b, sj.a, sj.b, eps, EPS_DENOM);
        if hit == SegIntersection::None {
            continue;
        }
        if let SegIntersection::Proper { .. } = hit {
            if si.axis != Axis::None && sj.axis == si.axis.perpendicular() {
                // exact grid point: fixed coordinate of each line
                let at = si.axis.point(sj.axis.across(sj.a), si.axis.across(si.a));
                inserts[i].push((project_param(at, si.a, si.b), at));
                inserts[j].push((project_param(at, sj.a, sj.b), at));
                plan.crossings += 1;
            }
            continue;
        }
        // T contacts: any vertex of one wire inside the other's segment.
        // Each vertex is owned by exactly one segment: its `b`, or `a` for
        // the first segment of the wire.
        for (end_seg, host, host_idx) in [(si, sj, j), (sj, si, i)] {
            let mut ends = Vec::with_capacity(2);
            if end_seg.starts_wire {
                ends.push(end_seg.a);
            }
            ends.push(end_seg.b);
            for p in ends {
                if on_segment_interior(p, host.a, host.b, eps) {
                    inserts[host_idx].push((project_param(p, host.a, host.b), p));
                    plan.tees += 1;
                }
            }
        }
    }

    let mut by_wire: Vec<Vec<usize>> = vec![Vec::new(); wires.len()];
    for (i, s) in segs.iter().enumerate() {
        by_wire[s.wire].push(i);
    }
    for (wi, w) in wires.iter().enumerate() {
        let mut points: Vec<Point> = Vec::with_capacity(w.points.len());
        let mut sources: Vec<usize> = Vec::new();
        let mut push = |p: Point, source: Option<usize>, points: &mut Vec<Point>| {
            if let Some(last) = points.last() {
                if last.key() == p.key() {
                    return;
                }
                if let Some(src) = source {
                    sources.push(src);
                }
            }
            points.push(p);
        };
        for &si in &by_wire[wi] {
            let s = segs[si];
            let mut mids = std::mem::take(&mut inserts[si]);
            mids.sort_by(|a, b| a.0.total_cmp(&b.0));
            push(s.a, Some(s.index), &mut points);
            for (_, p) in mids {
                push(p, Some(s.index), &mut points);
            }
            push(s.b, Some(s.index), &mut points);
        }
        if points.len() >= 2 {
            plan.wires.push(WorkingWire {
                id: w.id,
                points,
                sources,
            });
        }
    }
    plan
}
