//! Canonicalization of stored wires and inline merging of collinear runs.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::algorithms::intersections::SegmentGrid;
use crate::geometry::math::on_segment_interior;
use crate::model::{Axis, NodeKey, Point, Wire};
use crate::store::Store;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Wires that were already a single 2-point piece and kept their id.
    pub kept: usize,
    /// Fresh pieces minted from polylines.
    pub produced: usize,
    /// Wires that collapsed to nothing.
    pub dropped: usize,
}

impl NormalizeStats {
    pub fn changed(&self) -> bool {
        self.produced > 0 || self.dropped > 0
    }
}

/// Split every stored polyline into 2-point wires. Consecutive vertices on
/// the same node key collapse; pieces of zero length disappear. A wire that
/// yields exactly one piece keeps its id, otherwise each piece gets a new
/// id and inherits stroke and net.
pub fn normalize(store: &mut Store) -> NormalizeStats {
    let mut stats = NormalizeStats::default();
    let old = std::mem::take(&mut store.wires);
    let mut out: Vec<Wire> = Vec::with_capacity(old.len());
    for w in old {
        let mut pts: Vec<Point> = Vec::with_capacity(w.points.len());
        for p in &w.points {
            if pts.last().map_or(true, |l: &Point| l.key() != p.key()) {
                pts.push(*p);
            }
        }
        match pts.len() {
            0 | 1 => stats.dropped += 1,
            2 => {
                stats.kept += 1;
                out.push(Wire { points: pts, ..w });
            }
            _ => {
                for pair in pts.windows(2) {
                    let id = store.mint_wire_id();
                    out.push(Wire {
                        id,
                        points: vec![pair[0], pair[1]],
                        stroke: w.stroke,
                        net: w.net.clone(),
                    });
                    stats.produced += 1;
                }
            }
        }
    }
    store.wires = out;
    stats
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnifyAbort {
    /// A pass merged something but the wire count did not drop.
    NoProgress { wires: usize },
    /// The wire-state signature seen before a pass repeated.
    CycleDetected { pass: usize },
    /// The configured pass cap was reached.
    PassLimit { passes: usize },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnifyReport {
    pub merges: usize,
    pub passes: usize,
    pub aborted: Option<UnifyAbort>,
}

/// Fixed-point merge of end-to-end collinear wires.
///
/// `blocked` holds node keys that must stay split (component pins, visible
/// junctions). Each pass normalizes first, then merges every eligible pair
/// that does not share a wire with another merge of the same pass.
pub fn unify_inline(store: &mut Store, blocked: &HashSet<NodeKey>, eps: f32, max_passes: usize) -> UnifyReport {
    let mut report = UnifyReport::default();
    let mut seen: HashSet<u64> = HashSet::new();
    loop {
        normalize(store);
        if !seen.insert(signature(&store.wires)) {
            report.aborted = Some(UnifyAbort::CycleDetected { pass: report.passes });
            break;
        }
        if report.passes >= max_passes {
            report.aborted = Some(UnifyAbort::PassLimit { passes: report.passes });
            break;
        }
        report.passes += 1;
        let before = store.wires.len();
        let merged = merge_pass(store, blocked, eps);
        if merged == 0 {
            break;
        }
        if store.wires.len() >= before {
            report.aborted = Some(UnifyAbort::NoProgress { wires: store.wires.len() });
            break;
        }
        report.merges += merged;
    }
    if let Some(abort) = report.aborted {
        log::error!(
            "unify_inline aborted after {} pass(es), {} merge(s): {:?}",
            report.passes,
            report.merges,
            abort
        );
    }
    report
}

fn signature(wires: &[Wire]) -> u64 {
    let mut sorted: Vec<&Wire> = wires.iter().collect();
    sorted.sort_by_key(|w| w.id);
    let mut h = DefaultHasher::new();
    for w in sorted {
        w.id.hash(&mut h);
        for p in &w.points {
            p.x.to_bits().hash(&mut h);
            p.y.to_bits().hash(&mut h);
        }
    }
    h.finish()
}

fn merge_pass(store: &mut Store, blocked: &HashSet<NodeKey>, eps: f32) -> usize {
    let wires = &store.wires;
    let mut ends: HashMap<NodeKey, Vec<(usize, usize)>> = HashMap::new();
    let mut grid = SegmentGrid::new();
    for (i, w) in wires.iter().enumerate() {
        if w.points.len() != 2 {
            continue;
        }
        ends.entry(w.points[0].key()).or_default().push((i, 0));
        ends.entry(w.points[1].key()).or_default().push((i, 1));
        grid.insert(i, w.points[0], w.points[1], eps);
    }

    let mut keys: Vec<NodeKey> = ends.keys().copied().collect();
    keys.sort_unstable();

    let mut used: HashSet<usize> = HashSet::new();
    let mut merges: Vec<(usize, usize, Vec<Point>)> = Vec::new();
    for key in keys {
        let at = &ends[&key];
        if at.len() != 2 || blocked.contains(&key) {
            continue;
        }
        let ((wi, ei), (wj, ej)) = (at[0], at[1]);
        if wi == wj || used.contains(&wi) || used.contains(&wj) {
            continue;
        }
        let (a, b) = (&wires[wi], &wires[wj]);
        let axis = Axis::of_points(a.points[0], a.points[1]);
        if axis == Axis::None || Axis::of_points(b.points[0], b.points[1]) != axis {
            continue;
        }
        let joint = a.points[ei];
        let far_a = a.points[1 - ei];
        let far_b = b.points[1 - ej];
        let da = axis.along(far_a) - axis.along(joint);
        let db = axis.along(far_b) - axis.along(joint);
        // must extend in opposite directions, otherwise they fold back
        if da * db >= 0.0 {
            continue;
        }
        let passes_through = grid.near(joint).iter().any(|&k| {
            k != wi && k != wj && on_segment_interior(joint, wires[k].points[0], wires[k].points[1], eps)
        });
        if passes_through {
            continue;
        }
        // earlier-created wire keeps its identity and orientation
        let (keep, keep_end, other_far) = if a.id <= b.id { (wi, ei, far_b) } else { (wj, ej, far_a) };
        let keep_far = wires[keep].points[1 - keep_end];
        let points = if keep_end == 1 { vec![keep_far, other_far] } else { vec![other_far, keep_far] };
        let drop = if keep == wi { wj } else { wi };
        used.insert(wi);
        used.insert(wj);
        merges.push((keep, drop, points));
    }

    let count = merges.len();
    if count == 0 {
        return 0;
    }
    let mut dropped: HashSet<usize> = HashSet::new();
    for (keep, drop, points) in merges {
        store.wires[keep].points = points;
        dropped.insert(drop);
    }
    let mut idx = 0;
    store.wires.retain(|_| {
        let k = !dropped.contains(&idx);
        idx += 1;
        k
    });
    count
}
