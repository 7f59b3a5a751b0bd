//! Collapse/expand protocol for sliding a two-pin component along the
//! straight run it sits on.
//!
//! `begin` replaces every segment of the run with one temporary wire,
//! `update` moves the component inside a precomputed interval, `finish`
//! regenerates the wire gaps between the components resident on the run
//! and hands each gap the stroke of the closest original segment.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::algorithms::normalize::normalize;
use crate::algorithms::topology::Topology;
use crate::config::EngineConfig;
use crate::geometry::math::{dist_point_to_seg, extent_along, overlap_len};
use crate::geometry::tolerance::{clamp, ordered, snap};
use crate::model::{Axis, ComponentId, NodeKey, Point, Stroke, SwpId, WireId};
use crate::store::Store;

/// One original run segment captured at collapse time.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotSegment {
    pub a: Point,
    pub b: Point,
    pub stroke: Stroke,
    pub net: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveContext {
    pub component: ComponentId,
    pub swp: SwpId,
    pub axis: Axis,
    /// Coordinate held fixed along the run.
    pub fixed: f32,
    /// Original run endpoints along the axis.
    pub span: (f32, f32),
    /// Allowed range of the component center along the axis.
    pub interval: (f32, f32),
    pub snapshot: Vec<SnapshotSegment>,
    pub temp_wire: WireId,
    pub origin: Point,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum MoveSession {
    #[default]
    Idle,
    Collapsed(MoveContext),
}

impl MoveSession {
    pub fn is_active(&self) -> bool {
        matches!(self, MoveSession::Collapsed(_))
    }

    pub fn context(&self) -> Option<&MoveContext> {
        match self {
            MoveSession::Collapsed(ctx) => Some(ctx),
            MoveSession::Idle => None,
        }
    }

    pub fn component(&self) -> Option<ComponentId> {
        self.context().map(|c| c.component)
    }

    /// Leave the collapsed state, handing back its context.
    pub fn take(&mut self) -> Option<MoveContext> {
        match std::mem::take(self) {
            MoveSession::Collapsed(ctx) => Some(ctx),
            MoveSession::Idle => None,
        }
    }
}

/// Collapse the run hosting `component`. Returns `None` when the component
/// is unknown, has no pin line, or is not mapped onto a run.
pub fn begin(store: &mut Store, topo: &Topology, component: ComponentId, eps: f32) -> Option<MoveContext> {
    let comp = store.component(component)?.clone();
    let swp_id = topo.swp_id_for_component(component)?;
    let swp = topo.swp(swp_id)?;
    let axis = swp.axis;
    let fixed = swp.across();
    let span = swp.span();

    let mut by_wire: BTreeMap<WireId, BTreeSet<usize>> = BTreeMap::new();
    for &(wire, index) in &swp.segments {
        by_wire.entry(wire).or_default().insert(index);
    }
    let mut snapshot = Vec::new();
    for (wire, indices) in by_wire {
        for (a, b, stroke, net) in store.remove_segments(wire, &indices) {
            let on_line = Axis::of_points(a, b) == axis
                && (axis.across(a) - fixed).abs() <= eps
                && (axis.across(b) - fixed).abs() <= eps;
            if !on_line {
                store.insert_wire(vec![a, b], stroke, net);
                continue;
            }
            // pieces sticking out past the run ends stay in the store
            let (lo, hi) = extent_along(axis, a, b);
            if lo < span.0 - eps {
                let pts = vec![axis.point(lo, fixed), axis.point(span.0, fixed)];
                store.insert_wire(pts, stroke, net.clone());
            }
            if hi > span.1 + eps {
                let pts = vec![axis.point(span.1, fixed), axis.point(hi, fixed)];
                store.insert_wire(pts, stroke, net.clone());
            }
            let (lo, hi) = (lo.max(span.0), hi.min(span.1));
            if hi - lo > eps {
                snapshot.push(SnapshotSegment {
                    a: axis.point(lo, fixed),
                    b: axis.point(hi, fixed),
                    stroke,
                    net,
                });
            }
        }
    }

    let temp_stroke = snapshot.first().map(|s| s.stroke).unwrap_or_default();
    let temp_wire = store.insert_wire(vec![swp.start, swp.end], temp_stroke, None);

    let half = comp.half_span();
    let center = axis.along(comp.position);
    let mut lo = span.0 + half;
    let mut hi = span.1 - half;
    for &other in &swp.components {
        if other == component {
            continue;
        }
        let Some(o) = store.component(other) else {
            continue;
        };
        let sep = half + o.half_span();
        let t = axis.along(o.position);
        if t < center {
            lo = lo.max(t + sep);
        } else {
            hi = hi.min(t - sep);
        }
    }
    // the current position always stays reachable
    let interval = (lo.min(center), hi.max(center));

    log::debug!(
        "move: collapsed run {} ({} segments) for component {}, interval {:?}",
        swp_id,
        snapshot.len(),
        component,
        interval
    );
    Some(MoveContext {
        component,
        swp: swp_id,
        axis,
        fixed,
        span,
        interval,
        snapshot,
        temp_wire,
        origin: comp.position,
    })
}

/// Try to place the component at `candidate`. Returns false (and keeps the
/// prior position) when the step would overlap another component.
pub fn update(store: &mut Store, ctx: &MoveContext, candidate: Point, config: &EngineConfig) -> bool {
    let t = snap(ctx.axis.along(candidate), config.grid);
    let t = clamp(t, ctx.interval.0, ctx.interval.1);
    let target = ctx.axis.point(t, ctx.fixed);
    let Some(comp) = store.component(ctx.component) else {
        return false;
    };
    if comp.position == target {
        return true;
    }
    let body = comp.bounds_at(target);
    let pins: HashSet<NodeKey> = comp.pins_at(target).iter().map(|p| p.key()).collect();
    let blocked = store.components().iter().any(|o| {
        o.id != ctx.component && (o.bounds().overlaps(&body) || o.pins().iter().any(|p| pins.contains(&p.key())))
    });
    if blocked {
        return false;
    }
    if let Some(c) = store.component_mut(ctx.component) {
        c.position = target;
    }
    true
}

/// Expand the run again around the components that now sit on it.
pub fn finish(store: &mut Store, ctx: MoveContext, config: &EngineConfig) {
    let eps = config.coincide_eps;
    let tol = config.map_tolerance;
    store.remove_wire(ctx.temp_wire);
    let (axis, fixed, span) = (ctx.axis, ctx.fixed, ctx.span);

    if let Some(c) = store.component_mut(ctx.component) {
        let half = c.half_span();
        let (lo, hi) = (span.0 + half, span.1 - half);
        let t = axis.along(c.position);
        let t = if lo <= hi { clamp(t, lo, hi) } else { t };
        c.position = axis.point(t, fixed);
    }

    let on_line = |p: Point| (axis.across(p) - fixed).abs() <= tol;
    let in_span = |t: f32| t >= span.0 - tol && t <= span.1 + tol;

    let mut resident: Vec<(f32, f32)> = Vec::new();
    let mut anchors: Vec<f32> = Vec::new();
    // two-pin parts lying along the line, resident or not
    let mut along: Vec<ComponentId> = Vec::new();
    for c in store.components() {
        match c.two_pins() {
            Some((a, b)) if on_line(a) && on_line(b) && Axis::of_points(a, b) == axis => {
                along.push(c.id);
                if in_span(axis.along(a)) && in_span(axis.along(b)) {
                    resident.push(extent_along(axis, a, b));
                }
            }
            _ => {
                for p in c.pins() {
                    if on_line(p) {
                        anchors.push(axis.along(p));
                    }
                }
            }
        }
    }
    for j in store.junctions() {
        if j.is_visible() && on_line(j.position) {
            anchors.push(axis.along(j.position));
        }
    }
    // where two snapshot segments of different stroke or net meet end to end
    let mut pieces: Vec<(f32, f32, &SnapshotSegment)> = ctx
        .snapshot
        .iter()
        .map(|s| {
            let (lo, hi) = extent_along(axis, s.a, s.b);
            (lo, hi, s)
        })
        .collect();
    pieces.sort_by(|x, y| x.0.total_cmp(&y.0));
    for w in pieces.windows(2) {
        let ((_, prev_hi, prev), (next_lo, _, next)) = (w[0], w[1]);
        if (next_lo - prev_hi).abs() <= eps && (prev.stroke != next.stroke || prev.net != next.net) {
            anchors.push(prev_hi);
        }
    }
    resident.sort_by(|a, b| a.0.total_cmp(&b.0));
    anchors.sort_by(f32::total_cmp);

    let mut gaps: Vec<(f32, f32)> = Vec::new();
    let mut cursor = span.0;
    for &(lo, hi) in &resident {
        gaps.push((cursor, lo));
        cursor = cursor.max(hi);
    }
    gaps.push((cursor, span.1));

    let mut produced = 0;
    for (g0, g1) in gaps {
        let mut cuts = vec![g0];
        cuts.extend(anchors.iter().copied().filter(|&t| t > g0 + eps && t < g1 - eps));
        cuts.push(g1);
        for w in cuts.windows(2) {
            let (lo, hi) = (w[0], w[1]);
            let (a, b) = (axis.point(lo, fixed), axis.point(hi, fixed));
            if hi - lo <= eps || a.key() == b.key() {
                continue;
            }
            let (stroke, net) = match_stroke(&ctx.snapshot, axis, a, b, config.stroke_match_tolerance);
            store.insert_wire(vec![a, b], stroke, net);
            produced += 1;
        }
    }

    normalize(store);
    let cuts = cut_through_components(store, &along, eps);
    log::debug!(
        "move: finished component {} with {} gap wire(s), {} body cut(s)",
        ctx.component,
        produced,
        cuts
    );
}

/// Stroke and net of the snapshot segment closest to gap `ab`.
fn match_stroke(
    snapshot: &[SnapshotSegment],
    axis: Axis,
    a: Point,
    b: Point,
    tol: f32,
) -> (Stroke, Option<String>) {
    let mid = Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5);
    let dist = |s: &SnapshotSegment| dist_point_to_seg(mid, s.a, s.b);
    let nearest = snapshot.iter().min_by(|x, y| dist(x).total_cmp(&dist(y)));
    let pick = match nearest {
        Some(s) if dist(s) <= tol => Some(s),
        _ => {
            let (g0, g1) = extent_along(axis, a, b);
            let overlap = |s: &SnapshotSegment| {
                let (s0, s1) = extent_along(axis, s.a, s.b);
                overlap_len(g0, g1, s0, s1)
            };
            snapshot
                .iter()
                .filter(|s| overlap(s) > 0.0)
                .max_by(|x, y| overlap(x).total_cmp(&overlap(y)))
                .or(nearest)
        }
    };
    match pick {
        Some(s) => (s.stroke, s.net.clone()),
        None => (Stroke::default(), None),
    }
}

/// Remove the part of any axis-aligned wire segment lying between the pins
/// of the listed two-pin components. Returns the number of cuts.
///
/// Only `parts` are checked, so one call costs a pass over the wires per
/// listed part.
pub fn cut_through_components(store: &mut Store, parts: &[ComponentId], eps: f32) -> usize {
    let bodies: Vec<(Axis, f32, f32, f32)> = parts
        .iter()
        .filter_map(|&id| {
            let (a, b) = store.component(id)?.two_pins()?;
            let axis = Axis::of_points(a, b);
            if axis == Axis::None {
                return None;
            }
            let (lo, hi) = extent_along(axis, a, b);
            Some((axis, axis.across(a), lo, hi))
        })
        .collect();

    let mut cuts = 0;
    for (axis, fixed, lo, hi) in bodies {
        let hits: Vec<(WireId, usize)> = store
            .wires()
            .iter()
            .flat_map(|w| {
                (0..w.segment_count()).filter_map(move |i| {
                    let (a, b) = w.segment(i)?;
                    if Axis::of_points(a, b) != axis
                        || (axis.across(a) - fixed).abs() > eps
                        || (axis.across(b) - fixed).abs() > eps
                    {
                        return None;
                    }
                    let (s0, s1) = extent_along(axis, a, b);
                    (s0 < hi - eps && s1 > lo + eps).then_some((w.id, i))
                })
            })
            .collect();
        let mut by_wire: BTreeMap<WireId, BTreeSet<usize>> = BTreeMap::new();
        for (w, i) in hits {
            by_wire.entry(w).or_default().insert(i);
        }
        for (wire, indices) in by_wire {
            for (a, b, stroke, net) in store.remove_segments(wire, &indices) {
                let (s0, s1) = extent_along(axis, a, b);
                for (p0, p1) in [(s0, lo), (hi, s1)] {
                    let (p0, p1) = ordered(p0, p1);
                    if s0 <= p0 && p1 <= s1 && p1 - p0 > eps {
                        let pts = vec![axis.point(p0, fixed), axis.point(p1, fixed)];
                        store.insert_wire(pts, stroke, net.clone());
                    }
                }
                cuts += 1;
            }
        }
    }
    cuts
}
