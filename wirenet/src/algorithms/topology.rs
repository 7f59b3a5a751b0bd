//! Derived connectivity view: nodes keyed by rounded coordinates, edges
//! from working wire segments plus component bridges, and the maximal
//! straight runs (SWPs) walked over them.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::algorithms::intersections::{split_at_intersections, WorkingWire};
use crate::config::EngineConfig;
use crate::model::{Axis, Color, ComponentId, NodeKey, Point, SwpId, WireId};
use crate::model::StylePalette;
use crate::store::Store;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopoNode {
    pub key: NodeKey,
    pub pos: Point,
    pub edges: Vec<usize>,
    /// Incident edge count per axis slot (x, y, none).
    pub degree: [u32; 3],
    /// Wires whose first or last working point sits here.
    pub terminating: BTreeSet<WireId>,
    /// Wires with an interior working vertex here.
    pub passing: BTreeSet<WireId>,
}

impl TopoNode {
    fn new(key: NodeKey, pos: Point) -> Self {
        TopoNode {
            key,
            pos,
            edges: Vec::new(),
            degree: [0; 3],
            terminating: BTreeSet::new(),
            passing: BTreeSet::new(),
        }
    }

    pub fn axis_degree(&self, axis: Axis) -> u32 {
        self.degree[axis.slot()]
    }

    /// Distinct wires touching the node.
    pub fn wire_count(&self) -> usize {
        self.terminating.union(&self.passing).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EdgeSource {
    /// `index` is the stored segment, `working` the working segment.
    Wire { wire: WireId, index: usize, working: usize },
    Bridge { component: ComponentId },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopoEdge {
    pub id: usize,
    pub a: NodeKey,
    pub b: NodeKey,
    pub axis: Axis,
    pub source: EdgeSource,
}

impl TopoEdge {
    pub fn other(&self, k: NodeKey) -> NodeKey {
        if self.a == k {
            self.b
        } else {
            self.a
        }
    }
}

/// Straight wire path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Swp {
    pub id: SwpId,
    pub axis: Axis,
    /// Smaller end along the axis.
    pub start: Point,
    pub end: Point,
    pub edges: Vec<usize>,
    pub wires: Vec<WireId>,
    /// Stored segments `(wire, index)` on the run.
    pub segments: Vec<(WireId, usize)>,
    pub components: Vec<ComponentId>,
    pub color: Color,
}

impl Swp {
    /// Fixed coordinate of the run.
    pub fn across(&self) -> f32 {
        self.axis.across(self.start)
    }

    pub fn span(&self) -> (f32, f32) {
        (self.axis.along(self.start), self.axis.along(self.end))
    }

    pub fn contains(&self, p: Point, tol: f32) -> bool {
        let (lo, hi) = self.span();
        let t = self.axis.along(p);
        (self.axis.across(p) - self.across()).abs() <= tol && t >= lo - tol && t <= hi + tol
    }
}

#[derive(Clone, Debug, Default)]
pub struct Topology {
    pub(crate) nodes: HashMap<NodeKey, TopoNode>,
    pub(crate) edges: Vec<TopoEdge>,
    pub(crate) swps: Vec<Swp>,
    pub(crate) component_to_swp: HashMap<ComponentId, SwpId>,
    pub(crate) segment_to_swp: HashMap<(WireId, usize), SwpId>,
    pub(crate) working: Vec<WorkingWire>,
    pub(crate) crossings: usize,
    pub(crate) tees: usize,
    pub(crate) built_ver: u64,
}

impl Topology {
    pub fn node(&self, key: NodeKey) -> Option<&TopoNode> {
        self.nodes.get(&key)
    }

    pub fn node_at(&self, p: Point) -> Option<&TopoNode> {
        self.nodes.get(&p.key())
    }

    /// Nodes sorted by key.
    pub fn nodes(&self) -> Vec<&TopoNode> {
        let mut v: Vec<&TopoNode> = self.nodes.values().collect();
        v.sort_by_key(|n| n.key);
        v
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[TopoEdge] {
        &self.edges
    }

    pub fn swps(&self) -> &[Swp] {
        &self.swps
    }

    pub fn swp(&self, id: SwpId) -> Option<&Swp> {
        self.swps.get(id as usize)
    }

    pub fn swp_for_segment(&self, wire: WireId, index: usize) -> Option<&Swp> {
        self.segment_to_swp.get(&(wire, index)).and_then(|&id| self.swp(id))
    }

    pub fn swp_id_for_component(&self, component: ComponentId) -> Option<SwpId> {
        self.component_to_swp.get(&component).copied()
    }

    pub fn working_wires(&self) -> &[WorkingWire] {
        &self.working
    }

    pub fn built_ver(&self) -> u64 {
        self.built_ver
    }
}

struct Builder<'a> {
    topo: Topology,
    manual: HashSet<NodeKey>,
    /// Resolved color per stored wire.
    colors: HashMap<WireId, Color>,
    store: &'a Store,
}

impl<'a> Builder<'a> {
    fn node(&mut self, p: Point) -> &mut TopoNode {
        let key = p.key();
        self.topo.nodes.entry(key).or_insert_with(|| TopoNode::new(key, p))
    }

    fn add_edge(&mut self, a: Point, b: Point, source: EdgeSource) {
        let (ka, kb) = (a.key(), b.key());
        let axis = Axis::classify(ka, kb);
        let id = self.topo.edges.len();
        self.topo.edges.push(TopoEdge {
            id,
            a: ka,
            b: kb,
            axis,
            source,
        });
        for p in [a, b] {
            let n = self.node(p);
            n.edges.push(id);
            n.degree[axis.slot()] += 1;
        }
    }

    fn add_wires(&mut self, working: &[WorkingWire]) {
        for ww in working {
            let n = ww.points.len();
            for (k, p) in ww.points.iter().enumerate() {
                let node = self.node(*p);
                if k == 0 || k + 1 == n {
                    node.terminating.insert(ww.id);
                } else {
                    node.passing.insert(ww.id);
                }
            }
            for k in 0..ww.segment_count() {
                self.add_edge(
                    ww.points[k],
                    ww.points[k + 1],
                    EdgeSource::Wire {
                        wire: ww.id,
                        index: ww.sources[k],
                        working: k,
                    },
                );
            }
        }
    }

    // A pin qualifies when exactly one wire touches it and ends there.
    fn sole_wire_at(&self, pin: Point) -> Option<WireId> {
        let node = self.topo.nodes.get(&pin.key())?;
        if node.passing.is_empty() && node.terminating.len() == 1 {
            node.terminating.iter().next().copied()
        } else {
            None
        }
    }

    fn add_bridges(&mut self) {
        let store = self.store;
        for c in store.components() {
            let Some((pa, pb)) = c.two_pins() else {
                continue;
            };
            match (self.sole_wire_at(pa), self.sole_wire_at(pb)) {
                (Some(wa), Some(wb)) if wa != wb => {
                    let (a, b) = (self.topo.nodes[&pa.key()].pos, self.topo.nodes[&pb.key()].pos);
                    self.add_edge(a, b, EdgeSource::Bridge { component: c.id });
                }
                _ => {}
            }
        }
    }

    /// Whether a run along `axis` may pass through `key`.
    fn continues(&self, key: NodeKey, axis: Axis) -> bool {
        let Some(n) = self.topo.nodes.get(&key) else {
            return false;
        };
        if n.axis_degree(axis) != 2 || n.axis_degree(Axis::None) != 0 || self.manual.contains(&key) {
            return false;
        }
        match n.axis_degree(axis.perpendicular()) {
            0 => true,
            // clean crossing only: nothing ends here
            2 => n.terminating.is_empty(),
            _ => false,
        }
    }

    fn next_edge(&self, key: NodeKey, axis: Axis, from: usize, visited: &[bool]) -> Option<usize> {
        let n = self.topo.nodes.get(&key)?;
        n.edges
            .iter()
            .copied()
            .find(|&e| e != from && !visited[e] && self.topo.edges[e].axis == axis)
    }

    fn walk(&self, start_edge: usize, toward: NodeKey, visited: &mut [bool]) -> Vec<usize> {
        let axis = self.topo.edges[start_edge].axis;
        let mut out = Vec::new();
        let (mut at, mut from) = (toward, start_edge);
        while self.continues(at, axis) {
            let Some(e) = self.next_edge(at, axis, from, visited) else {
                break;
            };
            visited[e] = true;
            out.push(e);
            at = self.topo.edges[e].other(at);
            from = e;
        }
        out
    }

    fn build_swps(&mut self, neutral: Color) {
        let mut visited = vec![false; self.topo.edges.len()];
        let mut swps = Vec::new();
        for e in 0..self.topo.edges.len() {
            let edge = &self.topo.edges[e];
            if visited[e] || edge.axis == Axis::None {
                continue;
            }
            visited[e] = true;
            let (a, b) = (edge.a, edge.b);
            let mut back = self.walk(e, a, &mut visited);
            let fwd = self.walk(e, b, &mut visited);
            back.reverse();
            back.push(e);
            back.extend(fwd);
            swps.push(self.make_swp(swps.len() as SwpId, back, neutral));
        }
        for s in &swps {
            for seg in &s.segments {
                self.topo.segment_to_swp.entry(*seg).or_insert(s.id);
            }
        }
        self.topo.swps = swps;
    }

    fn make_swp(&self, id: SwpId, edges: Vec<usize>, neutral: Color) -> Swp {
        let axis = self.topo.edges[edges[0]].axis;
        let mut start = self.topo.nodes[&self.topo.edges[edges[0]].a].pos;
        let mut end = start;
        let mut wires: Vec<WireId> = Vec::new();
        let mut segments: Vec<(WireId, usize)> = Vec::new();
        let mut seen_wires: HashSet<WireId> = HashSet::new();
        let mut seen: HashSet<(WireId, usize)> = HashSet::new();
        let mut colors: Vec<Color> = Vec::new();
        for &e in &edges {
            let edge = &self.topo.edges[e];
            for k in [edge.a, edge.b] {
                let p = self.topo.nodes[&k].pos;
                if axis.along(p) < axis.along(start) {
                    start = p;
                }
                if axis.along(p) > axis.along(end) {
                    end = p;
                }
            }
            if let EdgeSource::Wire { wire, index, .. } = edge.source {
                if seen_wires.insert(wire) {
                    wires.push(wire);
                }
                if seen.insert((wire, index)) {
                    segments.push((wire, index));
                }
                if let Some(&c) = self.colors.get(&wire) {
                    colors.push(c);
                }
            }
        }
        let color = match colors.split_first() {
            Some((first, rest)) if rest.iter().all(|c| c == first) => *first,
            _ => neutral,
        };
        Swp {
            id,
            axis,
            start,
            end,
            edges,
            wires,
            segments,
            components: Vec::new(),
            color,
        }
    }

    fn map_components(&mut self, tol: f32) {
        let store = self.store;
        let mut bridged: HashMap<ComponentId, SwpId> = HashMap::new();
        // runs bucketed by axis and fixed coordinate
        let cell = (2.0 * tol).max(1.0);
        let bucket = |v: f32| (v / cell).floor() as i64;
        let mut lines: HashMap<(Axis, i64), Vec<SwpId>> = HashMap::new();
        for s in &self.topo.swps {
            for &e in &s.edges {
                if let EdgeSource::Bridge { component } = self.topo.edges[e].source {
                    bridged.entry(component).or_insert(s.id);
                }
            }
            lines.entry((s.axis, bucket(s.across()))).or_default().push(s.id);
        }
        for c in store.components() {
            let Some((pa, pb)) = c.two_pins() else {
                continue;
            };
            let (ka, kb) = (pa.key().to_point(), pb.key().to_point());
            let axis = Axis::of_points(ka, kb);
            if axis == Axis::None {
                continue;
            }
            let hit = bridged.get(&c.id).copied().or_else(|| {
                let across = axis.across(ka);
                (bucket(across - tol)..=bucket(across + tol))
                    .filter_map(|k| lines.get(&(axis, k)))
                    .flatten()
                    .copied()
                    .filter(|&id| {
                        let s = &self.topo.swps[id as usize];
                        s.contains(ka, tol) && s.contains(kb, tol)
                    })
                    .min()
            });
            if let Some(id) = hit {
                self.topo.component_to_swp.insert(c.id, id);
                self.topo.swps[id as usize].components.push(c.id);
            }
        }
    }
}

/// Full rebuild from the store. Stored wires are read, never modified.
pub fn build(store: &Store, palette: &StylePalette, config: &EngineConfig, ver: u64) -> Topology {
    let plan = split_at_intersections(store.wires(), config.coincide_eps);
    let mut b = Builder {
        topo: Topology {
            crossings: plan.crossings,
            tees: plan.tees,
            built_ver: ver,
            ..Topology::default()
        },
        manual: store.manual_junction_keys(),
        colors: store
            .wires()
            .iter()
            .map(|w| (w.id, palette.resolve(&w.stroke, w.net.as_deref()).color))
            .collect(),
        store,
    };
    b.add_wires(&plan.wires);
    b.add_bridges();
    b.build_swps(config.neutral_color);
    b.map_components(config.map_tolerance);
    b.topo.working = plan.wires;
    log::debug!(
        "topology: {} nodes, {} edges, {} swps, {} crossings, {} tees",
        b.topo.nodes.len(),
        b.topo.edges.len(),
        b.topo.swps.len(),
        b.topo.crossings,
        b.topo.tees
    );
    b.topo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, LineStyle, Rotation, Stroke};
    use crate::symbols::ComponentKind;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn seg(store: &mut Store, a: (f32, f32), b: (f32, f32)) -> WireId {
        store.insert_wire(vec![p(a.0, a.1), p(b.0, b.1)], Stroke::default(), None)
    }

    fn resistor(store: &mut Store, x: f32, y: f32) -> ComponentId {
        store.insert_component(Component {
            id: 0,
            kind: ComponentKind::Resistor,
            position: p(x, y),
            rotation: Rotation::R0,
            label: "R1".into(),
            value: "10k".into(),
        })
    }

    fn topo(store: &Store) -> Topology {
        build(store, &StylePalette::default(), &EngineConfig::default(), 1)
    }

    #[test]
    fn collinear_chain_is_one_run() {
        let mut s = Store::new();
        seg(&mut s, (0.0, 100.0), (40.0, 100.0));
        seg(&mut s, (40.0, 100.0), (80.0, 100.0));
        seg(&mut s, (80.0, 100.0), (120.0, 100.0));
        let t = topo(&s);
        assert_eq!(t.swps().len(), 1);
        let run = &t.swps()[0];
        assert_eq!(run.axis, Axis::X);
        assert_eq!(run.span(), (0.0, 120.0));
        assert_eq!(run.wires.len(), 3);
    }

    #[test]
    fn bridged_component_joins_the_run() {
        let mut s = Store::new();
        seg(&mut s, (0.0, 100.0), (40.0, 100.0));
        seg(&mut s, (80.0, 100.0), (120.0, 100.0));
        let r = resistor(&mut s, 60.0, 100.0);
        let t = topo(&s);
        assert_eq!(t.swps().len(), 1);
        assert_eq!(t.swp_id_for_component(r), Some(0));
        assert_eq!(t.swps()[0].components, vec![r]);
        assert!(t
            .edges()
            .iter()
            .any(|e| e.source == EdgeSource::Bridge { component: r }));
    }

    #[test]
    fn clean_crossing_keeps_runs_whole() {
        let mut s = Store::new();
        seg(&mut s, (0.0, 50.0), (100.0, 50.0));
        seg(&mut s, (40.0, 0.0), (40.0, 100.0));
        let t = topo(&s);
        assert_eq!(t.swps().len(), 2);
        let node = t.node(NodeKey(40, 50)).unwrap();
        assert_eq!(node.degree, [2, 2, 0]);
        assert_eq!(node.passing.len(), 2);
        assert!(t.swps().iter().all(|r| r.edges.len() == 2));
    }

    #[test]
    fn tee_splits_the_bar_into_two_runs() {
        let mut s = Store::new();
        let bar = seg(&mut s, (0.0, 0.0), (100.0, 0.0));
        seg(&mut s, (30.0, 0.0), (30.0, 50.0));
        let t = topo(&s);
        // left bar, right bar, stem
        assert_eq!(t.swps().len(), 3);
        assert_eq!(t.swp_for_segment(bar, 0).map(|r| r.span()), Some((0.0, 30.0)));
    }

    #[test]
    fn manual_junction_terminates_a_run() {
        let mut s = Store::new();
        seg(&mut s, (0.0, 0.0), (40.0, 0.0));
        seg(&mut s, (40.0, 0.0), (80.0, 0.0));
        s.junctions.push(crate::model::Junction {
            manual: true,
            ..crate::model::Junction::automatic(p(40.0, 0.0))
        });
        assert_eq!(topo(&s).swps().len(), 2);
    }

    #[test]
    fn mixed_colors_fall_back_to_neutral() {
        let mut s = Store::new();
        let red = Stroke::explicit(2.0, LineStyle::Solid, Color::rgb(255, 0, 0));
        s.insert_wire(vec![p(0.0, 0.0), p(40.0, 0.0)], red, None);
        s.insert_wire(vec![p(40.0, 0.0), p(80.0, 0.0)], red, None);
        let t = topo(&s);
        assert_eq!(t.swps()[0].color, Color::rgb(255, 0, 0));

        seg(&mut s, (80.0, 0.0), (120.0, 0.0));
        let t = topo(&s);
        assert_eq!(t.swps()[0].color, EngineConfig::default().neutral_color);
    }

    #[test]
    fn pin_touching_two_wires_is_not_bridged() {
        let mut s = Store::new();
        seg(&mut s, (0.0, 100.0), (40.0, 100.0));
        seg(&mut s, (40.0, 100.0), (40.0, 200.0));
        seg(&mut s, (80.0, 100.0), (120.0, 100.0));
        let r = resistor(&mut s, 60.0, 100.0);
        let t = topo(&s);
        assert!(t.edges().iter().all(|e| e.source != EdgeSource::Bridge { component: r }));
        assert_eq!(t.swp_id_for_component(r), None);
    }

    #[test]
    fn unaligned_component_is_unmapped() {
        let mut s = Store::new();
        seg(&mut s, (0.0, 0.0), (100.0, 0.0));
        let r = resistor(&mut s, 300.0, 300.0);
        assert_eq!(topo(&s).swp_id_for_component(r), None);
    }

    #[test]
    fn part_over_a_wire_maps_to_the_run_on_its_line() {
        let mut s = Store::new();
        for y in [0.0, 100.0, 200.0, 300.0] {
            seg(&mut s, (0.0, y), (100.0, y));
        }
        seg(&mut s, (50.0, -50.0), (50.0, 350.0));
        let r = resistor(&mut s, 50.0, 200.0);
        let t = topo(&s);
        let id = t.swp_id_for_component(r).unwrap();
        let run = t.swp(id).unwrap();
        assert_eq!(run.axis, Axis::X);
        assert_eq!(run.across(), 200.0);
        assert_eq!(run.components, vec![r]);
    }
}
