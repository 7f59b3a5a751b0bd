//! Junction inference over a built topology.
//!
//! Manual junctions and suppression markers are kept as they are.
//! Automatic junctions are recomputed from scratch on every rebuild.

use std::collections::{BTreeMap, HashSet};

use crate::algorithms::topology::{TopoNode, Topology};
use crate::model::{Junction, NodeKey, Point, Wire};
use crate::store::Store;

/// Whether the node carries an automatic junction.
pub fn wants_junction(node: &TopoNode, pins: &HashSet<NodeKey>) -> bool {
    match node.wire_count() {
        0 | 1 => false,
        2 => {
            // one wire continues through while the other ends here
            let tee = node.terminating.len() == 1 && node.passing.len() == 1;
            tee || pins.contains(&node.key)
        }
        _ => true,
    }
}

/// Replace automatic junctions with the ones the topology implies.
/// Returns the number of automatic junctions placed.
pub fn reconcile(store: &mut Store, topo: &Topology) -> usize {
    let pins = store.pin_keys();
    store.junctions.retain(|j| j.manual || j.suppressed);
    let occupied: HashSet<NodeKey> = store.junctions.iter().map(|j| j.key()).collect();
    let mut placed = 0;
    for node in topo.nodes() {
        if occupied.contains(&node.key) || !wants_junction(node, &pins) {
            continue;
        }
        store.junctions.push(Junction::automatic(node.pos));
        placed += 1;
    }
    placed
}

/// Split stored wires whose working polyline has a visible junction at a
/// strictly interior vertex. Returns true when the store changed.
pub fn split_at_junctions(store: &mut Store, topo: &Topology) -> bool {
    let visible = store.visible_junction_keys();
    if visible.is_empty() {
        return false;
    }
    let mut changed = false;
    for ww in topo.working_wires() {
        let n = ww.points.len();
        // stored segment -> cut points inside it, stored vertex cuts
        let mut inside: BTreeMap<usize, Vec<Point>> = BTreeMap::new();
        let mut at_vertex: HashSet<usize> = HashSet::new();
        for k in 1..n.saturating_sub(1) {
            let p = ww.points[k];
            if !visible.contains(&p.key()) {
                continue;
            }
            let (left, right) = (ww.sources[k - 1], ww.sources[k]);
            if left == right {
                inside.entry(left).or_default().push(p);
            } else {
                at_vertex.insert(right);
            }
        }
        if inside.is_empty() && at_vertex.is_empty() {
            continue;
        }
        let Some(wire) = store.remove_wire(ww.id) else {
            continue;
        };
        let pieces = cut_polyline(&wire.points, &inside, &at_vertex);
        if pieces.len() < 2 {
            store.wires.push(wire);
            continue;
        }
        for (i, points) in pieces.into_iter().enumerate() {
            let id = if i == 0 { wire.id } else { store.mint_wire_id() };
            store.wires.push(Wire {
                id,
                points,
                stroke: wire.stroke,
                net: wire.net.clone(),
            });
        }
        changed = true;
    }
    changed
}

fn cut_polyline(
    points: &[Point],
    inside: &BTreeMap<usize, Vec<Point>>,
    at_vertex: &HashSet<usize>,
) -> Vec<Vec<Point>> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut pieces: Vec<Vec<Point>> = Vec::new();
    let mut cur = vec![first];
    let last = points.len() - 1;
    for s in 0..last {
        for &p in inside.get(&s).into_iter().flatten() {
            cur.push(p);
            pieces.push(std::mem::replace(&mut cur, vec![p]));
        }
        cur.push(points[s + 1]);
        if s + 1 < last && at_vertex.contains(&(s + 1)) {
            pieces.push(std::mem::replace(&mut cur, vec![points[s + 1]]));
        }
    }
    pieces.push(cur);
    pieces
}
