use crate::geometry::math::seg_distance_sq;
use crate::store::Store;
use crate::Pick;

pub fn pick_impl(store: &Store, x: f32, y: f32, tol: f32) -> Option<Pick> {
    let tol2 = tol * tol;
    let at = crate::model::Point::new(x, y);
    // Components first: inside the body box, nearest center wins
    let mut best_comp: Option<(u32, f32)> = None;
    for c in store.components() {
        if !c.bounds().contains(at, tol) { continue; }
        let d2 = c.position.dist_sq(at);
        if best_comp.map_or(true, |(_, bd)| d2 < bd) { best_comp = Some((c.id, d2)); }
    }
    if let Some((id, d2)) = best_comp { return Some(Pick::Component { id, dist: d2.sqrt() }); }
    // Junctions
    let mut best_junction: Option<(crate::model::Point, f32)> = None;
    for j in store.junctions().iter().filter(|j| j.is_visible()) {
        let d2 = j.position.dist_sq(at);
        if d2 <= tol2 && best_junction.map_or(true, |(_, bd)| d2 < bd) { best_junction = Some((j.position, d2)); }
    }
    if let Some((p, d2)) = best_junction { return Some(Pick::Junction { x: p.x, y: p.y, dist: d2.sqrt() }); }
    // Wire segments
    let mut best_wire: Option<(u32, usize, f32, f32)> = None;
    for w in store.wires() {
        for (i, s) in w.points.windows(2).enumerate() {
            let (d2, t) = seg_distance_sq(at, s[0], s[1]);
            if d2 <= tol2 && best_wire.map_or(true, |(_, _, bd, _)| d2 < bd) { best_wire = Some((w.id, i, d2, t)); }
        }
    }
    if let Some((id, index, d2, t)) = best_wire { return Some(Pick::Wire { id, index, t, dist: d2.sqrt() }); }
    None
}
