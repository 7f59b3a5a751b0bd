use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchematicError;
use crate::geometry::limits;
use crate::model::{Component, Junction, Point, StylePalette, Wire};
use crate::store::Store;

pub const DOC_VERSION: u32 = 1;

pub fn to_json_impl(store: &Store, palette: &StylePalette) -> Value {
    #[derive(Serialize)]
    struct Doc<'a> {
        version: u32,
        wires: &'a [Wire],
        components: &'a [Component],
        junctions: &'a [Junction],
        palette: &'a StylePalette,
    }
    let doc = Doc {
        version: DOC_VERSION,
        wires: store.wires(),
        components: store.components(),
        junctions: store.junctions(),
        palette,
    };
    match serde_json::to_value(doc) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("json: snapshot serialization failed: {}", e);
            Value::Null
        }
    }
}

fn check_point(p: &Point, what: &'static str) -> Result<(), SchematicError> {
    if limits::in_coord_bounds(p.x) && limits::in_coord_bounds(p.y) {
        Ok(())
    } else {
        Err(SchematicError::BadCoordinate(what))
    }
}

fn cap(what: &'static str, got: usize, max: usize) -> Result<(), SchematicError> {
    if got > max {
        Err(SchematicError::LimitExceeded { what, max, got })
    } else {
        Ok(())
    }
}

/// Replace the store (and palette, when the document carries one) with the
/// document's contents. Nothing is touched unless the whole document
/// validates. Wires with fewer than two points are skipped.
pub fn from_json_impl(store: &mut Store, palette: &mut StylePalette, v: Value) -> Result<(), SchematicError> {
    #[derive(Deserialize)]
    struct DocDe {
        version: Option<u32>,
        wires: Vec<Wire>,
        #[serde(default)]
        components: Vec<Component>,
        #[serde(default)]
        junctions: Vec<Junction>,
        palette: Option<StylePalette>,
    }
    let doc: DocDe = serde_json::from_value(v)?;
    if let Some(ver) = doc.version {
        if ver > DOC_VERSION {
            return Err(SchematicError::InvalidDocument(format!("unsupported version {}", ver)));
        }
    }
    cap("wires", doc.wires.len(), limits::MAX_WIRES)?;
    cap("components", doc.components.len(), limits::MAX_COMPONENTS)?;
    cap("junctions", doc.junctions.len(), limits::MAX_JUNCTIONS)?;

    let mut total = 0usize;
    let mut wire_ids = HashSet::new();
    for w in &doc.wires {
        cap("points per wire", w.points.len(), limits::MAX_POINTS_PER_WIRE)?;
        total += w.points.len();
        cap("points", total, limits::MAX_POINTS_TOTAL)?;
        for p in &w.points {
            check_point(p, "wire point")?;
        }
        if !limits::in_width_bounds(w.stroke.width) {
            return Err(SchematicError::BadCoordinate("stroke width"));
        }
        if !wire_ids.insert(w.id) {
            return Err(SchematicError::InvalidDocument(format!("duplicate wire id {}", w.id)));
        }
    }
    let mut comp_ids = HashSet::new();
    for c in &doc.components {
        check_point(&c.position, "component position")?;
        if !comp_ids.insert(c.id) {
            return Err(SchematicError::InvalidDocument(format!("duplicate component id {}", c.id)));
        }
    }
    for j in &doc.junctions {
        check_point(&j.position, "junction position")?;
    }

    store.clear();
    let mut skipped = 0;
    for w in doc.wires {
        if w.points.len() < 2 {
            skipped += 1;
            continue;
        }
        store.restore_wire(w);
    }
    if skipped > 0 {
        log::warn!("document load skipped {} wire(s) with fewer than two points", skipped);
    }
    for c in doc.components {
        store.restore_component(c);
    }
    store.junctions = doc.junctions;
    if let Some(p) = doc.palette {
        *palette = p;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, LineStyle, Stroke};
    use serde_json::json;

    #[test]
    fn missing_stroke_defers_to_the_palette() {
        let mut store = Store::new();
        let mut palette = StylePalette::default();
        let doc = json!({
            "wires": [
                { "id": 4, "points": [{ "x": 0.0, "y": 0.0 }, { "x": 40.0, "y": 0.0 }] },
                { "id": 9, "points": [{ "x": 0.0, "y": 5.0 }] }
            ]
        });
        from_json_impl(&mut store, &mut palette, doc).unwrap();
        assert_eq!(store.wires().len(), 1);
        let w = store.wire(4).unwrap();
        assert_eq!(w.stroke.width, 0.0);
        assert_eq!(w.stroke.style, LineStyle::Default);
        assert!(w.stroke.color.is_none());
        // fresh ids continue above the loaded ones
        let next = store.insert_wire(vec![Point::new(0.0, 9.0), Point::new(5.0, 9.0)], Default::default(), None);
        assert_eq!(next, 5);
    }

    #[test]
    fn invalid_documents_leave_the_store_untouched() {
        let mut store = Store::new();
        store.insert_wire(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], Default::default(), None);
        let mut palette = StylePalette::default();
        let dup = json!({ "wires": [
            { "id": 1, "points": [{ "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.0 }] },
            { "id": 1, "points": [{ "x": 0.0, "y": 1.0 }, { "x": 1.0, "y": 1.0 }] }
        ]});
        assert!(matches!(
            from_json_impl(&mut store, &mut palette, dup),
            Err(SchematicError::InvalidDocument(_))
        ));
        let far = json!({ "wires": [
            { "id": 1, "points": [{ "x": 0.0, "y": 0.0 }, { "x": 1e9, "y": 0.0 }] }
        ]});
        assert!(matches!(
            from_json_impl(&mut store, &mut palette, far),
            Err(SchematicError::BadCoordinate(_))
        ));
        assert!(from_json_impl(&mut store, &mut palette, json!({ "nope": 1 })).is_err());
        assert_eq!(store.wires().len(), 1);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut store = Store::new();
        store.insert_wire(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], Default::default(), Some("GND".into()));
        store.junctions.push(Junction::automatic(Point::new(1.0, 0.0)));
        let palette = StylePalette::default();
        let v = to_json_impl(&store, &palette);
        assert_eq!(v["version"], json!(DOC_VERSION));

        let mut loaded = Store::new();
        let mut p2 = StylePalette::default();
        from_json_impl(&mut loaded, &mut p2, v).unwrap();
        assert_eq!(loaded.wires(), store.wires());
        assert_eq!(loaded.junctions(), store.junctions());
    }

    #[test]
    fn non_finite_stroke_width_still_serializes() {
        let mut store = Store::new();
        let stroke = Stroke::explicit(f32::NAN, LineStyle::Solid, Color::rgb(0, 0, 0));
        store.insert_wire(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], stroke, None);
        let v = to_json_impl(&store, &StylePalette::default());
        assert!(v.is_object());
        assert_eq!(v["wires"].as_array().map(Vec::len), Some(1));
    }
}
