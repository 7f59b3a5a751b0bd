use serde_json::json;
use wirenet::{LineStyle, Point, Schematic, SchematicError, Stroke};

#[test]
fn load_resolves_missing_strokes_through_net_classes() {
    let mut s = Schematic::new();
    let doc = json!({
        "version": 1,
        "wires": [
            { "id": 1, "points": [{ "x": 0.0, "y": 0.0 }, { "x": 40.0, "y": 0.0 }], "net": "VCC" },
            { "id": 4, "points": [{ "x": 40.0, "y": 0.0 }, { "x": 80.0, "y": 0.0 }] }
        ],
        "palette": {
            "classes": [
                { "name": "power", "nets": ["VCC"], "stroke": { "width": 4.0, "color": { "r": 255, "g": 0, "b": 0, "a": 255 } } }
            ]
        }
    });
    s.from_json_value(doc).unwrap();
    let vcc = s.resolved_stroke(1).unwrap();
    assert_eq!(vcc.width, 4.0);
    assert_eq!((vcc.color.r, vcc.color.g), (255, 0));
    assert_eq!(vcc.style, s.palette().theme.wire_style);
    let plain = s.resolved_stroke(4).unwrap();
    assert_eq!(plain.width, s.palette().theme.wire_width);
    assert_eq!(plain.color, s.palette().theme.wire_color);

    let next = s
        .add_wire(vec![Point::new(0.0, 10.0), Point::new(10.0, 10.0)], Stroke::default(), None)
        .unwrap();
    assert_eq!(next, 5);
}

#[test]
fn suppression_markers_survive_a_round_trip() {
    let mut s = Schematic::new();
    s.add_wire(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)], Stroke::default(), None).unwrap();
    s.add_wire(vec![Point::new(50.0, 0.0), Point::new(50.0, 50.0)], Stroke::default(), None).unwrap();
    s.rebuild_topology();
    s.delete_junction(Point::new(50.0, 0.0)).unwrap();
    let doc = s.to_json_value();

    let mut t = Schematic::new();
    t.from_json_value(doc).unwrap();
    t.rebuild_topology();
    assert_eq!(t.junctions().len(), 1);
    assert!(!t.junctions()[0].is_visible());
    assert_eq!(t.wires(), s.wires());
}

#[test]
fn bad_documents_are_rejected_without_changes() {
    let mut s = Schematic::new();
    s.add_wire(
        vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        Stroke::explicit(2.0, LineStyle::Dashed, wirenet::Color::rgb(1, 2, 3)),
        None,
    )
    .unwrap();
    let ver = s.geom_version();

    let future = json!({ "version": 7, "wires": [] });
    assert!(matches!(s.from_json_value(future), Err(SchematicError::InvalidDocument(_))));

    let far = json!({ "wires": [{ "id": 1, "points": [{ "x": 0.0, "y": 0.0 }, { "x": 1.0e9, "y": 0.0 }] }] });
    assert!(matches!(s.from_json_value(far), Err(SchematicError::BadCoordinate(_))));

    assert!(matches!(s.from_json_str("[1, 2"), Err(SchematicError::Json(_))));
    let e = s.from_json_str("{}").unwrap_err();
    assert_eq!(e.code(), "invalid_document");

    assert_eq!(s.wires().len(), 1);
    assert_eq!(s.geom_version(), ver);
}

#[test]
fn wire_validation_errors() {
    let mut s = Schematic::new();
    assert!(matches!(
        s.add_wire(vec![Point::new(0.0, 0.0)], Stroke::default(), None),
        Err(SchematicError::TooFewPoints(1))
    ));
    assert!(matches!(
        s.add_wire(vec![Point::new(0.0, 0.0), Point::new(f32::NAN, 0.0)], Stroke::default(), None),
        Err(SchematicError::BadCoordinate(_))
    ));
    assert!(matches!(s.remove_wire(3), Err(SchematicError::UnknownWire(3))));
    assert!(matches!(s.set_wire_net(3, None), Err(SchematicError::UnknownWire(3))));
    assert!(s.wires().is_empty());
}
