use wirenet::{
    Axis, Color, ComponentKind, LineStyle, Point, Rotation, Schematic, Stroke,
};

fn p(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

fn red() -> Stroke {
    Stroke::explicit(3.0, LineStyle::Solid, Color::rgb(200, 0, 0))
}

/// Three collinear segments at y=100 covering [0,120].
fn three_segments(s: &mut Schematic) {
    s.add_wire(vec![p(0.0, 100.0), p(40.0, 100.0)], red(), None).unwrap();
    s.add_wire(vec![p(40.0, 100.0), p(80.0, 100.0)], Stroke::default(), None).unwrap();
    s.add_wire(vec![p(80.0, 100.0), p(120.0, 100.0)], Stroke::default(), Some("N2".into()))
        .unwrap();
}

/// Resistor dropped on the middle segment; its pins land on (40,100) and (80,100).
fn with_resistor() -> (Schematic, u32) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut s = Schematic::new();
    three_segments(&mut s);
    let r = s.place_component(ComponentKind::Resistor, p(60.0, 100.0), Rotation::R0).unwrap();
    s.rebuild_topology();
    (s, r)
}

fn spans(s: &Schematic) -> Vec<(f32, f32)> {
    let mut v: Vec<(f32, f32)> = s
        .wires()
        .iter()
        .map(|w| {
            let (a, b) = (w.points[0].x, w.points[w.points.len() - 1].x);
            (a.min(b), a.max(b))
        })
        .collect();
    v.sort_by(|a, b| a.0.total_cmp(&b.0));
    v
}

#[test]
fn collinear_segments_form_one_straight_path() {
    let mut s = Schematic::new();
    three_segments(&mut s);
    s.rebuild_topology();
    let swps = s.topology().swps();
    assert_eq!(swps.len(), 1);
    assert_eq!(swps[0].axis, Axis::X);
    assert_eq!(swps[0].span(), (0.0, 120.0));
    assert_eq!(swps[0].wires.len(), 3);
    assert!(s.junctions().is_empty(), "two wires meeting end to end need no dot");
    for w in s.wires() {
        assert_eq!(s.swp_for_segment(w.id, 0).map(|r| r.id), Some(swps[0].id));
    }
}

#[test]
fn placing_a_part_cuts_the_wire_under_its_body() {
    let (s, _) = with_resistor();
    assert_eq!(spans(&s), vec![(0.0, 40.0), (80.0, 120.0)]);
}

#[test]
fn component_maps_to_the_run_through_its_pins() {
    let (s, r) = with_resistor();
    let id = s.swp_id_for_component(r).expect("mapped");
    let swp = s.swp(id).unwrap();
    assert_eq!(swp.span(), (0.0, 120.0));
    assert!(swp.components.contains(&r));
}

#[test]
fn begin_move_collapses_the_run() {
    let (mut s, r) = with_resistor();
    assert!(s.begin_move(r).unwrap());
    assert!(s.move_session().is_active());
    assert_eq!(s.wires().len(), 1);
    assert_eq!(s.wires()[0].points, vec![p(0.0, 100.0), p(120.0, 100.0)]);
    // already collapsed for this part
    assert!(s.begin_move(r).unwrap());
    assert_eq!(s.wires().len(), 1);
}

#[test]
fn drag_and_finish_regenerates_gaps_with_their_strokes() {
    let (mut s, r) = with_resistor();
    assert!(s.begin_move(r).unwrap());
    assert!(s.update_move(r, p(31.0, 100.0)).unwrap());
    assert_eq!(s.component(r).unwrap().position, p(30.0, 100.0));
    assert!(s.finish_move(r).unwrap());
    assert!(!s.move_session().is_active());
    assert_eq!(spans(&s), vec![(0.0, 10.0), (50.0, 120.0)]);

    let left = s.wires().iter().find(|w| w.points.iter().any(|q| q.x == 0.0)).unwrap();
    assert_eq!(left.stroke, red());
    let right = s.wires().iter().find(|w| w.points.iter().any(|q| q.x == 120.0)).unwrap();
    assert_eq!(right.net.as_deref(), Some("N2"));
    assert!(s.topology_is_current());
    assert_eq!(s.swp_id_for_component(r).and_then(|id| s.swp(id)).map(|w| w.span()), Some((0.0, 120.0)));
}

#[test]
fn drag_to_the_end_drops_the_empty_gap() {
    let (mut s, r) = with_resistor();
    s.begin_move(r).unwrap();
    assert!(s.update_move(r, p(20.0, 100.0)).unwrap());
    s.finish_move(r).unwrap();
    assert_eq!(spans(&s), vec![(40.0, 120.0)]);
}

#[test]
fn begin_then_finish_without_dragging_restores_the_wires() {
    let (mut s, r) = with_resistor();
    let before = spans(&s);
    s.begin_move(r).unwrap();
    s.finish_move(r).unwrap();
    assert_eq!(spans(&s), before);
    assert!(s.wires().iter().all(|w| w.is_canonical()));
}

#[test]
fn cancel_behaves_like_finish() {
    let (mut s, r) = with_resistor();
    s.begin_move(r).unwrap();
    s.update_move(r, p(90.0, 100.0)).unwrap();
    assert!(s.cancel_move());
    assert!(!s.cancel_move());
    assert_eq!(s.component(r).unwrap().position, p(90.0, 100.0));
    assert_eq!(spans(&s), vec![(0.0, 70.0), (110.0, 120.0)]);
}

#[test]
fn structural_edit_closes_the_open_session() {
    let (mut s, r) = with_resistor();
    s.begin_move(r).unwrap();
    s.add_wire(vec![p(0.0, 300.0), p(50.0, 300.0)], Stroke::default(), None).unwrap();
    assert!(!s.move_session().is_active());
    assert_eq!(s.wires().len(), 3);
}

#[test]
fn unmapped_component_does_not_start_a_session() {
    let mut s = Schematic::new();
    let r = s.place_component(ComponentKind::Resistor, p(0.0, 0.0), Rotation::R0).unwrap();
    assert!(!s.begin_move(r).unwrap());
    assert!(!s.move_session().is_active());
    assert!(!s.update_move(r, p(10.0, 0.0)).unwrap());
    assert!(!s.finish_move(r).unwrap());
}

#[test]
fn vertical_runs_move_along_y() {
    let mut s = Schematic::new();
    s.add_wire(vec![p(50.0, 0.0), p(50.0, 40.0)], Stroke::default(), None).unwrap();
    s.add_wire(vec![p(50.0, 80.0), p(50.0, 120.0)], Stroke::default(), None).unwrap();
    let r = s.place_component(ComponentKind::Resistor, p(50.0, 60.0), Rotation::R90).unwrap();
    s.rebuild_topology();
    let swp = s.swp(s.swp_id_for_component(r).unwrap()).unwrap();
    assert_eq!(swp.axis, Axis::Y);
    assert!(s.begin_move(r).unwrap());
    assert!(s.update_move(r, p(70.0, 70.0)).unwrap());
    assert_eq!(s.component(r).unwrap().position, p(50.0, 70.0));
    s.finish_move(r).unwrap();
    let mut ys: Vec<(f32, f32)> = s
        .wires()
        .iter()
        .map(|w| (w.points[0].y.min(w.points[1].y), w.points[0].y.max(w.points[1].y)))
        .collect();
    ys.sort_by(|a, b| a.0.total_cmp(&b.0));
    assert_eq!(ys, vec![(0.0, 50.0), (90.0, 120.0)]);
}

#[test]
fn beginning_on_another_part_finishes_the_first_session() {
    let (mut s, r1) = with_resistor();
    s.add_wire(vec![p(0.0, 300.0), p(40.0, 300.0)], Stroke::default(), None).unwrap();
    s.add_wire(vec![p(80.0, 300.0), p(120.0, 300.0)], Stroke::default(), None).unwrap();
    let r2 = s.place_component(ComponentKind::Resistor, p(60.0, 300.0), Rotation::R0).unwrap();
    s.rebuild_topology();

    assert!(s.begin_move(r1).unwrap());
    assert!(s.begin_move(r2).unwrap());
    assert_eq!(s.move_session().component(), Some(r2));

    let on = |y: f32| {
        let mut v: Vec<(f32, f32)> = s
            .wires()
            .iter()
            .filter(|w| w.points.iter().all(|q| q.y == y))
            .map(|w| (w.points[0].x.min(w.points[1].x), w.points[0].x.max(w.points[1].x)))
            .collect();
        v.sort_by(|a, b| a.0.total_cmp(&b.0));
        v
    };
    assert_eq!(on(100.0), vec![(0.0, 40.0), (80.0, 120.0)]);
    assert_eq!(on(300.0), vec![(0.0, 120.0)]);
    let left = s.wires().iter().find(|w| w.points.iter().all(|q| q.y == 100.0 && q.x <= 40.0)).unwrap();
    assert_eq!(left.stroke, red());
}

#[test]
fn finish_keeps_strokes_of_wires_meeting_end_to_end() {
    let blue = Stroke::explicit(1.0, LineStyle::Dashed, Color::rgb(0, 0, 200));
    let mut s = Schematic::new();
    s.add_wire(vec![p(0.0, 0.0), p(40.0, 0.0)], red(), None).unwrap();
    s.add_wire(vec![p(40.0, 0.0), p(80.0, 0.0)], blue, None).unwrap();
    s.add_wire(vec![p(120.0, 0.0), p(160.0, 0.0)], Stroke::default(), None).unwrap();
    let r = s.place_component(ComponentKind::Resistor, p(100.0, 0.0), Rotation::R0).unwrap();
    s.rebuild_topology();

    assert!(s.begin_move(r).unwrap());
    assert!(s.finish_move(r).unwrap());
    assert_eq!(spans(&s), vec![(0.0, 40.0), (40.0, 80.0), (120.0, 160.0)]);
    let stroke_from = |x: f32| {
        s.wires()
            .iter()
            .find(|w| w.points[0].x.min(w.points[1].x) == x)
            .map(|w| w.stroke)
    };
    assert_eq!(stroke_from(0.0), Some(red()));
    assert_eq!(stroke_from(40.0), Some(blue));
    assert_eq!(stroke_from(120.0), Some(Stroke::default()));
}

#[test]
fn placing_a_part_leaves_other_bodies_alone() {
    let mut s = Schematic::new();
    s.place_component(ComponentKind::Resistor, p(60.0, 100.0), Rotation::R0).unwrap();
    // drawn after the part, straight through its body
    let through = s.add_wire(vec![p(0.0, 100.0), p(120.0, 100.0)], red(), None).unwrap();
    s.place_component(ComponentKind::Resistor, p(300.0, 300.0), Rotation::R0).unwrap();
    assert_eq!(s.wires().len(), 1);
    assert_eq!(s.wire(through).unwrap().points, vec![p(0.0, 100.0), p(120.0, 100.0)]);
}
