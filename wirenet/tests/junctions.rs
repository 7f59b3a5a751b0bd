use wirenet::{ComponentKind, Point, Rotation, Schematic, Stroke};

fn p(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

fn wire(s: &mut Schematic, a: (f32, f32), b: (f32, f32)) -> u32 {
    s.add_wire(vec![p(a.0, a.1), p(b.0, b.1)], Stroke::default(), None).unwrap()
}

fn visible(s: &Schematic) -> Vec<Point> {
    s.junctions().iter().filter(|j| j.is_visible()).map(|j| j.position).collect()
}

#[test]
fn three_wires_meeting_get_a_dot() {
    let mut s = Schematic::new();
    wire(&mut s, (0.0, 0.0), (50.0, 0.0));
    wire(&mut s, (50.0, 0.0), (100.0, 0.0));
    wire(&mut s, (50.0, 0.0), (50.0, 50.0));
    s.rebuild_topology();
    assert_eq!(visible(&s), vec![p(50.0, 0.0)]);
    assert!(!s.junctions()[0].manual);
}

#[test]
fn tee_onto_a_wire_splits_it() {
    let mut s = Schematic::new();
    let bar = wire(&mut s, (0.0, 0.0), (100.0, 0.0));
    wire(&mut s, (50.0, 0.0), (50.0, 50.0));
    s.rebuild_topology();
    assert_eq!(visible(&s), vec![p(50.0, 0.0)]);
    assert_eq!(s.wires().len(), 3);
    // the first piece keeps the original id
    assert_eq!(s.wire(bar).unwrap().points, vec![p(0.0, 0.0), p(50.0, 0.0)]);
    assert!(s.topology_is_current());
}

#[test]
fn plain_crossing_gets_no_dot() {
    let mut s = Schematic::new();
    wire(&mut s, (0.0, 0.0), (100.0, 0.0));
    wire(&mut s, (50.0, -50.0), (50.0, 50.0));
    s.rebuild_topology();
    assert!(visible(&s).is_empty());
    assert_eq!(s.wires().len(), 2);
    assert_eq!(s.topology().swps().len(), 2);
}

#[test]
fn pin_on_a_wire_joint_gets_a_dot() {
    let mut s = Schematic::new();
    wire(&mut s, (0.0, 0.0), (50.0, 0.0));
    wire(&mut s, (50.0, 0.0), (50.0, 50.0));
    // ground pin sits 10 above its center
    s.place_component(ComponentKind::Ground, p(50.0, 10.0), Rotation::R0).unwrap();
    s.rebuild_topology();
    assert_eq!(visible(&s), vec![p(50.0, 0.0)]);
}

#[test]
fn deleted_automatic_dot_stays_away() {
    let mut s = Schematic::new();
    wire(&mut s, (0.0, 0.0), (100.0, 0.0));
    wire(&mut s, (50.0, 0.0), (50.0, 50.0));
    s.rebuild_topology();
    assert!(s.delete_junction(p(50.0, 0.0)).unwrap());
    s.rebuild_topology();
    s.rebuild_topology();
    assert!(visible(&s).is_empty());
    assert_eq!(s.junctions().len(), 1, "suppression marker is kept");
    assert!(!s.delete_junction(p(50.0, 0.0)).unwrap());

    assert!(s.restore_junction(p(50.0, 0.0)).unwrap());
    s.rebuild_topology();
    assert_eq!(visible(&s), vec![p(50.0, 0.0)]);
    assert!(!s.restore_junction(p(50.0, 0.0)).unwrap());
}

#[test]
fn manual_dot_survives_rebuilds_and_deletes_outright() {
    let mut s = Schematic::new();
    wire(&mut s, (0.0, 0.0), (40.0, 0.0));
    wire(&mut s, (40.0, 0.0), (80.0, 0.0));
    s.add_manual_junction(p(40.0, 0.0)).unwrap();
    s.rebuild_topology();
    assert_eq!(visible(&s), vec![p(40.0, 0.0)]);
    assert!(s.junctions()[0].manual);
    assert!(s.delete_junction(p(40.0, 0.0)).unwrap());
    assert!(s.junctions().is_empty());
    s.rebuild_topology();
    assert!(s.junctions().is_empty());
}

#[test]
fn manual_dot_blocks_inline_merging() {
    let mut s = Schematic::new();
    wire(&mut s, (0.0, 0.0), (40.0, 0.0));
    wire(&mut s, (40.0, 0.0), (80.0, 0.0));
    wire(&mut s, (80.0, 0.0), (120.0, 0.0));
    s.add_manual_junction(p(40.0, 0.0)).unwrap();
    let report = s.unify_inline();
    assert_eq!(report.merges, 1);
    assert!(report.aborted.is_none());
    assert_eq!(s.wires().len(), 2);
    assert!(s.wires().iter().any(|w| w.points.contains(&p(40.0, 0.0))));
}

#[test]
fn junction_colors_fall_back_to_the_theme() {
    let mut s = Schematic::new();
    s.add_manual_junction(p(10.0, 10.0)).unwrap();
    let j = s.junctions()[0];
    let (size, color) = s.junction_appearance(&j);
    assert_eq!(size, s.palette().theme.junction_size);
    assert_eq!(color, s.palette().theme.junction_color);
}
