use std::time::Instant;
use wirenet::{ComponentKind, Point, Rotation, Schematic, Stroke};

// Rows of stub wires with a resistor bridging each gap, plus vertical rails
// tying every row together so the rebuild sees tees and junctions.
fn build_ladder(rows: usize, cols: usize) -> (Schematic, Vec<u32>) {
    let mut s = Schematic::new();
    let mut parts = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        let y = r as f32 * 100.0;
        for c in 0..cols {
            let x = c as f32 * 120.0;
            let _ = s.add_wire(vec![Point::new(x, y), Point::new(x + 40.0, y)], Stroke::default(), None);
            let _ = s.add_wire(vec![Point::new(x + 80.0, y), Point::new(x + 120.0, y)], Stroke::default(), None);
            if let Ok(id) = s.place_component(ComponentKind::Resistor, Point::new(x + 60.0, y), Rotation::R0) { parts.push(id); }
        }
    }
    if rows > 1 {
        let bottom = (rows - 1) as f32 * 100.0;
        let right = cols as f32 * 120.0;
        let _ = s.add_wire(vec![Point::new(0.0, 0.0), Point::new(0.0, bottom)], Stroke::default(), None);
        let _ = s.add_wire(vec![Point::new(right, 0.0), Point::new(right, bottom)], Stroke::default(), None);
    }
    (s, parts)
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len()-1)]
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut rows = 40usize;
    let mut cols = 40usize;
    let mut drags = 200usize;
    let mut assert_ms: Option<f64> = None;
    for a in &args[1..] {
        if let Some(val)=a.strip_prefix("--rows=") { if let Ok(v)=val.parse() { rows=v; } }
        else if let Some(val)=a.strip_prefix("--cols=") { if let Ok(v)=val.parse() { cols=v; } }
        else if let Some(val)=a.strip_prefix("--drags=") { if let Ok(v)=val.parse() { drags=v; } }
        else if let Some(val)=a.strip_prefix("--assert-ms=") { if let Ok(v)=val.parse() { assert_ms=Some(v); } }
    }

    let (mut s, parts) = build_ladder(rows, cols);
    let t0 = Instant::now();
    s.rebuild_topology();
    let rebuild_ms = t0.elapsed().as_secs_f64() * 1000.0;
    let topo = s.topology();
    println!("rows={} cols={} wires={} nodes={} swps={} junctions={} rebuild_ms={:.3}",
        rows, cols, s.wires().len(), topo.node_count(), topo.swps().len(), s.junctions().len(), rebuild_ms);

    // each drag is begin + one step + finish, which includes a rebuild
    let mut times_ms: Vec<f64> = Vec::with_capacity(drags);
    let mut moved = 0usize;
    for k in 0..drags.min(parts.len()) {
        let id = parts[(k * 7919) % parts.len()];
        let Some(c) = s.component(id) else { continue };
        let target = Point::new(c.position.x + if k % 2 == 0 { 10.0 } else { -10.0 }, c.position.y);
        let t = Instant::now();
        if matches!(s.begin_move(id), Ok(true)) {
            if matches!(s.update_move(id, target), Ok(true)) { moved += 1; }
            let _ = s.finish_move(id);
        }
        times_ms.push(t.elapsed().as_secs_f64() * 1000.0);
    }
    times_ms.sort_by(|a,b| a.total_cmp(b));
    let med = percentile(&times_ms, 0.5);
    let p90 = percentile(&times_ms, 0.9);
    let p99 = percentile(&times_ms, 0.99);
    println!("drags={} moved={} median_ms={:.4} p90_ms={:.4} p99_ms={:.4}", times_ms.len(), moved, med, p90, p99);
    if let Some(th) = assert_ms { if med > th { eprintln!("FAIL: median {:.4} ms > threshold {:.3} ms", med, th); std::process::exit(1); } }
}
