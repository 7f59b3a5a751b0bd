//! Component kinds and their derived pin geometry.
//!
//! Pins are never stored: they follow from kind, position and rotation.
//! Two-pin parts place their pins at `±TWO_PIN_HALF_SPAN` along the local
//! x axis, so an unrotated part sits on a horizontal wire run.

use serde::{Deserialize, Serialize};

use crate::model::{Axis, Component, Point};

pub const TWO_PIN_HALF_SPAN: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    Diode,
    Led,
    Fuse,
    Switch,
    Battery,
    Ground,
    Npn,
}

impl ComponentKind {
    /// Pin offsets relative to the component center, unrotated.
    pub fn local_pins(self) -> &'static [(f32, f32)] {
        const TWO: [(f32, f32); 2] = [(-TWO_PIN_HALF_SPAN, 0.0), (TWO_PIN_HALF_SPAN, 0.0)];
        match self {
            ComponentKind::Ground => &[(0.0, -10.0)],
            // base, collector, emitter
            ComponentKind::Npn => &[(-20.0, 0.0), (10.0, -20.0), (10.0, 20.0)],
            _ => &TWO,
        }
    }

    /// Half extent of the body perpendicular to the pin line.
    pub fn half_thickness(self) -> f32 {
        match self {
            ComponentKind::Resistor | ComponentKind::Fuse => 6.0,
            ComponentKind::Capacitor | ComponentKind::Battery => 10.0,
            ComponentKind::Inductor | ComponentKind::Switch => 8.0,
            ComponentKind::Diode | ComponentKind::Led => 8.0,
            ComponentKind::Ground => 8.0,
            ComponentKind::Npn => 20.0,
        }
    }

    pub fn is_two_pin(self) -> bool {
        self.local_pins().len() == 2
    }
}

/// Axis-aligned box, inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn around(points: &[Point]) -> Option<Rect> {
        let first = *points.first()?;
        let mut r = Rect {
            min: first,
            max: first,
        };
        for p in &points[1..] {
            r.min.x = r.min.x.min(p.x);
            r.min.y = r.min.y.min(p.y);
            r.max.x = r.max.x.max(p.x);
            r.max.y = r.max.y.max(p.y);
        }
        Some(r)
    }

    pub fn inflate(self, dx: f32, dy: f32) -> Rect {
        Rect {
            min: Point::new(self.min.x - dx, self.min.y - dy),
            max: Point::new(self.max.x + dx, self.max.y + dy),
        }
    }

    /// Interiors intersect; touching edges do not count.
    pub fn overlaps(&self, o: &Rect) -> bool {
        self.min.x < o.max.x && o.min.x < self.max.x && self.min.y < o.max.y && o.min.y < self.max.y
    }

    pub fn contains(&self, p: Point, tol: f32) -> bool {
        p.x >= self.min.x - tol
            && p.x <= self.max.x + tol
            && p.y >= self.min.y - tol
            && p.y <= self.max.y + tol
    }
}

impl Component {
    pub fn pins(&self) -> Vec<Point> {
        self.pins_at(self.position)
    }

    /// Pins the component would have if its center were at `center`.
    pub fn pins_at(&self, center: Point) -> Vec<Point> {
        self.kind
            .local_pins()
            .iter()
            .map(|&(dx, dy)| {
                let (rx, ry) = self.rotation.apply(dx, dy);
                Point::new(center.x + rx, center.y + ry)
            })
            .collect()
    }

    pub fn two_pins(&self) -> Option<(Point, Point)> {
        self.two_pins_at(self.position)
    }

    pub fn two_pins_at(&self, center: Point) -> Option<(Point, Point)> {
        if !self.kind.is_two_pin() {
            return None;
        }
        let pins = self.pins_at(center);
        Some((pins[0], pins[1]))
    }

    /// Axis of the pin line for two-pin parts.
    pub fn pin_axis(&self) -> Option<Axis> {
        let (a, b) = self.two_pins()?;
        match Axis::of_points(a, b) {
            Axis::None => None,
            axis => Some(axis),
        }
    }

    /// Half the distance between the two pins (0 for other kinds).
    pub fn half_span(&self) -> f32 {
        match self.two_pins() {
            Some((a, b)) => a.dist_sq(b).sqrt() * 0.5,
            None => 0.0,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds_at(self.position)
    }

    pub fn bounds_at(&self, center: Point) -> Rect {
        let mut pts = self.pins_at(center);
        pts.push(center);
        let t = self.kind.half_thickness();
        // the body is a box around the pins, padded across the pin line
        let r = Rect::around(&pts).unwrap_or(Rect {
            min: center,
            max: center,
        });
        match self.pin_axis() {
            Some(Axis::X) => r.inflate(0.0, t),
            Some(Axis::Y) => r.inflate(t, 0.0),
            _ => r.inflate(t, t),
        }
    }
}
