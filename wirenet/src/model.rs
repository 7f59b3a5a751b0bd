use serde::{Deserialize, Serialize};

use crate::symbols::ComponentKind;

pub type WireId = u32;
pub type ComponentId = u32;
pub type SwpId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn key(self) -> NodeKey {
        NodeKey::from_point(self)
    }

    pub fn dist_sq(self, o: Point) -> f32 {
        let dx = self.x - o.x;
        let dy = self.y - o.y;
        dx * dx + dy * dy
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Graph identity of a coordinate: both components rounded to integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey(pub i32, pub i32);

impl NodeKey {
    pub fn from_point(p: Point) -> Self {
        NodeKey(p.x.round() as i32, p.y.round() as i32)
    }

    pub fn to_point(self) -> Point {
        Point::new(self.0 as f32, self.1 as f32)
    }
}

/// Orientation of a straight piece. `X` runs horizontally (constant y),
/// `Y` runs vertically (constant x).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    None,
}

impl Axis {
    pub fn classify(a: NodeKey, b: NodeKey) -> Axis {
        if a == b {
            Axis::None
        } else if a.1 == b.1 {
            Axis::X
        } else if a.0 == b.0 {
            Axis::Y
        } else {
            Axis::None
        }
    }

    pub fn of_points(a: Point, b: Point) -> Axis {
        Axis::classify(a.key(), b.key())
    }

    /// Coordinate measured along the axis.
    pub fn along(self, p: Point) -> f32 {
        match self {
            Axis::Y => p.y,
            _ => p.x,
        }
    }

    /// Coordinate held fixed by the axis.
    pub fn across(self, p: Point) -> f32 {
        match self {
            Axis::Y => p.x,
            _ => p.y,
        }
    }

    pub fn point(self, along: f32, across: f32) -> Point {
        match self {
            Axis::Y => Point::new(across, along),
            _ => Point::new(along, across),
        }
    }

    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
            Axis::None => Axis::None,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::None => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Inherit from the net class, then the theme.
    #[default]
    Default,
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

/// Stroke as stored on a wire. Every field may defer: `width <= 0`,
/// `style == Default` and `color == None` all mean "ask the net class,
/// then the theme".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stroke {
    pub width: f32,
    pub style: LineStyle,
    pub color: Option<Color>,
}

impl Stroke {
    pub fn explicit(width: f32, style: LineStyle, color: Color) -> Self {
        Stroke {
            width,
            style,
            color: Some(color),
        }
    }

    pub fn defers_width(&self) -> bool {
        !(self.width > 0.0)
    }

    pub fn defers_style(&self) -> bool {
        self.style == LineStyle::Default
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedStroke {
    pub width: f32,
    pub style: LineStyle,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub wire_width: f32,
    pub wire_style: LineStyle,
    pub wire_color: Color,
    pub junction_size: f32,
    pub junction_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            wire_width: 2.0,
            wire_style: LineStyle::Solid,
            wire_color: Color::rgb(0x1f, 0x6f, 0x3a),
            junction_size: 6.0,
            junction_color: Color::rgb(0x1f, 0x6f, 0x3a),
        }
    }
}

/// Named style group. A wire belongs to the class listing its net; the
/// class named `default` (if any) catches wires without a listed net.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetClass {
    pub name: String,
    pub nets: Vec<String>,
    pub stroke: Stroke,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePalette {
    pub theme: Theme,
    pub classes: Vec<NetClass>,
}

impl StylePalette {
    pub fn class_for(&self, net: Option<&str>) -> Option<&NetClass> {
        if let Some(net) = net {
            if let Some(c) = self.classes.iter().find(|c| c.nets.iter().any(|n| n == net)) {
                return Some(c);
            }
        }
        self.classes.iter().find(|c| c.name == "default")
    }

    pub fn resolve(&self, stroke: &Stroke, net: Option<&str>) -> ResolvedStroke {
        let class = self.class_for(net).map(|c| c.stroke);
        let width = if !stroke.defers_width() {
            stroke.width
        } else {
            match class {
                Some(c) if !c.defers_width() => c.width,
                _ => self.theme.wire_width,
            }
        };
        let style = if !stroke.defers_style() {
            stroke.style
        } else {
            match class {
                Some(c) if !c.defers_style() => c.style,
                _ => self.theme.wire_style,
            }
        };
        let color = stroke
            .color
            .or_else(|| class.and_then(|c| c.color))
            .unwrap_or(self.theme.wire_color);
        ResolvedStroke {
            width,
            style,
            color,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    pub points: Vec<Point>,
    #[serde(default)]
    pub stroke: Stroke,
    #[serde(default)]
    pub net: Option<String>,
}

impl Wire {
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn segment(&self, index: usize) -> Option<(Point, Point)> {
        let a = *self.points.get(index)?;
        let b = *self.points.get(index + 1)?;
        Some((a, b))
    }

    /// Exactly two points at distinct node keys.
    pub fn is_canonical(&self) -> bool {
        self.points.len() == 2 && self.points[0].key() != self.points[1].key()
    }
}

/// Quarter-turn rotation, serialized as degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    pub fn turned(self) -> Rotation {
        Rotation::from(self.degrees() + 90)
    }

    /// Rotate a local offset (screen coordinates, y down).
    pub fn apply(self, dx: f32, dy: f32) -> (f32, f32) {
        match self {
            Rotation::R0 => (dx, dy),
            Rotation::R90 => (-dy, dx),
            Rotation::R180 => (-dx, -dy),
            Rotation::R270 => (dy, -dx),
        }
    }
}

impl From<i32> for Rotation {
    fn from(deg: i32) -> Self {
        // snap to the nearest quarter turn
        let q = ((deg as f32) / 90.0).round() as i32;
        match q.rem_euclid(4) {
            1 => Rotation::R90,
            2 => Rotation::R180,
            3 => Rotation::R270,
            _ => Rotation::R0,
        }
    }
}

impl From<Rotation> for i32 {
    fn from(r: Rotation) -> Self {
        r.degrees()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub position: Point,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JunctionStyle {
    pub size: Option<f32>,
    pub color: Option<Color>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub position: Point,
    #[serde(default)]
    pub manual: bool,
    #[serde(default)]
    pub suppressed: bool,
    #[serde(default)]
    pub style: JunctionStyle,
}

impl Junction {
    pub fn automatic(position: Point) -> Self {
        Junction {
            position,
            manual: false,
            suppressed: false,
            style: JunctionStyle::default(),
        }
    }

    pub fn key(&self) -> NodeKey {
        self.position.key()
    }

    /// Rendered and electrically meaningful (not a suppression marker).
    pub fn is_visible(&self) -> bool {
        !self.suppressed
    }
}
