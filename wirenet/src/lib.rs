pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod symbols;
pub mod geometry {
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod intersections;
    pub mod junctions;
    pub mod movement;
    pub mod normalize;
    pub mod picking;
    pub mod topology;
}
mod json;

use algorithms::movement::{self, MoveContext, MoveSession};
use algorithms::normalize::{NormalizeStats, UnifyReport};
use algorithms::topology::{self, Swp, Topology};
use geometry::limits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use config::EngineConfig;
pub use error::SchematicError;
pub use model::{
    Axis, Color, Component, ComponentId, Junction, LineStyle, NetClass, NodeKey, Point,
    ResolvedStroke, Rotation, Stroke, StylePalette, SwpId, Theme, Wire, WireId,
};
pub use symbols::ComponentKind;

pub type Result<T> = std::result::Result<T, SchematicError>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Pick {
    #[serde(rename = "component")]
    Component { id: ComponentId, dist: f32 },
    #[serde(rename = "junction")]
    Junction { x: f32, y: f32, dist: f32 },
    #[serde(rename = "wire")]
    Wire { id: WireId, index: usize, t: f32, dist: f32 },
}

/// Owner of the wire store and every view derived from it.
///
/// Mutations bump the geometry version; the topology records the version
/// it was built from, so callers can tell when `rebuild_topology` is due.
/// An open move session is finished before any structural mutation.
pub struct Schematic {
    pub(crate) store: store::Store,
    pub(crate) config: EngineConfig,
    pub(crate) palette: StylePalette,
    pub(crate) topology: Topology,
    pub(crate) session: MoveSession,
    pub(crate) geom_ver: u64,
}

impl Default for Schematic {
    fn default() -> Self {
        Schematic::new()
    }
}

fn check_point(p: Point, what: &'static str) -> Result<()> {
    if limits::in_coord_bounds(p.x) && limits::in_coord_bounds(p.y) {
        Ok(())
    } else {
        Err(SchematicError::BadCoordinate(what))
    }
}

fn check_stroke(stroke: &Stroke) -> Result<()> {
    if limits::in_width_bounds(stroke.width) {
        Ok(())
    } else {
        Err(SchematicError::BadCoordinate("stroke width"))
    }
}

impl Schematic {
    pub fn new() -> Self {
        Schematic::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Schematic {
            store: store::Store::new(),
            config,
            palette: StylePalette::default(),
            topology: Topology::default(),
            session: MoveSession::Idle,
            geom_ver: 1,
        }
    }

    pub fn geom_version(&self) -> u64 {
        self.geom_ver
    }

    /// The last rebuild still describes the store.
    pub fn topology_is_current(&self) -> bool {
        self.topology.built_ver() == self.geom_ver
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
        self.bump();
    }

    pub fn palette(&self) -> &StylePalette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: StylePalette) {
        self.palette = palette;
        self.bump();
    }

    // Read access
    pub fn wires(&self) -> &[Wire] {
        self.store.wires()
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.store.wire(id)
    }

    pub fn components(&self) -> &[Component] {
        self.store.components()
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.store.component(id)
    }

    pub fn junctions(&self) -> &[Junction] {
        self.store.junctions()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn swp(&self, id: SwpId) -> Option<&Swp> {
        self.topology.swp(id)
    }

    pub fn swp_for_segment(&self, wire: WireId, index: usize) -> Option<&Swp> {
        self.topology.swp_for_segment(wire, index)
    }

    pub fn swp_id_for_component(&self, component: ComponentId) -> Option<SwpId> {
        self.topology.swp_id_for_component(component)
    }

    pub fn move_session(&self) -> &MoveSession {
        &self.session
    }

    pub fn resolved_stroke(&self, wire: WireId) -> Result<ResolvedStroke> {
        let w = self.store.wire(wire).ok_or(SchematicError::UnknownWire(wire))?;
        Ok(self.palette.resolve(&w.stroke, w.net.as_deref()))
    }

    /// Drawn size and color of a junction dot.
    pub fn junction_appearance(&self, j: &Junction) -> (f32, Color) {
        let theme = &self.palette.theme;
        (
            j.style.size.unwrap_or(theme.junction_size),
            j.style.color.unwrap_or(theme.junction_color),
        )
    }

    pub fn pick(&self, x: f32, y: f32, tol: f32) -> Option<Pick> {
        algorithms::picking::pick_impl(&self.store, x, y, tol)
    }

    // Wires
    pub fn add_wire(&mut self, points: Vec<Point>, stroke: Stroke, net: Option<String>) -> Result<WireId> {
        if points.len() < 2 {
            return Err(SchematicError::TooFewPoints(points.len()));
        }
        if points.len() > limits::MAX_POINTS_PER_WIRE {
            return Err(SchematicError::LimitExceeded {
                what: "points per wire",
                max: limits::MAX_POINTS_PER_WIRE,
                got: points.len(),
            });
        }
        if self.store.wires().len() >= limits::MAX_WIRES {
            return Err(SchematicError::LimitExceeded {
                what: "wires",
                max: limits::MAX_WIRES,
                got: self.store.wires().len() + 1,
            });
        }
        for p in &points {
            check_point(*p, "wire point")?;
        }
        check_stroke(&stroke)?;
        self.end_session();
        let id = self.store.insert_wire(points, stroke, net);
        self.bump();
        Ok(id)
    }

    pub fn remove_wire(&mut self, id: WireId) -> Result<()> {
        if self.store.wire(id).is_none() {
            return Err(SchematicError::UnknownWire(id));
        }
        self.end_session();
        // a session may have split or merged it away
        if self.store.remove_wire(id).is_some() {
            self.bump();
        }
        Ok(())
    }

    pub fn set_wire_stroke(&mut self, id: WireId, stroke: Stroke) -> Result<()> {
        check_stroke(&stroke)?;
        if self.store.wire(id).is_none() {
            return Err(SchematicError::UnknownWire(id));
        }
        self.end_session();
        let w = self.store.wire_mut(id).ok_or(SchematicError::UnknownWire(id))?;
        w.stroke = stroke;
        self.bump();
        Ok(())
    }

    pub fn set_wire_net(&mut self, id: WireId, net: Option<String>) -> Result<()> {
        if self.store.wire(id).is_none() {
            return Err(SchematicError::UnknownWire(id));
        }
        self.end_session();
        let w = self.store.wire_mut(id).ok_or(SchematicError::UnknownWire(id))?;
        w.net = net;
        self.bump();
        Ok(())
    }

    // Components
    /// Place a component. A two-pin part dropped onto a straight wire cuts
    /// the wire at its pins.
    pub fn place_component(&mut self, kind: ComponentKind, position: Point, rotation: Rotation) -> Result<ComponentId> {
        check_point(position, "component position")?;
        if self.store.components().len() >= limits::MAX_COMPONENTS {
            return Err(SchematicError::LimitExceeded {
                what: "components",
                max: limits::MAX_COMPONENTS,
                got: self.store.components().len() + 1,
            });
        }
        self.end_session();
        let id = self.store.insert_component(Component {
            id: 0,
            kind,
            position,
            rotation,
            label: String::new(),
            value: String::new(),
        });
        movement::cut_through_components(&mut self.store, &[id], self.config.coincide_eps);
        self.bump();
        Ok(id)
    }

    pub fn set_component_text(&mut self, id: ComponentId, label: String, value: String) -> Result<()> {
        let c = self.store.component_mut(id).ok_or(SchematicError::UnknownComponent(id))?;
        c.label = label;
        c.value = value;
        Ok(())
    }

    /// Direct placement outside a move session.
    pub fn move_component(&mut self, id: ComponentId, position: Point) -> Result<()> {
        check_point(position, "component position")?;
        if self.store.component(id).is_none() {
            return Err(SchematicError::UnknownComponent(id));
        }
        self.end_session();
        if let Some(c) = self.store.component_mut(id) {
            c.position = position;
        }
        movement::cut_through_components(&mut self.store, &[id], self.config.coincide_eps);
        self.bump();
        Ok(())
    }

    /// Quarter turn clockwise on screen.
    pub fn rotate_component(&mut self, id: ComponentId) -> Result<()> {
        if self.store.component(id).is_none() {
            return Err(SchematicError::UnknownComponent(id));
        }
        self.end_session();
        if let Some(c) = self.store.component_mut(id) {
            c.rotation = c.rotation.turned();
        }
        movement::cut_through_components(&mut self.store, &[id], self.config.coincide_eps);
        self.bump();
        Ok(())
    }

    pub fn remove_component(&mut self, id: ComponentId) -> Result<()> {
        if self.store.component(id).is_none() {
            return Err(SchematicError::UnknownComponent(id));
        }
        self.end_session();
        self.store.remove_component(id);
        self.bump();
        Ok(())
    }

    // Junctions
    pub fn add_manual_junction(&mut self, at: Point) -> Result<()> {
        check_point(at, "junction position")?;
        self.end_session();
        match self.store.junction_index(at.key()) {
            Some(i) => {
                let j = &mut self.store.junctions[i];
                j.manual = true;
                j.suppressed = false;
            }
            None => self.store.junctions.push(Junction {
                manual: true,
                ..Junction::automatic(at)
            }),
        }
        self.bump();
        Ok(())
    }

    /// Delete the junction drawn at `at`. Manual junctions disappear,
    /// automatic ones turn into suppression markers so rebuilds do not
    /// bring them back. Returns false when nothing visible was there.
    pub fn delete_junction(&mut self, at: Point) -> Result<bool> {
        check_point(at, "junction position")?;
        let Some(i) = self.store.junction_index(at.key()) else {
            return Ok(false);
        };
        if !self.store.junctions[i].is_visible() {
            return Ok(false);
        }
        self.end_session();
        let Some(i) = self.store.junction_index(at.key()) else {
            return Ok(false);
        };
        if self.store.junctions[i].manual {
            self.store.junctions.remove(i);
        } else {
            self.store.junctions[i].suppressed = true;
        }
        self.bump();
        Ok(true)
    }

    /// Drop a suppression marker so the automatic junction may return.
    pub fn restore_junction(&mut self, at: Point) -> Result<bool> {
        check_point(at, "junction position")?;
        let Some(i) = self.store.junction_index(at.key()) else {
            return Ok(false);
        };
        if self.store.junctions[i].is_visible() {
            return Ok(false);
        }
        self.store.junctions.remove(i);
        self.bump();
        Ok(true)
    }

    // Topology
    /// Full recomputation of the derived views. Junction reconciliation and
    /// splitting wait while a move session is open.
    pub fn rebuild_topology(&mut self) {
        let mut topo = topology::build(&self.store, &self.palette, &self.config, self.geom_ver);
        if !self.session.is_active() {
            let mut passes = 0;
            loop {
                algorithms::junctions::reconcile(&mut self.store, &topo);
                if !algorithms::junctions::split_at_junctions(&mut self.store, &topo) {
                    break;
                }
                passes += 1;
                self.bump();
                topo = topology::build(&self.store, &self.palette, &self.config, self.geom_ver);
                if passes >= self.config.max_junction_passes {
                    log::warn!("junction splitting still changing wires after {} passes", passes);
                    algorithms::junctions::reconcile(&mut self.store, &topo);
                    break;
                }
            }
        }
        self.topology = topo;
    }

    pub fn normalize(&mut self) -> NormalizeStats {
        self.end_session();
        let stats = algorithms::normalize::normalize(&mut self.store);
        if stats.changed() {
            self.bump();
        }
        stats
    }

    pub fn unify_inline(&mut self) -> UnifyReport {
        self.end_session();
        let mut blocked = self.store.pin_keys();
        blocked.extend(self.store.visible_junction_keys());
        let report = algorithms::normalize::unify_inline(
            &mut self.store,
            &blocked,
            self.config.coincide_eps,
            self.config.max_unify_passes,
        );
        self.bump();
        report
    }

    // Move sessions
    /// Collapse the straight run hosting `id`. Returns false when the
    /// component is not mapped onto a run.
    pub fn begin_move(&mut self, id: ComponentId) -> Result<bool> {
        if self.store.component(id).is_none() {
            return Err(SchematicError::UnknownComponent(id));
        }
        match self.session.component() {
            Some(active) if active == id => return Ok(true),
            Some(_) => {
                self.end_session();
            }
            None => {}
        }
        if !self.topology_is_current() {
            self.rebuild_topology();
        }
        let Some(ctx) = movement::begin(&mut self.store, &self.topology, id, self.config.coincide_eps) else {
            return Ok(false);
        };
        log::debug!("begin_move: component {} on run {}", id, ctx.swp);
        self.session = MoveSession::Collapsed(ctx);
        self.bump();
        Ok(true)
    }

    /// Returns false (position unchanged) when no session is open for `id`
    /// or the step is rejected.
    pub fn update_move(&mut self, id: ComponentId, candidate: Point) -> Result<bool> {
        if !candidate.is_finite() {
            return Err(SchematicError::BadCoordinate("candidate position"));
        }
        if self.store.component(id).is_none() {
            return Err(SchematicError::UnknownComponent(id));
        }
        let accepted = match self.session.context() {
            Some(ctx) if ctx.component == id => movement::update(&mut self.store, ctx, candidate, &self.config),
            _ => false,
        };
        if accepted {
            self.bump();
        }
        Ok(accepted)
    }

    pub fn finish_move(&mut self, id: ComponentId) -> Result<bool> {
        if self.store.component(id).is_none() {
            return Err(SchematicError::UnknownComponent(id));
        }
        if self.session.component() != Some(id) {
            return Ok(false);
        }
        Ok(self.end_session())
    }

    /// Same as finishing; a collapsed run is never discarded.
    pub fn cancel_move(&mut self) -> bool {
        self.end_session()
    }

    fn end_session(&mut self) -> bool {
        let Some(ctx) = self.session.take() else {
            return false;
        };
        self.finish_context(ctx);
        true
    }

    fn finish_context(&mut self, ctx: MoveContext) {
        let component = ctx.component;
        movement::finish(&mut self.store, ctx, &self.config);
        self.bump();
        self.rebuild_topology();
        log::debug!("finish_move: component {}, {} wires", component, self.store.wires().len());
    }

    // Documents
    pub fn to_json_value(&self) -> Value {
        json::to_json_impl(&self.store, &self.palette)
    }

    /// Load a snapshot document. Open sessions are finished first; on error
    /// the store is left as it was.
    pub fn from_json_value(&mut self, v: Value) -> Result<()> {
        self.end_session();
        json::from_json_impl(&mut self.store, &mut self.palette, v)?;
        self.bump();
        Ok(())
    }

    pub fn from_json_str(&mut self, s: &str) -> Result<()> {
        let v: Value = serde_json::from_str(s)?;
        self.from_json_value(v)
    }

    pub fn clear(&mut self) {
        self.session = MoveSession::Idle;
        self.store.clear();
        self.bump();
    }

    fn bump(&mut self) {
        self.geom_ver = self.geom_ver.wrapping_add(1);
    }
}
