//! Segment store: the single owner of wires, components and junction
//! markers. No algorithms live here, only bookkeeping.

use std::collections::{BTreeSet, HashSet};

use crate::model::{
    Component, ComponentId, Junction, NodeKey, Point, Stroke, Wire, WireId,
};

#[derive(Clone, Debug, Default)]
pub struct Store {
    pub(crate) wires: Vec<Wire>,
    pub(crate) components: Vec<Component>,
    pub(crate) junctions: Vec<Junction>,
    next_wire_id: WireId,
    next_component_id: ComponentId,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    // Wires
    pub(crate) fn mint_wire_id(&mut self) -> WireId {
        let id = self.next_wire_id;
        self.next_wire_id = self.next_wire_id.wrapping_add(1);
        id
    }

    pub fn insert_wire(&mut self, points: Vec<Point>, stroke: Stroke, net: Option<String>) -> WireId {
        let id = self.mint_wire_id();
        self.wires.push(Wire {
            id,
            points,
            stroke,
            net,
        });
        id
    }

    /// Insert a wire keeping its id; later mints stay above it.
    pub(crate) fn restore_wire(&mut self, wire: Wire) {
        if wire.id >= self.next_wire_id {
            self.next_wire_id = wire.id.wrapping_add(1);
        }
        self.wires.push(wire);
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.iter().find(|w| w.id == id)
    }

    pub(crate) fn wire_mut(&mut self, id: WireId) -> Option<&mut Wire> {
        self.wires.iter_mut().find(|w| w.id == id)
    }

    pub(crate) fn remove_wire(&mut self, id: WireId) -> Option<Wire> {
        let idx = self.wires.iter().position(|w| w.id == id)?;
        Some(self.wires.remove(idx))
    }

    /// Cut the listed segments out of a wire. The remaining contiguous runs
    /// stay in the store; the first run keeps the original id. Returns the
    /// removed segments with the wire's stroke and net.
    pub(crate) fn remove_segments(
        &mut self,
        id: WireId,
        indices: &BTreeSet<usize>,
    ) -> Vec<(Point, Point, Stroke, Option<String>)> {
        let Some(wire) = self.remove_wire(id) else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        let mut runs: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        for i in 0..wire.segment_count() {
            let (a, b) = (wire.points[i], wire.points[i + 1]);
            if indices.contains(&i) {
                removed.push((a, b, wire.stroke, wire.net.clone()));
                if current.len() >= 2 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            } else {
                if current.is_empty() {
                    current.push(a);
                }
                current.push(b);
            }
        }
        if current.len() >= 2 {
            runs.push(current);
        }
        for (n, points) in runs.into_iter().enumerate() {
            let run_id = if n == 0 { wire.id } else { self.mint_wire_id() };
            self.wires.push(Wire {
                id: run_id,
                points,
                stroke: wire.stroke,
                net: wire.net.clone(),
            });
        }
        removed
    }

    // Components
    pub fn insert_component(&mut self, mut component: Component) -> ComponentId {
        let id = self.next_component_id;
        self.next_component_id = self.next_component_id.wrapping_add(1);
        component.id = id;
        self.components.push(component);
        id
    }

    pub(crate) fn restore_component(&mut self, component: Component) {
        if component.id >= self.next_component_id {
            self.next_component_id = component.id.wrapping_add(1);
        }
        self.components.push(component);
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn remove_component(&mut self, id: ComponentId) -> Option<Component> {
        let idx = self.components.iter().position(|c| c.id == id)?;
        Some(self.components.remove(idx))
    }

    pub fn pin_keys(&self) -> HashSet<NodeKey> {
        self.components
            .iter()
            .flat_map(|c| c.pins())
            .map(|p| p.key())
            .collect()
    }

    // Junctions
    pub(crate) fn junction_index(&self, key: NodeKey) -> Option<usize> {
        self.junctions.iter().position(|j| j.key() == key)
    }

    /// Keys of junctions that are drawn (manual or automatic, not suppressed).
    pub fn visible_junction_keys(&self) -> HashSet<NodeKey> {
        self.junctions
            .iter()
            .filter(|j| j.is_visible())
            .map(|j| j.key())
            .collect()
    }

    pub(crate) fn manual_junction_keys(&self) -> HashSet<NodeKey> {
        self.junctions
            .iter()
            .filter(|j| j.manual && j.is_visible())
            .map(|j| j.key())
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.wires.clear();
        self.components.clear();
        self.junctions.clear();
        self.next_wire_id = 0;
        self.next_component_id = 0;
    }
}
