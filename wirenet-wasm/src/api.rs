use crate::Editor;
use crate::error;
use crate::interop::{arr_f32, arr_u32, arr_u8, new_obj, num, set_kv, to_js};
use wasm_bindgen::prelude::*;
use wirenet::{ComponentKind, EngineConfig, Point, Rotation, Stroke, StylePalette};

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Route core log records to the browser console. `level` is one of
/// off, error, warn, info, debug, trace.
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    crate::interop::install_console_logger(crate::interop::parse_level(level));
}

fn finite2(x: f32, y: f32) -> Result<Point, JsValue> {
    if !x.is_finite() {
        return Err(error::non_finite("x"));
    }
    if !y.is_finite() {
        return Err(error::non_finite("y"));
    }
    Ok(Point::new(x, y))
}

fn points_from_flat(flat: &[f32]) -> Result<Vec<Point>, JsValue> {
    if flat.len() % 2 != 0 {
        return Err(error::invalid_argument("points", "expected an even number of coordinates"));
    }
    if let Some(bad) = flat.iter().position(|v| !v.is_finite()) {
        return Err(error::non_finite(if bad % 2 == 0 { "points.x" } else { "points.y" }));
    }
    Ok(flat.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect())
}

fn stroke_from_js(v: JsValue) -> Result<Stroke, JsValue> {
    if v.is_undefined() || v.is_null() {
        return Ok(Stroke::default());
    }
    serde_wasm_bindgen::from_value(v).map_err(|e| error::invalid_argument("stroke", e.to_string()))
}

fn kind_from_str(kind: &str) -> Result<ComponentKind, JsValue> {
    serde_json::from_value(serde_json::Value::String(kind.to_ascii_lowercase()))
        .map_err(|_| error::invalid_argument("kind", format!("unknown component kind '{}'", kind)))
}

fn js_or_null<T: serde::Serialize + ?Sized>(v: Option<&T>) -> JsValue {
    v.and_then(|v| to_js(v).ok()).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        crate::Editor::rs_new()
    }
    pub fn geom_version(&self) -> u64 {
        self.rs_geom_version()
    }
    pub fn topology_is_current(&self) -> bool {
        self.inner.topology_is_current()
    }

    // Configuration
    pub fn set_config_res(&mut self, cfg: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<EngineConfig>(cfg) {
            Ok(c) => {
                self.inner.set_config(c);
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::invalid_argument("config", e.to_string()),
        }
    }
    pub fn set_palette_res(&mut self, palette: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<StylePalette>(palette) {
            Ok(p) => {
                self.inner.set_palette(p);
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::invalid_argument("palette", e.to_string()),
        }
    }

    // Wires
    /// `points` is flat `[x0, y0, x1, y1, ...]`; `stroke` may be omitted.
    pub fn add_wire_res(&mut self, points: &[f32], stroke: JsValue, net: Option<String>) -> JsValue {
        let points = match points_from_flat(points) {
            Ok(p) => p,
            Err(e) => return e,
        };
        let stroke = match stroke_from_js(stroke) {
            Ok(s) => s,
            Err(e) => return e,
        };
        error::result(self.inner.add_wire(points, stroke, net), |id| num(id))
    }
    pub fn remove_wire_res(&mut self, id: u32) -> JsValue {
        error::result(self.inner.remove_wire(id), |_| JsValue::TRUE)
    }
    pub fn set_wire_stroke_res(&mut self, id: u32, stroke: JsValue) -> JsValue {
        let stroke = match stroke_from_js(stroke) {
            Ok(s) => s,
            Err(e) => return e,
        };
        error::result(self.inner.set_wire_stroke(id, stroke), |_| JsValue::TRUE)
    }
    pub fn set_wire_net_res(&mut self, id: u32, net: Option<String>) -> JsValue {
        error::result(self.inner.set_wire_net(id, net), |_| JsValue::TRUE)
    }
    pub fn wire_count(&self) -> u32 {
        self.inner.wires().len() as u32
    }
    pub fn wires(&self) -> JsValue {
        to_js(self.inner.wires()).unwrap_or_else(error::serialize_failed)
    }
    pub fn resolved_stroke_res(&self, id: u32) -> JsValue {
        match self.inner.resolved_stroke(id) {
            Ok(s) => {
                let o = new_obj();
                set_kv(&o, "width", &num(s.width));
                set_kv(&o, "style", &js_or_null(Some(&s.style)));
                set_kv(&o, "color", &js_or_null(Some(&s.color)));
                error::ok(o.into())
            }
            Err(e) => error::from_core(&e),
        }
    }

    /// Typed arrays for drawing: ids, flat segment endpoints, resolved
    /// rgba and widths per segment.
    pub fn get_segment_data(&self) -> JsValue {
        let mut ids = Vec::new();
        let mut endpoints = Vec::new();
        let mut rgba = Vec::new();
        let mut widths = Vec::new();
        for w in self.inner.wires() {
            let rs = self.inner.palette().resolve(&w.stroke, w.net.as_deref());
            for s in w.points.windows(2) {
                ids.push(w.id);
                endpoints.extend_from_slice(&[s[0].x, s[0].y, s[1].x, s[1].y]);
                rgba.extend_from_slice(&[rs.color.r, rs.color.g, rs.color.b, rs.color.a]);
                widths.push(rs.width);
            }
        }
        let obj = new_obj();
        set_kv(&obj, "ids", &arr_u32(&ids).into());
        set_kv(&obj, "endpoints", &arr_f32(&endpoints).into());
        set_kv(&obj, "stroke_rgba", &arr_u8(&rgba).into());
        set_kv(&obj, "stroke_widths", &arr_f32(&widths).into());
        obj.into()
    }

    // Components
    pub fn place_component_res(&mut self, kind: &str, x: f32, y: f32, rotation: i32) -> JsValue {
        let kind = match kind_from_str(kind) {
            Ok(k) => k,
            Err(e) => return e,
        };
        let at = match finite2(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        error::result(self.inner.place_component(kind, at, Rotation::from(rotation)), |id| num(id))
    }
    pub fn move_component_res(&mut self, id: u32, x: f32, y: f32) -> JsValue {
        let at = match finite2(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        error::result(self.inner.move_component(id, at), |_| JsValue::TRUE)
    }
    pub fn rotate_component_res(&mut self, id: u32) -> JsValue {
        error::result(self.inner.rotate_component(id), |_| JsValue::TRUE)
    }
    pub fn remove_component_res(&mut self, id: u32) -> JsValue {
        error::result(self.inner.remove_component(id), |_| JsValue::TRUE)
    }
    pub fn set_component_text_res(&mut self, id: u32, label: String, value: String) -> JsValue {
        error::result(self.inner.set_component_text(id, label, value), |_| JsValue::TRUE)
    }
    pub fn components(&self) -> JsValue {
        to_js(self.inner.components()).unwrap_or_else(error::serialize_failed)
    }
    pub fn component_pins(&self, id: u32) -> JsValue {
        match self.inner.component(id) {
            Some(c) => {
                let flat: Vec<f32> = c.pins().iter().flat_map(|p| [p.x, p.y]).collect();
                arr_f32(&flat).into()
            }
            None => JsValue::NULL,
        }
    }

    // Junctions
    pub fn junctions(&self) -> JsValue {
        let out = js_sys::Array::new();
        for j in self.inner.junctions().iter().filter(|j| j.is_visible()) {
            let (size, color) = self.inner.junction_appearance(j);
            let o = new_obj();
            set_kv(&o, "x", &num(j.position.x));
            set_kv(&o, "y", &num(j.position.y));
            set_kv(&o, "manual", &JsValue::from_bool(j.manual));
            set_kv(&o, "size", &num(size));
            set_kv(&o, "color", &js_or_null(Some(&color)));
            out.push(&o.into());
        }
        out.into()
    }
    pub fn add_manual_junction_res(&mut self, x: f32, y: f32) -> JsValue {
        let at = match finite2(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        error::result(self.inner.add_manual_junction(at), |_| JsValue::TRUE)
    }
    pub fn delete_junction_res(&mut self, x: f32, y: f32) -> JsValue {
        let at = match finite2(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        error::result(self.inner.delete_junction(at), JsValue::from_bool)
    }
    pub fn restore_junction_res(&mut self, x: f32, y: f32) -> JsValue {
        let at = match finite2(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        error::result(self.inner.restore_junction(at), JsValue::from_bool)
    }

    // Topology
    #[wasm_bindgen(js_name = rebuildTopology)]
    pub fn rebuild_topology(&mut self) {
        self.inner.rebuild_topology();
    }
    pub fn swps(&self) -> JsValue {
        to_js(self.inner.topology().swps()).unwrap_or_else(error::serialize_failed)
    }
    pub fn topology_stats(&self) -> JsValue {
        let t = self.inner.topology();
        let o = new_obj();
        set_kv(&o, "nodes", &num(t.node_count() as f64));
        set_kv(&o, "edges", &num(t.edges().len() as f64));
        set_kv(&o, "swps", &num(t.swps().len() as f64));
        set_kv(&o, "built_ver", &num(t.built_ver() as f64));
        o.into()
    }
    #[wasm_bindgen(js_name = swpForSegment)]
    pub fn swp_for_segment(&self, wire: u32, index: u32) -> JsValue {
        js_or_null(self.inner.swp_for_segment(wire, index as usize))
    }
    #[wasm_bindgen(js_name = swpIdForComponent)]
    pub fn swp_id_for_component(&self, component: u32) -> Option<u32> {
        self.inner.swp_id_for_component(component)
    }

    // Normalize / merge
    pub fn normalize(&mut self) -> JsValue {
        let s = self.inner.normalize();
        let o = new_obj();
        set_kv(&o, "kept", &num(s.kept as f64));
        set_kv(&o, "produced", &num(s.produced as f64));
        set_kv(&o, "dropped", &num(s.dropped as f64));
        o.into()
    }
    #[wasm_bindgen(js_name = unifyInline)]
    pub fn unify_inline(&mut self) -> JsValue {
        let r = self.inner.unify_inline();
        let o = new_obj();
        set_kv(&o, "merges", &num(r.merges as f64));
        set_kv(&o, "passes", &num(r.passes as f64));
        let aborted = match r.aborted {
            Some(a) => JsValue::from_str(&format!("{:?}", a)),
            None => JsValue::NULL,
        };
        set_kv(&o, "aborted", &aborted);
        o.into()
    }

    // Move sessions
    #[wasm_bindgen(js_name = beginMove)]
    pub fn begin_move(&mut self, component: u32) -> JsValue {
        error::result(self.inner.begin_move(component), JsValue::from_bool)
    }
    #[wasm_bindgen(js_name = updateMove)]
    pub fn update_move(&mut self, component: u32, x: f32, y: f32) -> JsValue {
        let at = match finite2(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        error::result(self.inner.update_move(component, at), JsValue::from_bool)
    }
    #[wasm_bindgen(js_name = finishMove)]
    pub fn finish_move(&mut self, component: u32) -> JsValue {
        error::result(self.inner.finish_move(component), JsValue::from_bool)
    }
    #[wasm_bindgen(js_name = cancelMove)]
    pub fn cancel_move(&mut self) -> bool {
        self.inner.cancel_move()
    }
    pub fn moving_component(&self) -> Option<u32> {
        self.inner.move_session().component()
    }

    // Picking + JSON
    pub fn pick_res(&self, x: f32, y: f32, tol: f32) -> JsValue {
        if let Err(e) = finite2(x, y) {
            return e;
        }
        if !tol.is_finite() {
            return error::non_finite("tol");
        }
        if tol < 0.0 {
            return error::out_of_range("tol", 0.0, f32::INFINITY, tol);
        }
        error::ok(js_or_null(self.inner.pick(x, y, tol).as_ref()))
    }
    pub fn to_json(&self) -> String {
        self.inner.to_json_value().to_string()
    }
    pub fn from_json_res(&mut self, s: &str) -> JsValue {
        error::result(self.inner.from_json_str(s), |_| JsValue::TRUE)
    }
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new()
    }
}
