use wasm_bindgen::prelude::*;
use wirenet::SchematicError;

use crate::interop::{new_obj, num, set_kv};

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f32, max: f32, got: f32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &num(min));
    set_kv(&d, "max", &num(max));
    set_kv(&d, "got", &num(got));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn invalid_argument(param: &str, message: impl Into<String>) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("invalid_argument", message, Some(d.into()))
}

pub fn serialize_failed(e: serde_wasm_bindgen::Error) -> JsValue {
    err("serialize", e.to_string(), None)
}

/// Map a core error to `{ ok: false, error: { code, message, data } }`.
pub fn from_core(e: &SchematicError) -> JsValue {
    let d = new_obj();
    match e {
        SchematicError::UnknownComponent(id) => {
            set_kv(&d, "kind", &JsValue::from_str("component"));
            set_kv(&d, "id", &num(*id));
        }
        SchematicError::UnknownWire(id) => {
            set_kv(&d, "kind", &JsValue::from_str("wire"));
            set_kv(&d, "id", &num(*id));
        }
        SchematicError::BadCoordinate(param) => set_kv(&d, "param", &JsValue::from_str(param)),
        SchematicError::TooFewPoints(got) => set_kv(&d, "got", &num(*got as f64)),
        SchematicError::LimitExceeded { what, max, got } => {
            set_kv(&d, "what", &JsValue::from_str(what));
            set_kv(&d, "max", &num(*max as f64));
            set_kv(&d, "got", &num(*got as f64));
        }
        SchematicError::InvalidDocument(_) | SchematicError::Json(_) => {}
    }
    err(e.code(), e.to_string(), Some(d.into()))
}

pub fn result<T>(r: Result<T, SchematicError>, f: impl FnOnce(T) -> JsValue) -> JsValue {
    match r {
        Ok(v) => ok(f(v)),
        Err(e) => from_core(&e),
    }
}
