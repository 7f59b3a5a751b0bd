use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct Editor { pub(crate) inner: wirenet::Schematic }

impl Editor {
    pub fn rs_new() -> Editor { Editor { inner: wirenet::Schematic::new() } }
    pub fn rs_geom_version(&self) -> u64 { self.inner.geom_version() }
}
