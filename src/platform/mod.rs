//! Platform entry points
//!
//! The browser editor calls into the engine through `wasm_bindgen`. Scenes
//! cross the boundary as scene-document JSON and results come back as JSON,
//! so the host never depends on Rust-side layouts.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::scene_file::SceneDocument;
    use crate::sim::{Gating, Viewport, trace};

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        // Ignore a second init when the module is reloaded
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Optics engine loaded");
    }

    /// Trace a scene document; returns the trace result as JSON
    #[wasm_bindgen(js_name = traceSceneJson)]
    pub fn trace_scene_json(scene_json: &str, width: f64, height: f64) -> Result<String, JsValue> {
        let scene = SceneDocument::from_json(scene_json)
            .and_then(|doc| doc.to_scene())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let result = trace(&scene, Viewport::new(width, height), &Gating::Disabled);
        serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Export a scene document with fresh detector readings
    #[wasm_bindgen(js_name = exportSceneJson)]
    pub fn export_scene_json(
        scene_json: &str,
        width: f64,
        height: f64,
        timestamp: &str,
    ) -> Result<String, JsValue> {
        let scene = SceneDocument::from_json(scene_json)
            .and_then(|doc| doc.to_scene())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let result = trace(&scene, Viewport::new(width, height), &Gating::Disabled);
        SceneDocument::export(&scene, Some(&result))
            .with_timestamp(timestamp)
            .to_json_pretty()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{export_scene_json, trace_scene_json};
