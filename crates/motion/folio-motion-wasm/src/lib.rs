use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use folio_contact_core::ContactRequest;
use folio_motion_core::{
    EngineConfig, FrameOutputs, HostEvent, MemoryHost, MotionEngine, MotionEvent, Rect,
    SectionId, SectionSpec, Value,
};

/// Browser-facing engine. The JS side mirrors element boxes into an
/// in-memory host, forwards DOM events, calls `frame` from
/// `requestAnimationFrame` and applies the returned changes to the DOM.
#[wasm_bindgen]
pub struct FolioMotion {
    core: MotionEngine,
    host: MemoryHost,
    on_active: Option<Function>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

#[wasm_bindgen]
impl FolioMotion {
    /// Create an engine. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new FolioMotion({ smooth_scroll: { duration: 1.2 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FolioMotion, JsError> {
        console_error_panic_hook::set_once();

        let cfg: EngineConfig = if jsvalue_is_undefined_or_null(&config) {
            EngineConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let core = MotionEngine::new(cfg).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(FolioMotion {
            core,
            host: MemoryHost::new(),
            on_active: None,
        })
    }

    /// Register or move an element. `bounds` is `{ top, left, width, height }`
    /// in document coordinates.
    #[wasm_bindgen(js_name = set_element)]
    pub fn set_element(&mut self, key: String, bounds: JsValue) -> Result<(), JsError> {
        let rect: Rect =
            swb::from_value(bounds).map_err(|e| JsError::new(&format!("bounds error: {e}")))?;
        self.host.insert(key, rect);
        Ok(())
    }

    /// Forget an element (it left the DOM).
    #[wasm_bindgen(js_name = remove_element)]
    pub fn remove_element(&mut self, key: &str) -> bool {
        self.host.remove(key).is_some()
    }

    /// Seed a property value the page already shows (e.g. from CSS) so
    /// teardown restores it instead of the neutral default.
    #[wasm_bindgen(js_name = set_property)]
    pub fn set_property(
        &mut self,
        key: &str,
        property: &str,
        value: JsValue,
    ) -> Result<(), JsError> {
        let value: Value =
            swb::from_value(value).map_err(|e| JsError::new(&format!("value error: {e}")))?;
        self.host.set(key, property, value);
        Ok(())
    }

    /// Mount a section spec. Returns its id. Initial values are reported
    /// by the next `frame`.
    #[wasm_bindgen]
    pub fn mount(&mut self, spec: JsValue) -> Result<u32, JsError> {
        let spec: SectionSpec =
            swb::from_value(spec).map_err(|e| JsError::new(&format!("section spec error: {e}")))?;
        let id = self
            .core
            .mount(spec, &mut self.host)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id.0)
    }

    /// Mount a section spec given as JSON text (e.g. a fetched spec file).
    #[wasm_bindgen(js_name = mount_json)]
    pub fn mount_json(&mut self, json: &str) -> Result<u32, JsError> {
        let spec: SectionSpec = serde_json::from_str(json)
            .map_err(|e| JsError::new(&format!("section spec error: {e}")))?;
        let id = self
            .core
            .mount(spec, &mut self.host)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id.0)
    }

    /// Tear a section down. Restored values are reported by the next `frame`.
    #[wasm_bindgen]
    pub fn unmount(&mut self, id: u32) -> bool {
        self.core.unmount(SectionId(id), &mut self.host)
    }

    #[wasm_bindgen(js_name = unmount_by_name)]
    pub fn unmount_by_name(&mut self, name: &str) -> bool {
        self.core.unmount_by_name(name, &mut self.host)
    }

    /// Record a host event, e.g. `{ type: "scroll", y: 420 }`. Never writes.
    #[wasm_bindgen]
    pub fn dispatch(&mut self, event: JsValue) -> Result<(), JsError> {
        let event: HostEvent =
            swb::from_value(event).map_err(|e| JsError::new(&format!("event error: {e}")))?;
        self.core.dispatch(event);
        Ok(())
    }

    /// Step one frame. Returns `{ changes, events, scroll_to? }`.
    #[wasm_bindgen]
    pub fn frame(&mut self, dt: f32) -> Result<JsValue, JsError> {
        let out: &FrameOutputs = self.core.frame(dt, &mut self.host);
        if let Some(callback) = &self.on_active {
            for event in &out.events {
                if let MotionEvent::ActiveSectionChanged { current, .. } = event {
                    callback
                        .call1(&JsValue::UNDEFINED, &JsValue::from_str(current))
                        .map_err(|e| JsError::new(&format!("active section callback: {e:?}")))?;
                }
            }
        }
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Call `callback(name)` from `frame` whenever the active section
    /// changes. Pass undefined to stop.
    #[wasm_bindgen(js_name = on_active_section)]
    pub fn on_active_section(&mut self, callback: Option<Function>) {
        self.on_active = callback;
    }

    #[wasm_bindgen(js_name = active_section)]
    pub fn active_section(&self) -> Option<String> {
        self.core.active_section().get()
    }

    /// Glide (or jump, without smooth scrolling) to a section's anchor.
    #[wasm_bindgen(js_name = scroll_to_section)]
    pub fn scroll_to_section(&mut self, name: &str) -> bool {
        self.core.scroll_to_section(name, &self.host)
    }
}

#[derive(Serialize)]
struct ContactProblem {
    code: &'static str,
    message: &'static str,
}

/// Check a contact form before submitting it. Returns `null` when valid,
/// otherwise `{ code, message }` with the text to show next to the form.
#[wasm_bindgen(js_name = validate_contact)]
pub fn validate_contact(request: JsValue) -> Result<JsValue, JsError> {
    let request: ContactRequest =
        swb::from_value(request).map_err(|e| JsError::new(&format!("request error: {e}")))?;
    match request.validate() {
        Ok(_) => Ok(JsValue::NULL),
        Err(err) => {
            let problem = ContactProblem {
                code: err.code(),
                message: err.user_message(),
            };
            swb::to_value(&problem).map_err(|e| JsError::new(&format!("result error: {e}")))
        }
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
