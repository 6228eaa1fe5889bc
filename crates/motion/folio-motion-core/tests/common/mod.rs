#![allow(dead_code)]
use std::collections::BTreeMap;

use folio_motion_core::{
    ElementHost, ElementState, EngineConfig, HostEvent, MemoryHost, MotionEngine, SectionSpec,
    Value,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Deserialize)]
pub struct Layout {
    pub viewport: Size,
    pub max_scroll: f32,
    pub elements: BTreeMap<String, ElementState>,
}

pub const SECTIONS: [&str; 6] = ["nav", "hero", "about", "projects", "certifications", "contact"];

pub fn layout() -> Layout {
    folio_test_fixtures::layouts::load("portfolio").expect("load portfolio layout")
}

pub fn host(layout: &Layout) -> MemoryHost {
    let mut host = MemoryHost::new();
    for (key, state) in &layout.elements {
        host.insert(key.clone(), state.bounds);
    }
    host
}

pub fn section(name: &str) -> SectionSpec {
    folio_test_fixtures::sections::load(name)
        .unwrap_or_else(|e| panic!("load section fixture {name}: {e:#}"))
}

pub fn engine(cfg: EngineConfig, layout: &Layout) -> MotionEngine {
    let mut engine = MotionEngine::new(cfg).expect("valid config");
    engine.dispatch(HostEvent::Resize {
        width: layout.viewport.width,
        height: layout.viewport.height,
        max_scroll: Some(layout.max_scroll),
    });
    engine
}

/// Every explicitly held property value on the page.
pub fn snapshot(host: &MemoryHost) -> BTreeMap<(String, String), Value> {
    host.elements()
        .flat_map(|(key, state)| {
            state
                .props
                .iter()
                .map(move |(prop, value)| ((key.clone(), prop.clone()), *value))
        })
        .collect()
}

/// Current value of every property named in `keys` (rest values included).
pub fn read_all(host: &MemoryHost, keys: &[(String, String)]) -> Vec<Option<Value>> {
    keys.iter().map(|(el, prop)| host.read(el, prop)).collect()
}

pub fn f(host: &MemoryHost, element: &str, property: &str) -> f32 {
    host.get_f32(element, property)
        .unwrap_or_else(|| panic!("{element}.{property} not readable"))
}

pub fn scroll_to(engine: &mut MotionEngine, host: &mut MemoryHost, y: f32) {
    engine.dispatch(HostEvent::Scroll { y });
    engine.frame(1.0 / 60.0, host);
}

pub fn run(engine: &mut MotionEngine, host: &mut MemoryHost, seconds: f32) {
    let frames = (seconds * 60.0).ceil() as usize;
    for _ in 0..frames {
        engine.frame(1.0 / 60.0, host);
    }
}
