//! Element host contract.
//!
//! The engine never touches a DOM or a scene graph directly. Adapters
//! implement [`ElementHost`] over whatever renders the page; the engine
//! reads current values and layout boxes through it and writes property
//! values back. [`MemoryHost`] is the in-memory implementation used by
//! tests and by the wasm adapter's mirror.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Opaque element key (small string, e.g. "about.left").
pub type ElementKey = String;

/// Layout box in document coordinates (not viewport-relative).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }
}

/// Capabilities the engine needs from a rendering host.
pub trait ElementHost {
    /// Whether the element is currently rendered.
    fn exists(&self, element: &str) -> bool;

    /// Current value of a property; `None` when the element is absent.
    fn read(&self, element: &str, property: &str) -> Option<Value>;

    /// Write a property value. Writes to absent elements are ignored.
    fn write(&mut self, element: &str, property: &str, value: Value);

    /// Layout box of the element; `None` when the element is absent.
    fn bounds(&self, element: &str) -> Option<Rect>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElementState {
    pub bounds: Rect,
    #[serde(default)]
    pub props: HashMap<String, Value>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    elements: HashMap<ElementKey, ElementState>,
    writes: u64,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or move an element. Existing property values are kept.
    pub fn insert(&mut self, element: impl Into<ElementKey>, bounds: Rect) {
        self.elements
            .entry(element.into())
            .and_modify(|state| state.bounds = bounds)
            .or_insert_with(|| ElementState {
                bounds,
                props: HashMap::new(),
            });
    }

    /// Remove an element (unrendered). Returns its last state.
    pub fn remove(&mut self, element: &str) -> Option<ElementState> {
        self.elements.remove(element)
    }

    /// Set a property without counting it as an engine write (host styling).
    pub fn set(&mut self, element: &str, property: &str, value: Value) {
        if let Some(state) = self.elements.get_mut(element) {
            state.props.insert(property.to_string(), value);
        }
    }

    pub fn get_f32(&self, element: &str, property: &str) -> Option<f32> {
        self.read(element, property).and_then(|v| v.as_f32())
    }

    /// Total writes received through [`ElementHost::write`].
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    pub fn elements(&self) -> impl Iterator<Item = (&ElementKey, &ElementState)> {
        self.elements.iter()
    }
}

impl ElementHost for MemoryHost {
    fn exists(&self, element: &str) -> bool {
        self.elements.contains_key(element)
    }

    fn read(&self, element: &str, property: &str) -> Option<Value> {
        let state = self.elements.get(element)?;
        Some(
            state
                .props
                .get(property)
                .copied()
                .unwrap_or_else(|| Value::rest_for(property)),
        )
    }

    fn write(&mut self, element: &str, property: &str, value: Value) {
        if let Some(state) = self.elements.get_mut(element) {
            state.props.insert(property.to_string(), value);
            self.writes += 1;
        }
    }

    fn bounds(&self, element: &str) -> Option<Rect> {
        self.elements.get(element).map(|s| s.bounds)
    }
}
