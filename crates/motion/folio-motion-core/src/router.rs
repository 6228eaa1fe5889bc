//! Active-section detection.
//!
//! Sections are observed against a horizontal band of the viewport. Each
//! section that newly intersects the band writes its name into the shared
//! [`ActiveSection`] pointer; when several enter in the same frame the last
//! one in observation order wins. Leaving the band never clears the pointer,
//! so the navigation highlight stays on the most recently entered section.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::RouterBand;
use crate::host::{ElementHost, ElementKey};
use crate::ids::SectionId;
use crate::scroll::Viewport;

/// Shared, read-mostly handle to the active section name. Clones observe
/// the same value; only the router writes it.
#[derive(Clone, Debug, Default)]
pub struct ActiveSection(Rc<RefCell<Option<String>>>);

impl ActiveSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    pub fn is(&self, name: &str) -> bool {
        self.0.borrow().as_deref() == Some(name)
    }

    fn replace(&self, name: String) -> Option<String> {
        self.0.replace(Some(name))
    }
}

#[derive(Debug)]
struct Observed {
    name: String,
    element: ElementKey,
    intersecting: bool,
}

#[derive(Debug, Default)]
pub struct IntersectionRouter {
    band: RouterBand,
    observed: IndexMap<SectionId, Observed>,
    active: ActiveSection,
}

/// Emitted when the pointer moves to a different section.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveChange {
    pub previous: Option<String>,
    pub current: String,
}

impl IntersectionRouter {
    pub fn new(band: RouterBand) -> Self {
        Self {
            band,
            ..Self::default()
        }
    }

    pub fn active(&self) -> ActiveSection {
        self.active.clone()
    }

    pub fn observe(
        &mut self,
        section: SectionId,
        name: impl Into<String>,
        element: impl Into<ElementKey>,
    ) {
        self.observed.insert(
            section,
            Observed {
                name: name.into(),
                element: element.into(),
                intersecting: false,
            },
        );
    }

    pub fn unobserve(&mut self, section: SectionId) -> bool {
        self.observed.shift_remove(&section).is_some()
    }

    /// Band edges in document coordinates for the given viewport.
    pub fn band_bounds(&self, viewport: Viewport) -> (f32, f32) {
        (
            viewport.scroll_y + self.band.top * viewport.height,
            viewport.scroll_y + self.band.bottom * viewport.height,
        )
    }

    /// Re-evaluate every observed section. Returns the pointer change, if
    /// the winning section differs from the previous value.
    pub fn update(&mut self, viewport: Viewport, host: &dyn ElementHost) -> Option<ActiveChange> {
        let (band_top, band_bottom) = self.band_bounds(viewport);
        let mut entered: Option<String> = None;
        for observed in self.observed.values_mut() {
            let intersecting = host
                .bounds(&observed.element)
                .map(|r| r.top < band_bottom && r.bottom() > band_top)
                .unwrap_or(false);
            if intersecting && !observed.intersecting {
                entered = Some(observed.name.clone());
            }
            observed.intersecting = intersecting;
        }

        let current = entered?;
        if self.active.is(&current) {
            return None;
        }
        let previous = self.active.replace(current.clone());
        log::debug!("active section {:?} -> {}", previous, current);
        Some(ActiveChange { previous, current })
    }
}
