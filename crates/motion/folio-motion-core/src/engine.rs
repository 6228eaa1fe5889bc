//! Engine orchestration.
//!
//! The engine owns the shared scroll tracker, the intersection router, the
//! optional smooth scroller and one [`SectionController`] per mounted
//! section. Host events are recorded through [`MotionEngine::dispatch`]
//! without touching any element; all property writes happen inside
//! [`MotionEngine::frame`], in this order:
//!
//! 1. smooth scroll advances and feeds the tracker
//! 2. the tracker flushes one progress snapshot for the whole frame
//! 3. the router updates the active section
//! 4. section controllers apply timelines from the snapshot
//! 5. queued interaction work is drained
//! 6. micro-animations and pointer followers step

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::controller::{SectionController, SectionSpec};
use crate::error::{MotionError, Result};
use crate::frame::FrameScheduler;
use crate::host::ElementHost;
use crate::ids::{IdSequence, SectionId};
use crate::interaction::InteractionEvent;
use crate::outputs::{FrameOutputs, MotionEvent};
use crate::router::{ActiveSection, IntersectionRouter};
use crate::scroll::{ScrollTracker, Viewport};
use crate::smooth::SmoothScroller;

/// Inputs from the rendering host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Native scroll position changed.
    Scroll { y: f32 },
    Resize {
        width: f32,
        height: f32,
        /// Largest scroll offset (document height minus viewport height).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_scroll: Option<f32>,
    },
    /// Elements moved without a viewport resize.
    LayoutChanged,
    Wheel { delta: f32 },
    Touch { delta: f32 },
    /// Scroll to an absolute offset, animated when smooth scrolling is on.
    ScrollTo { y: f32 },
    Pointer {
        element: String,
        event: InteractionEvent,
    },
    PointerMove { x: f32, y: f32 },
}

#[derive(Clone, Debug, PartialEq)]
enum Work {
    Interact {
        element: String,
        event: InteractionEvent,
    },
    PointerMoved([f32; 2]),
}

#[derive(Debug)]
pub struct MotionEngine {
    cfg: EngineConfig,
    ids: IdSequence<SectionId>,
    tracker: ScrollTracker,
    router: IntersectionRouter,
    smooth: Option<SmoothScroller>,
    sections: IndexMap<SectionId, SectionController>,
    names: HashMap<String, SectionId>,
    scheduler: FrameScheduler<Work>,
    /// Writes and events produced between frames (mount/unmount).
    pending: FrameOutputs,
    outputs: FrameOutputs,
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl MotionEngine {
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::build(cfg))
    }

    fn build(cfg: EngineConfig) -> Self {
        Self {
            ids: IdSequence::new(),
            tracker: ScrollTracker::new(Viewport::default()),
            router: IntersectionRouter::new(cfg.router_band),
            smooth: cfg.smooth_scroll.map(SmoothScroller::new),
            sections: IndexMap::new(),
            names: HashMap::new(),
            scheduler: FrameScheduler::new(),
            pending: FrameOutputs::default(),
            outputs: FrameOutputs::default(),
            cfg,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn viewport(&self) -> Viewport {
        self.tracker.viewport()
    }

    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    /// Shared handle to the active section name.
    pub fn active_section(&self) -> ActiveSection {
        self.router.active()
    }

    pub fn section_id(&self, name: &str) -> Option<SectionId> {
        self.names.get(name).copied()
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionController> {
        self.sections.get(&id)
    }

    /// Mounted section names in mount order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.values().map(SectionController::name)
    }

    /// Validate and start a section. Initial state is written immediately
    /// so nothing renders unstyled before the next frame.
    pub fn mount(&mut self, spec: SectionSpec, host: &mut dyn ElementHost) -> Result<SectionId> {
        spec.validate()?;
        if self.names.contains_key(&spec.name) {
            return Err(MotionError::DuplicateSection(spec.name));
        }
        let id = self.ids.next_id();
        let name = spec.name.clone();
        if let Some(anchor) = &spec.anchor {
            self.router.observe(id, name.clone(), anchor.clone());
        }
        let mut controller = SectionController::new(id, spec, self.cfg.pointer_smoothing);
        controller.start(host, &mut self.tracker, &mut self.pending);
        self.pending.push_event(MotionEvent::SectionMounted {
            section: id,
            name: name.clone(),
        });
        log::debug!("mounted '{name}' as {id}");
        self.names.insert(name, id);
        self.sections.insert(id, controller);
        Ok(id)
    }

    /// Tear a section down and restore everything it wrote. Returns false
    /// for unknown ids.
    pub fn unmount(&mut self, id: SectionId, host: &mut dyn ElementHost) -> bool {
        let Some(mut controller) = self.sections.shift_remove(&id) else {
            if !self.ids.was_issued(id) {
                log::warn!("unmount of {id}, which was never mounted");
            }
            return false;
        };
        let reverted = controller.stop(host, &mut self.tracker, &mut self.pending);
        self.router.unobserve(id);
        let cancelled = self.scheduler.cancel_owner(id);
        self.names.remove(controller.name());
        log::debug!(
            "unmounted '{}' ({id}): reverted {reverted}, cancelled {cancelled} tasks",
            controller.name()
        );
        self.pending.push_event(MotionEvent::SectionUnmounted {
            section: id,
            name: controller.name().to_string(),
            reverted,
        });
        true
    }

    pub fn unmount_by_name(&mut self, name: &str, host: &mut dyn ElementHost) -> bool {
        match self.section_id(name) {
            Some(id) => self.unmount(id, host),
            None => false,
        }
    }

    /// Record a host event. Nothing is written until the next frame.
    pub fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::Scroll { y } => match &mut self.smooth {
                // Echo of a position we asked the host to apply.
                Some(smooth) if smooth.is_animating() => {}
                Some(smooth) => {
                    smooth.jump_to(y);
                    self.tracker.on_scroll(y);
                }
                None => self.tracker.on_scroll(y),
            },
            HostEvent::Resize {
                width,
                height,
                max_scroll,
            } => {
                self.tracker.on_resize(width, height);
                if let (Some(smooth), Some(max)) = (&mut self.smooth, max_scroll) {
                    smooth.set_limit(max);
                }
            }
            HostEvent::LayoutChanged => self.tracker.invalidate_layout(),
            HostEvent::Wheel { delta } => {
                if let Some(smooth) = &mut self.smooth {
                    smooth.wheel(delta);
                }
            }
            HostEvent::Touch { delta } => {
                if let Some(smooth) = &mut self.smooth {
                    smooth.touch(delta);
                }
            }
            HostEvent::ScrollTo { y } => match &mut self.smooth {
                Some(smooth) => smooth.scroll_to(y),
                None => {
                    self.tracker.on_scroll(y);
                    self.pending.scroll_to = Some(y);
                }
            },
            HostEvent::Pointer { element, event } => {
                for (id, section) in &self.sections {
                    if section.handles(&element) {
                        self.scheduler.request(
                            *id,
                            Work::Interact {
                                element: element.clone(),
                                event,
                            },
                        );
                    }
                }
            }
            HostEvent::PointerMove { x, y } => {
                for (id, section) in &self.sections {
                    if section.has_followers() {
                        self.scheduler.request(*id, Work::PointerMoved([x, y]));
                    }
                }
            }
        }
    }

    /// Scroll to a mounted section's anchor element. Returns false when the
    /// section is unknown, has no anchor or the anchor is not rendered.
    pub fn scroll_to_section(&mut self, name: &str, host: &dyn ElementHost) -> bool {
        let top = self
            .section_id(name)
            .and_then(|id| self.sections.get(&id))
            .and_then(|s| s.spec().anchor.as_deref())
            .and_then(|anchor| host.bounds(anchor))
            .map(|rect| rect.top);
        match top {
            Some(y) => {
                self.dispatch(HostEvent::ScrollTo { y });
                true
            }
            None => false,
        }
    }

    /// Step one frame of `dt` seconds.
    pub fn frame(&mut self, dt: f32, host: &mut dyn ElementHost) -> &FrameOutputs {
        self.outputs.clear();
        self.outputs.changes.append(&mut self.pending.changes);
        self.outputs.events.append(&mut self.pending.events);
        self.outputs.scroll_to = self.pending.scroll_to.take();

        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.cfg.max_frame_dt)
        } else {
            0.0
        };

        if let Some(smooth) = &mut self.smooth {
            if let Some(y) = smooth.step(dt) {
                self.tracker.on_scroll(y);
                self.outputs.scroll_to = Some(y);
            }
        }

        let viewport = self.tracker.viewport();
        let snapshot = self.tracker.flush(&*host);

        if let Some(change) = self.router.update(viewport, &*host) {
            self.outputs.push_event(MotionEvent::ActiveSectionChanged {
                previous: change.previous,
                current: change.current,
            });
        }

        for controller in self.sections.values_mut() {
            controller.apply(snapshot, dt, &mut *host, &mut self.outputs);
        }

        for (owner, work) in self.scheduler.drain() {
            let Some(controller) = self.sections.get_mut(&owner) else {
                continue;
            };
            match work {
                Work::Interact { element, event } => controller.interact(&element, event, &*host),
                Work::PointerMoved(pointer) => controller.pointer_moved(pointer),
            }
        }

        for controller in self.sections.values_mut() {
            controller.step_interactions(dt, &mut *host, &mut self.outputs);
        }

        &self.outputs
    }
}
