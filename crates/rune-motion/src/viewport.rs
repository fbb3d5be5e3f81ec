//! Rectangle-based viewport that implements [`IntersectionHost`].
//!
//! Hosts without a native intersection primitive can lay elements out here
//! and forward the entries returned by the scroll methods to the runtime.
//! Elements can live inside nested scroll containers; their visible area is
//! clipped by the container frame before it is intersected with the viewport.

use std::collections::HashMap;

use crate::error::{MotionError, Result};
use crate::observer::IntersectionHost;
use crate::types::ElementId;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f32 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Overlapping region, if the rectangles overlap with positive area.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w).min(other.x + other.w);
        let y1 = (self.y + self.h).min(other.y + other.h);
        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }
}

/// Handle for a nested scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u64);

#[derive(Debug, Clone, Copy)]
struct ScrollContainer {
    /// Frame in page coordinates.
    frame: Rect,
    scroll_x: f32,
    scroll_y: f32,
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    /// Page coordinates, or container content coordinates when `container` is set.
    rect: Rect,
    container: Option<ContainerId>,
}

/// Scrollable page with optional nested scroll containers.
#[derive(Debug, Default)]
pub struct SimulatedViewport {
    width: f32,
    height: f32,
    scroll_x: f32,
    scroll_y: f32,
    containers: HashMap<ContainerId, ScrollContainer>,
    elements: HashMap<ElementId, Placement>,
    /// Last ratio reported for each observed element.
    observed: HashMap<ElementId, f32>,
}

impl SimulatedViewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Place an element in page coordinates.
    pub fn place(&mut self, element: ElementId, rect: Rect) {
        self.elements.insert(
            element,
            Placement {
                rect,
                container: None,
            },
        );
    }

    pub fn add_container(&mut self, container: ContainerId, frame: Rect) {
        self.containers.insert(
            container,
            ScrollContainer {
                frame,
                scroll_x: 0.0,
                scroll_y: 0.0,
            },
        );
    }

    /// Place an element in a container's content coordinates.
    pub fn place_in(&mut self, container: ContainerId, element: ElementId, rect: Rect) {
        self.elements.insert(
            element,
            Placement {
                rect,
                container: Some(container),
            },
        );
    }

    /// Remove an element from layout. Observation of it stops.
    pub fn remove(&mut self, element: ElementId) {
        self.elements.remove(&element);
        self.observed.remove(&element);
    }

    pub fn is_observed(&self, element: ElementId) -> bool {
        self.observed.contains_key(&element)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Visible part of `element` in viewport coordinates.
    pub fn visible_rect(&self, element: ElementId) -> Option<Rect> {
        let placement = self.elements.get(&element)?;
        let page_rect = match placement.container {
            None => placement.rect,
            Some(id) => {
                let container = self.containers.get(&id)?;
                let rect = placement.rect.offset(
                    container.frame.x - container.scroll_x,
                    container.frame.y - container.scroll_y,
                );
                rect.intersect(&container.frame)?
            }
        };
        page_rect
            .offset(-self.scroll_x, -self.scroll_y)
            .intersect(&self.bounds())
    }

    /// Visible fraction of `element`'s area.
    pub fn intersection_ratio(&self, element: ElementId) -> f32 {
        let Some(placement) = self.elements.get(&element) else {
            return 0.0;
        };
        let area = placement.rect.area();
        if area <= 0.0 {
            return 0.0;
        }
        self.visible_rect(element)
            .map(|visible| (visible.area() / area).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    /// Scroll the page and report observed elements whose ratio changed.
    pub fn scroll_to(&mut self, y: f32) -> Vec<(ElementId, f32)> {
        self.scroll_y = y.max(0.0);
        self.changed_entries()
    }

    pub fn scroll_by(&mut self, dy: f32) -> Vec<(ElementId, f32)> {
        self.scroll_to(self.scroll_y + dy)
    }

    /// Scroll a nested container and report changed entries.
    pub fn scroll_container_to(&mut self, container: ContainerId, x: f32, y: f32) -> Vec<(ElementId, f32)> {
        if let Some(c) = self.containers.get_mut(&container) {
            c.scroll_x = x.max(0.0);
            c.scroll_y = y.max(0.0);
        }
        self.changed_entries()
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Vec<(ElementId, f32)> {
        self.width = width;
        self.height = height;
        self.changed_entries()
    }

    fn changed_entries(&mut self) -> Vec<(ElementId, f32)> {
        let mut elements: Vec<ElementId> = self.observed.keys().copied().collect();
        elements.sort();

        let mut entries = Vec::new();
        for element in elements {
            let ratio = self.intersection_ratio(element);
            if let Some(last) = self.observed.get_mut(&element) {
                if (*last - ratio).abs() > f32::EPSILON {
                    *last = ratio;
                    entries.push((element, ratio));
                }
            }
        }
        entries
    }
}

impl IntersectionHost for SimulatedViewport {
    fn observe(&mut self, element: ElementId, _threshold: f32) -> Result<f32> {
        if !self.elements.contains_key(&element) {
            return Err(MotionError::attach(element, "element is not laid out"));
        }
        let ratio = self.intersection_ratio(element);
        self.observed.insert(element, ratio);
        Ok(ratio)
    }

    fn unobserve(&mut self, element: ElementId) {
        self.observed.remove(&element);
    }
}
