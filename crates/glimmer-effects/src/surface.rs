//! The element query/mutation capability effects are applied through.

use std::collections::HashSet;
use std::fmt;

use glimmer_core::{Rect, Size};

use crate::error::EffectError;
use crate::transform::Transform;

/// A document-like surface: find elements, measure them, restyle them.
pub trait ElementSurface {
    type Id: Copy + fmt::Debug;

    /// Elements matching a selector, in document order.
    fn query(&self, selector: &str) -> Vec<Self::Id>;

    fn attribute(&self, id: Self::Id, name: &str) -> Option<String>;

    /// Bounding box in viewport coordinates; `None` once detached.
    fn bounding_box(&self, id: Self::Id) -> Option<Rect>;

    fn viewport(&self) -> Size;

    fn set_transform(&mut self, id: Self::Id, transform: &Transform) -> Result<(), EffectError>;

    /// Toggle a presentational flag (a class, in DOM terms).
    fn set_flag(&mut self, id: Self::Id, flag: &str, on: bool) -> Result<(), EffectError>;
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    rect: Rect,
    transform: Option<Transform>,
    flags: HashSet<String>,
    attached: bool,
}

/// An in-memory surface for headless hosts and tests.
///
/// Selectors are a comma-separated list of `.class`, `[attribute]` or bare
/// names; a bare name matches a class of the same name.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    viewport: Size,
    elements: Vec<Element>,
    writes: usize,
}

impl MemorySurface {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Add an element and return its id.
    pub fn insert(
        &mut self,
        name: &str,
        classes: &[&str],
        attributes: &[(&str, &str)],
        rect: Rect,
    ) -> usize {
        self.elements.push(Element {
            name: name.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            rect,
            transform: None,
            flags: HashSet::new(),
            attached: true,
        });
        self.elements.len() - 1
    }

    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|e| e.attached && e.name == name)
    }

    pub fn detach(&mut self, name: &str) {
        if let Some(id) = self.id_of(name) {
            self.elements[id].attached = false;
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_rect(&mut self, name: &str, rect: Rect) {
        if let Some(id) = self.id_of(name) {
            self.elements[id].rect = rect;
        }
    }

    pub fn rect_of(&self, name: &str) -> Option<Rect> {
        self.id_of(name).map(|id| self.elements[id].rect)
    }

    pub fn transform_of(&self, name: &str) -> Option<Transform> {
        self.id_of(name).and_then(|id| self.elements[id].transform)
    }

    pub fn has_flag(&self, name: &str, flag: &str) -> bool {
        self.id_of(name)
            .is_some_and(|id| self.elements[id].flags.contains(flag))
    }

    /// Successful transform writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn live(&self, id: usize) -> Option<&Element> {
        self.elements.get(id).filter(|e| e.attached)
    }

    fn live_mut(&mut self, id: usize) -> Result<&mut Element, EffectError> {
        self.elements
            .get_mut(id)
            .filter(|e| e.attached)
            .ok_or_else(|| EffectError::Detached(format!("#{id}")))
    }
}

fn matches(element: &Element, selector: &str) -> bool {
    selector.split(',').map(str::trim).any(|simple| {
        if let Some(class) = simple.strip_prefix('.') {
            element.classes.iter().any(|c| c == class)
        } else if let Some(attr) = simple.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            element.attributes.iter().any(|(k, _)| k == attr)
        } else {
            !simple.is_empty() && element.classes.iter().any(|c| c == simple)
        }
    })
}

impl ElementSurface for MemorySurface {
    type Id = usize;

    fn query(&self, selector: &str) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.attached && matches(e, selector))
            .map(|(id, _)| id)
            .collect()
    }

    fn attribute(&self, id: usize, name: &str) -> Option<String> {
        self.live(id)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn bounding_box(&self, id: usize) -> Option<Rect> {
        self.live(id).map(|e| e.rect)
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn set_transform(&mut self, id: usize, transform: &Transform) -> Result<(), EffectError> {
        self.live_mut(id)?.transform = Some(*transform);
        self.writes += 1;
        Ok(())
    }

    fn set_flag(&mut self, id: usize, flag: &str, on: bool) -> Result<(), EffectError> {
        let element = self.live_mut(id)?;
        if on {
            element.flags.insert(flag.to_string());
        } else {
            element.flags.remove(flag);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        let mut surface = MemorySurface::new(Size::new(10.0, 10.0));
        let a = surface.insert("a", &["planet"], &[], Rect::default());
        let b = surface.insert("b", &["button"], &[("data-depth", "1")], Rect::default());
        assert_eq!(surface.query(".planet"), vec![a]);
        assert_eq!(surface.query("[data-depth]"), vec![b]);
        assert_eq!(surface.query("a, button, input"), vec![b]);
        assert_eq!(surface.query(".planet, [data-depth]"), vec![a, b]);
        assert!(surface.query("").is_empty());
    }

    #[test]
    fn test_detached_elements_reject_writes() {
        let mut surface = MemorySurface::new(Size::new(10.0, 10.0));
        let id = surface.insert("x", &["planet"], &[], Rect::new(0.0, 0.0, 1.0, 1.0));
        surface.detach("x");
        assert!(surface.query(".planet").is_empty());
        assert_eq!(surface.bounding_box(id), None);
        assert_eq!(
            surface.set_transform(id, &Transform::IDENTITY),
            Err(EffectError::Detached("#0".to_string()))
        );
        assert_eq!(surface.writes(), 0);
    }
}
