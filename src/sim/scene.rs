//! Scene snapshot and viewport
//!
//! A scene is an ordered element list with unique ids. Order does not affect
//! physics, but it decides ties between equidistant hits (first wins).

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::element::{Element, ElementId, ElementKind};
use crate::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, EXIT_LENGTH_FACTOR};

/// Precondition violations caught when a scene is assembled.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("Duplicate element id {0}")]
    DuplicateId(ElementId),

    #[error("Element {id} ({kind}) has a non-finite position or property")]
    NonFinite { id: ElementId, kind: &'static str },

    #[error("No element with id {0}")]
    NotFound(ElementId),

    #[error("Element {id} is a {from}, cannot become a {to}")]
    KindChanged {
        id: ElementId,
        from: &'static str,
        to: &'static str,
    },
}

/// Canvas bounds; only used to size rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Length of the segment drawn for a ray that hits nothing
    pub fn exit_length(&self) -> f64 {
        self.width.max(self.height) * EXIT_LENGTH_FACTOR
    }
}

/// Immutable-per-trace snapshot of placed elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Element>", into = "Vec<Element>")]
pub struct Scene {
    elements: Vec<Element>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene, rejecting duplicate ids and non-finite numbers
    pub fn from_elements(elements: Vec<Element>) -> Result<Self, SceneError> {
        let mut scene = Self::new();
        for element in elements {
            scene.insert(element)?;
        }
        Ok(scene)
    }

    /// Append an element
    pub fn insert(&mut self, element: Element) -> Result<(), SceneError> {
        check_finite(&element)?;
        if self.get(element.id).is_some() {
            return Err(SceneError::DuplicateId(element.id));
        }
        self.elements.push(element);
        Ok(())
    }

    /// Remove an element, returning it
    pub fn remove(&mut self, id: ElementId) -> Result<Element, SceneError> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(SceneError::NotFound(id))?;
        Ok(self.elements.remove(index))
    }

    /// Move an element to a new reference point
    pub fn move_to(&mut self, id: ElementId, position: DVec2) -> Result<(), SceneError> {
        let element = self.get_mut(id).ok_or(SceneError::NotFound(id))?;
        if !position.is_finite() {
            return Err(SceneError::NonFinite {
                id,
                kind: element.kind.name(),
            });
        }
        element.position = position;
        Ok(())
    }

    /// Replace an element's properties (kind is fixed for its lifetime)
    pub fn set_kind(&mut self, id: ElementId, kind: ElementKind) -> Result<(), SceneError> {
        let element = self.get_mut(id).ok_or(SceneError::NotFound(id))?;
        if std::mem::discriminant(&element.kind) != std::mem::discriminant(&kind) {
            return Err(SceneError::KindChanged {
                id,
                from: element.kind.name(),
                to: kind.name(),
            });
        }
        check_finite(&Element { kind, ..element.clone() })?;
        element.kind = kind;
        Ok(())
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn sources(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_source())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

impl TryFrom<Vec<Element>> for Scene {
    type Error = SceneError;

    fn try_from(elements: Vec<Element>) -> Result<Self, Self::Error> {
        Self::from_elements(elements)
    }
}

impl From<Scene> for Vec<Element> {
    fn from(scene: Scene) -> Self {
        scene.elements
    }
}

fn check_finite(element: &Element) -> Result<(), SceneError> {
    let finite =
        element.position.is_finite() && element.kind.values().iter().all(|v| v.is_finite());
    if finite {
        Ok(())
    } else {
        Err(SceneError::NonFinite {
            id: element.id,
            kind: element.kind.name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(id: u64) -> Element {
        Element::new(
            id,
            DVec2::new(10.0, 10.0),
            ElementKind::Detector {
                sensitivity: 1.0,
                size: 40.0,
            },
        )
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Scene::from_elements(vec![detector(1), detector(1)]);
        assert_eq!(result, Err(SceneError::DuplicateId(ElementId(1))));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut bad = detector(2);
        bad.position.x = f64::NAN;
        assert!(matches!(
            Scene::from_elements(vec![bad]),
            Err(SceneError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_insert_remove_move() {
        let mut scene = Scene::from_elements(vec![detector(1), detector(2)]).unwrap();
        scene.move_to(ElementId(2), DVec2::new(50.0, 60.0)).unwrap();
        assert_eq!(scene.get(ElementId(2)).unwrap().position, DVec2::new(50.0, 60.0));

        let removed = scene.remove(ElementId(1)).unwrap();
        assert_eq!(removed.id, ElementId(1));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.remove(ElementId(1)), Err(SceneError::NotFound(ElementId(1))));
    }

    #[test]
    fn test_set_kind_keeps_kind_fixed() {
        let mut scene = Scene::from_elements(vec![detector(1)]).unwrap();
        scene
            .set_kind(
                ElementId(1),
                ElementKind::Detector {
                    sensitivity: 0.5,
                    size: 20.0,
                },
            )
            .unwrap();
        let err = scene.set_kind(
            ElementId(1),
            ElementKind::BeamSplitter {
                angle: 0.0,
                reflectivity: 0.5,
            },
        );
        assert!(matches!(err, Err(SceneError::KindChanged { .. })));
    }

    #[test]
    fn test_exit_length_uses_larger_side() {
        assert_eq!(Viewport::new(1000.0, 700.0).exit_length(), 3000.0);
        assert_eq!(Viewport::new(300.0, 800.0).exit_length(), 2400.0);
    }

    #[test]
    fn test_serde_rejects_duplicates() {
        let json = serde_json::to_string(&vec![detector(7), detector(7)]).unwrap();
        assert!(serde_json::from_str::<Scene>(&json).is_err());
    }
}
