//! Optical elements and their interaction surfaces
//!
//! Each element kind carries its own properties and knows which shape the
//! tracer tests against:
//! - mirror: segment of `length` centered on the position, along `angle`
//! - beam splitter: one diagonal of a rotated square footprint
//! - lens: chord of `diameter` perpendicular to `angle`
//! - detector: circle of radius `size / 2`
//!
//! Sources have no surface; rays neither stop at nor reflect off them.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::BEAM_SPLITTER_SIZE;
use crate::{deg_to_rad, direction_from_angle, rotate};

/// Output port names used as gating keys (`"{id}-{port}"`)
pub mod ports {
    /// Mirror reflection
    pub const MIRROR_OUTPUT: &str = "output";
    /// Beam splitter reflected branch
    pub const SPLITTER_REFLECTED: &str = "output_top";
    /// Beam splitter transmitted branch
    pub const SPLITTER_TRANSMITTED: &str = "output_right";
}

/// Stable element identifier, unique within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element kind together with its kind-specific properties.
///
/// Angles are in degrees, lengths in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Source {
        angle: f64,
        /// Nanometers (visible range 380-750)
        wavelength: f64,
        /// Nominally 0..1, not clamped
        intensity: f64,
    },
    Mirror {
        angle: f64,
        reflectivity: f64,
        length: f64,
    },
    BeamSplitter {
        angle: f64,
        reflectivity: f64,
    },
    Lens {
        /// Positive converges, negative diverges
        focal_length: f64,
        transparency: f64,
        angle: f64,
        diameter: f64,
    },
    Detector {
        sensitivity: f64,
        size: f64,
    },
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Source { .. } => "source",
            ElementKind::Mirror { .. } => "mirror",
            ElementKind::BeamSplitter { .. } => "beam_splitter",
            ElementKind::Lens { .. } => "lens",
            ElementKind::Detector { .. } => "detector",
        }
    }

    /// All numeric properties, for validation
    pub fn values(&self) -> Vec<f64> {
        match *self {
            ElementKind::Source {
                angle,
                wavelength,
                intensity,
            } => vec![angle, wavelength, intensity],
            ElementKind::Mirror {
                angle,
                reflectivity,
                length,
            } => vec![angle, reflectivity, length],
            ElementKind::BeamSplitter {
                angle,
                reflectivity,
            } => vec![angle, reflectivity],
            ElementKind::Lens {
                focal_length,
                transparency,
                angle,
                diameter,
            } => vec![focal_length, transparency, angle, diameter],
            ElementKind::Detector { sensitivity, size } => vec![sensitivity, size],
        }
    }
}

/// A placed optical component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub position: DVec2,
    pub kind: ElementKind,
}

/// Surface a ray can hit, resolved from an element's placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    /// Flat segment from `a` to `b`
    Segment { a: DVec2, b: DVec2 },
    Circle { center: DVec2, radius: f64 },
}

impl Element {
    pub fn new(id: u64, position: DVec2, kind: ElementKind) -> Self {
        Self {
            id: ElementId(id),
            position,
            kind,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self.kind, ElementKind::Source { .. })
    }

    /// The shape tested by the tracer, or `None` for sources
    pub fn surface(&self) -> Option<Surface> {
        match self.kind {
            ElementKind::Source { .. } => None,
            ElementKind::Mirror { .. } => {
                let (a, b) = self.mirror_segment()?;
                Some(Surface::Segment { a, b })
            }
            ElementKind::BeamSplitter { .. } => {
                let (a, b) = self.splitter_diagonal()?;
                Some(Surface::Segment { a, b })
            }
            ElementKind::Lens { .. } => {
                let (a, b) = self.lens_chord()?;
                Some(Surface::Segment { a, b })
            }
            ElementKind::Detector { size, .. } => Some(Surface::Circle {
                center: self.position,
                radius: size / 2.0,
            }),
        }
    }

    /// Mirror endpoints, centered on the position and running along `angle`
    pub fn mirror_segment(&self) -> Option<(DVec2, DVec2)> {
        let ElementKind::Mirror { angle, length, .. } = self.kind else {
            return None;
        };
        let half = direction_from_angle(angle) * (length / 2.0);
        Some((self.position - half, self.position + half))
    }

    /// Footprint corners of a beam splitter in the order
    /// (-,-), (+,-), (+,+), (-,+) before rotation
    pub fn splitter_corners(&self) -> Option<[DVec2; 4]> {
        let ElementKind::BeamSplitter { angle, .. } = self.kind else {
            return None;
        };
        let h = BEAM_SPLITTER_SIZE / 2.0;
        let rad = deg_to_rad(angle);
        Some(
            [
                DVec2::new(-h, -h),
                DVec2::new(h, -h),
                DVec2::new(h, h),
                DVec2::new(-h, h),
            ]
            .map(|corner| self.position + rotate(corner, rad)),
        )
    }

    /// The splitter's only optical surface: corner 1 to corner 3
    pub fn splitter_diagonal(&self) -> Option<(DVec2, DVec2)> {
        let corners = self.splitter_corners()?;
        Some((corners[1], corners[3]))
    }

    /// Unit axis lying in the lens plane (the chord direction)
    pub fn lens_axis(&self) -> Option<DVec2> {
        let ElementKind::Lens { angle, .. } = self.kind else {
            return None;
        };
        Some(rotate(DVec2::Y, deg_to_rad(angle)))
    }

    /// Lens chord endpoints
    pub fn lens_chord(&self) -> Option<(DVec2, DVec2)> {
        let ElementKind::Lens { diameter, .. } = self.kind else {
            return None;
        };
        let half = self.lens_axis()? * (diameter / 2.0);
        Some((self.position - half, self.position + half))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_mirror_segment_centered() {
        let mirror = Element::new(
            1,
            DVec2::new(100.0, 100.0),
            ElementKind::Mirror {
                angle: 90.0,
                reflectivity: 1.0,
                length: 40.0,
            },
        );
        let (a, b) = mirror.mirror_segment().unwrap();
        assert!(close(a, DVec2::new(100.0, 80.0)));
        assert!(close(b, DVec2::new(100.0, 120.0)));
    }

    #[test]
    fn test_splitter_diagonal_unrotated() {
        let splitter = Element::new(
            2,
            DVec2::ZERO,
            ElementKind::BeamSplitter {
                angle: 0.0,
                reflectivity: 0.5,
            },
        );
        let (a, b) = splitter.splitter_diagonal().unwrap();
        assert!(close(a, DVec2::new(25.0, -25.0)));
        assert!(close(b, DVec2::new(-25.0, 25.0)));
    }

    #[test]
    fn test_splitter_corners_rotate_with_angle() {
        let splitter = Element::new(
            2,
            DVec2::new(10.0, 10.0),
            ElementKind::BeamSplitter {
                angle: 90.0,
                reflectivity: 0.5,
            },
        );
        let corners = splitter.splitter_corners().unwrap();
        // (25, -25) rotated a quarter turn is (25, 25)
        assert!(close(corners[1], DVec2::new(35.0, 35.0)));
    }

    #[test]
    fn test_lens_chord_perpendicular_to_angle() {
        let lens = Element::new(
            3,
            DVec2::ZERO,
            ElementKind::Lens {
                focal_length: 100.0,
                transparency: 1.0,
                angle: 0.0,
                diameter: 80.0,
            },
        );
        let (a, b) = lens.lens_chord().unwrap();
        assert!(close(a, DVec2::new(0.0, -40.0)));
        assert!(close(b, DVec2::new(0.0, 40.0)));
    }

    #[test]
    fn test_detector_surface_is_circle() {
        let det = Element::new(
            4,
            DVec2::new(5.0, 5.0),
            ElementKind::Detector {
                sensitivity: 1.0,
                size: 40.0,
            },
        );
        assert_eq!(
            det.surface(),
            Some(Surface::Circle {
                center: DVec2::new(5.0, 5.0),
                radius: 20.0
            })
        );
    }

    #[test]
    fn test_source_has_no_surface() {
        let src = Element::new(
            5,
            DVec2::ZERO,
            ElementKind::Source {
                angle: 0.0,
                wavelength: 650.0,
                intensity: 1.0,
            },
        );
        assert!(src.surface().is_none());
        assert!(src.mirror_segment().is_none());
    }
}
