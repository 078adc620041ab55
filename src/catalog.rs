//! Component library
//!
//! The editor's palette: each entry maps to an element kind with default
//! properties. Two lens entries share the `lens` kind and differ only in the
//! sign of their default focal length.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Element, ElementKind, ports};

/// Palette entry, named as in the scene file `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Laser,
    Mirror,
    BeamSplitter,
    ConvexLens,
    ConcaveLens,
    Detector,
}

impl ComponentType {
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Laser,
        ComponentType::Mirror,
        ComponentType::BeamSplitter,
        ComponentType::ConvexLens,
        ComponentType::ConcaveLens,
        ComponentType::Detector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Laser => "laser",
            ComponentType::Mirror => "mirror",
            ComponentType::BeamSplitter => "beam_splitter",
            ComponentType::ConvexLens => "convex_lens",
            ComponentType::ConcaveLens => "concave_lens",
            ComponentType::Detector => "detector",
        }
    }

    /// Human-readable palette label
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentType::Laser => "Laser Source",
            ComponentType::Mirror => "Plane Mirror",
            ComponentType::BeamSplitter => "Beam Splitter",
            ComponentType::ConvexLens => "Convex Lens",
            ComponentType::ConcaveLens => "Concave Lens",
            ComponentType::Detector => "Light Detector",
        }
    }

    /// Default properties for a fresh element
    pub fn default_kind(&self) -> ElementKind {
        match self {
            ComponentType::Laser => ElementKind::Source {
                angle: 0.0,
                wavelength: 650.0,
                intensity: 1.0,
            },
            ComponentType::Mirror => ElementKind::Mirror {
                angle: 45.0,
                reflectivity: 0.95,
                length: 100.0,
            },
            ComponentType::BeamSplitter => ElementKind::BeamSplitter {
                angle: 0.0,
                reflectivity: 0.5,
            },
            ComponentType::ConvexLens => ElementKind::Lens {
                focal_length: 200.0,
                transparency: 0.95,
                angle: 0.0,
                diameter: 80.0,
            },
            ComponentType::ConcaveLens => ElementKind::Lens {
                focal_length: -200.0,
                transparency: 0.95,
                angle: 0.0,
                diameter: 80.0,
            },
            ComponentType::Detector => ElementKind::Detector {
                sensitivity: 1.0,
                size: 40.0,
            },
        }
    }

    /// Connection ports (only sources, mirrors and splitters have any)
    pub fn ports(&self) -> &'static [&'static str] {
        match self {
            ComponentType::Laser => &["output"],
            ComponentType::Mirror => &["input", ports::MIRROR_OUTPUT],
            ComponentType::BeamSplitter => &[
                "input_left",
                "input_bottom",
                ports::SPLITTER_TRANSMITTED,
                ports::SPLITTER_REFLECTED,
            ],
            _ => &[],
        }
    }

    /// Accepts palette names plus bare kind names (`source`, `lens`)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "laser" | "source" => Some(ComponentType::Laser),
            "mirror" => Some(ComponentType::Mirror),
            "beam_splitter" => Some(ComponentType::BeamSplitter),
            "convex_lens" | "lens" => Some(ComponentType::ConvexLens),
            "concave_lens" => Some(ComponentType::ConcaveLens),
            "detector" => Some(ComponentType::Detector),
            _ => None,
        }
    }

    /// Palette entry an element would be exported as
    pub fn of(kind: &ElementKind) -> Self {
        match *kind {
            ElementKind::Source { .. } => ComponentType::Laser,
            ElementKind::Mirror { .. } => ComponentType::Mirror,
            ElementKind::BeamSplitter { .. } => ComponentType::BeamSplitter,
            ElementKind::Lens { focal_length, .. } if focal_length < 0.0 => {
                ComponentType::ConcaveLens
            }
            ElementKind::Lens { .. } => ComponentType::ConvexLens,
            ElementKind::Detector { .. } => ComponentType::Detector,
        }
    }

    /// Place a new element with default properties
    pub fn instantiate(&self, id: u64, position: DVec2) -> Element {
        Element::new(id, position, self.default_kind())
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
