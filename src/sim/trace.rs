//! Recursive ray propagation
//!
//! One trace pass emits a ray from every source and follows it depth-first
//! through the scene. Each step finds the nearest surface, records a drawn
//! segment, then applies the hit element's rule:
//! - detector: absorb and record a reading
//! - mirror: reflect about the facing normal
//! - beam splitter: split into reflected and transmitted branches
//! - lens: thin-lens angular deflection
//!
//! Branches stop silently past the depth bound or below the intensity floor.
//! Detector readings are folded from the absorption events after the pass,
//! so the whole pass is a pure function of its inputs.

use std::collections::{BTreeMap, HashMap};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::element::{Element, ElementId, ElementKind, Surface, ports};
use super::geometry::{facing_normal, intersect_circle, intersect_segment, reflect};
use super::scene::{Scene, Viewport};
use crate::color::{Color, wavelength_to_color};
use crate::consts::{MAX_DEPTH, MIN_INTENSITY, SURFACE_OFFSET};
use crate::{direction_from_angle, normalize_or_tiny};

/// Active output connections keyed `"{element id}-{port}"`
pub type ConnectionMap = HashMap<String, bool>;

/// Optional suppression of mirror and beam splitter outputs
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gating {
    /// Every branch propagates
    #[default]
    Disabled,
    /// A branch propagates only if its port is marked active
    Enabled(ConnectionMap),
}

impl Gating {
    pub fn port_key(id: ElementId, port: &str) -> String {
        format!("{id}-{port}")
    }

    /// Whether output `port` of element `id` may emit
    pub fn allows(&self, id: ElementId, port: &str) -> bool {
        match self {
            Gating::Disabled => true,
            Gating::Enabled(connections) => connections
                .get(&Self::port_key(id, port))
                .copied()
                .unwrap_or(false),
        }
    }
}

/// Termination bounds for a trace pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceLimits {
    pub max_depth: u32,
    pub min_intensity: f64,
}

impl Default for TraceLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            min_intensity: MIN_INTENSITY,
        }
    }
}

/// A drawn piece of a ray; intensity is the value when leaving `start`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
    pub intensity: f64,
}

/// All segments produced by one source, branches interleaved in visit order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub source_id: ElementId,
    pub segments: Vec<Segment>,
    pub color: Color,
    pub wavelength: f64,
    /// Intensity at emission
    pub intensity: f64,
}

/// Strongest reading at a detector during one pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorHit {
    /// Incoming intensity scaled by the detector's sensitivity
    pub intensity: f64,
    pub wavelength: f64,
    pub color: Color,
    pub point: DVec2,
}

/// A branch terminating on a detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorption {
    pub detector_id: ElementId,
    pub hit: DetectorHit,
}

/// Output of one trace pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    pub rays: Vec<Ray>,
    pub detector_hits: BTreeMap<ElementId, DetectorHit>,
}

impl TraceResult {
    pub fn total_segments(&self) -> usize {
        self.rays.iter().map(|r| r.segments.len()).sum()
    }
}

/// Trace every source in `scene` with the default limits
pub fn trace(scene: &Scene, viewport: Viewport, gating: &Gating) -> TraceResult {
    trace_with_limits(scene, viewport, gating, &TraceLimits::default())
}

/// Trace every source in `scene`
pub fn trace_with_limits(
    scene: &Scene,
    viewport: Viewport,
    gating: &Gating,
    limits: &TraceLimits,
) -> TraceResult {
    let mut rays = Vec::new();
    let mut absorptions = Vec::new();

    for source in scene.sources() {
        let ElementKind::Source {
            angle,
            wavelength,
            intensity,
        } = source.kind
        else {
            continue;
        };

        let mut walker = Walker {
            scene,
            source_id: source.id,
            exit_length: viewport.exit_length(),
            gating,
            limits,
            wavelength,
            color: wavelength_to_color(wavelength),
            segments: Vec::new(),
            absorptions: &mut absorptions,
        };
        walker.step(source.position, direction_from_angle(angle), intensity, 0);

        let Walker { segments, color, .. } = walker;
        if !segments.is_empty() {
            rays.push(Ray {
                source_id: source.id,
                segments,
                color,
                wavelength,
                intensity,
            });
        }
    }

    let detector_hits = merge_detector_hits(absorptions);

    log::debug!(
        "Trace pass: {} elements, {} rays, {} segments, {} detectors lit",
        scene.len(),
        rays.len(),
        rays.iter().map(|r| r.segments.len()).sum::<usize>(),
        detector_hits.len()
    );

    TraceResult {
        rays,
        detector_hits,
    }
}

/// Keep the strongest absorption per detector; earlier events win ties.
pub fn merge_detector_hits(
    events: impl IntoIterator<Item = Absorption>,
) -> BTreeMap<ElementId, DetectorHit> {
    events.into_iter().fold(BTreeMap::new(), |mut hits, event| {
        let replace = hits
            .get(&event.detector_id)
            .is_none_or(|current: &DetectorHit| event.hit.intensity > current.intensity);
        if replace {
            hits.insert(event.detector_id, event.hit);
        }
        hits
    })
}

/// Nearest surface along a ray
struct Hit<'a> {
    element: &'a Element,
    point: DVec2,
}

/// Per-source traversal state shared by all branches of one ray
struct Walker<'a> {
    scene: &'a Scene,
    source_id: ElementId,
    exit_length: f64,
    gating: &'a Gating,
    limits: &'a TraceLimits,
    wavelength: f64,
    color: Color,
    segments: Vec<Segment>,
    absorptions: &'a mut Vec<Absorption>,
}

impl<'a> Walker<'a> {
    fn step(&mut self, origin: DVec2, dir: DVec2, intensity: f64, depth: u32) {
        if depth > self.limits.max_depth {
            log::trace!("Ray from {} stopped at depth {}", self.source_id, depth);
            return;
        }
        if !(intensity >= self.limits.min_intensity) {
            log::trace!("Ray from {} faded to {:.4}", self.source_id, intensity);
            return;
        }
        debug_assert!(dir.is_finite(), "non-finite ray direction {dir:?}");

        let hit = self.nearest_hit(origin, dir);
        let end = hit
            .as_ref()
            .map_or(origin + dir * self.exit_length, |h| h.point);
        self.segments.push(Segment {
            start: origin,
            end,
            intensity,
        });

        let Some(Hit { element, point }) = hit else {
            return;
        };

        match element.kind {
            ElementKind::Detector { sensitivity, .. } => {
                self.absorptions.push(Absorption {
                    detector_id: element.id,
                    hit: DetectorHit {
                        intensity: intensity * sensitivity,
                        wavelength: self.wavelength,
                        color: self.color,
                        point,
                    },
                });
            }
            ElementKind::Mirror {
                angle,
                reflectivity,
                ..
            } => {
                if !self.gating.allows(element.id, ports::MIRROR_OUTPUT) {
                    return;
                }
                let normal = facing_normal(direction_from_angle(angle), dir);
                let out = normalize_or_tiny(reflect(dir, normal));
                self.continue_from(point, out, intensity * reflectivity, depth);
            }
            ElementKind::BeamSplitter { reflectivity, .. } => {
                let Some((a, b)) = element.splitter_diagonal() else {
                    return;
                };
                let normal = facing_normal(normalize_or_tiny(b - a), dir);

                if self.gating.allows(element.id, ports::SPLITTER_REFLECTED) {
                    let out = normalize_or_tiny(reflect(dir, normal));
                    self.continue_from(point, out, intensity * reflectivity, depth);
                }
                if self.gating.allows(element.id, ports::SPLITTER_TRANSMITTED) {
                    self.continue_from(point, dir, intensity * (1.0 - reflectivity), depth);
                }
            }
            ElementKind::Lens {
                focal_length,
                transparency,
                ..
            } => {
                let Some(axis) = element.lens_axis() else {
                    return;
                };
                let offset = (point - element.position).dot(axis);
                // Zero focal length would be an infinitely strong lens; pass straight through.
                let bend = if focal_length != 0.0 {
                    -offset / focal_length
                } else {
                    0.0
                };
                let out = normalize_or_tiny(dir + axis * bend);
                self.continue_from(point, out, intensity * transparency, depth);
            }
            ElementKind::Source { .. } => {}
        }
    }

    /// Restart just past the surface so the next search skips it
    fn continue_from(&mut self, point: DVec2, dir: DVec2, intensity: f64, depth: u32) {
        self.step(point + dir * SURFACE_OFFSET, dir, intensity, depth + 1);
    }

    /// Closest surface within the exit length; ties keep the earlier element
    fn nearest_hit(&self, origin: DVec2, dir: DVec2) -> Option<Hit<'a>> {
        let mut best: Option<Hit<'a>> = None;
        let mut best_distance = self.exit_length;

        for element in self.scene.elements() {
            if element.id == self.source_id {
                continue;
            }
            let found = match element.surface() {
                None => None,
                Some(Surface::Segment { a, b }) => {
                    intersect_segment(origin, dir, a, b).map(|h| (h.distance, h.point))
                }
                Some(Surface::Circle { center, radius }) => {
                    intersect_circle(origin, dir, center, radius).map(|h| (h.distance, h.point))
                }
            };
            if let Some((distance, point)) = found {
                if distance < best_distance {
                    best_distance = distance;
                    best = Some(Hit { element, point });
                }
            }
        }

        best
    }
}
