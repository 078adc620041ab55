//! Tracing engine
//!
//! Everything in here is pure and deterministic:
//! - No state survives between trace passes
//! - Stable iteration order (scene list order, detector ids)
//! - No rendering or platform dependencies

pub mod element;
pub mod geometry;
pub mod scene;
pub mod trace;

pub use element::{Element, ElementId, ElementKind, Surface, ports};
pub use geometry::{CircleHit, SegmentHit, intersect_circle, intersect_segment, reflect};
pub use scene::{Scene, SceneError, Viewport};
pub use trace::{
    Absorption, ConnectionMap, DetectorHit, Gating, Ray, Segment, TraceLimits, TraceResult,
    merge_detector_hits, trace, trace_with_limits,
};
