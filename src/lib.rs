//! Optics Sim - 2D geometric (ray) optics
//!
//! Core modules:
//! - `sim`: Pure tracing engine (geometry kernel, elements, propagation)
//! - `color`: Wavelength to display color
//! - `catalog`: Component library with default properties
//! - `scene_file`: Versioned JSON scene import/export
//! - `settings`: Engine limits and viewport configuration
//! - `platform`: Browser entry points (wasm32 only)

pub mod catalog;
pub mod color;
pub mod platform;
pub mod scene_file;
pub mod settings;
pub mod sim;

pub use catalog::ComponentType;
pub use color::{Color, wavelength_to_color};
pub use scene_file::{ImportError, SceneDocument};
pub use settings::{Settings, SettingsError};

use glam::DVec2;

/// Engine configuration constants
pub mod consts {
    /// Recursion stops once a branch is deeper than this
    pub const MAX_DEPTH: u32 = 50;
    /// Branches dimmer than this are dropped
    pub const MIN_INTENSITY: f64 = 0.01;

    /// Minimum forward distance for a hit (avoids re-hitting the surface just left)
    pub const MIN_HIT_DISTANCE: f64 = 0.1;
    /// Ray/segment determinant below this counts as parallel
    pub const PARALLEL_EPSILON: f64 = 1e-6;
    /// Outgoing rays restart this far past the hit point
    pub const SURFACE_OFFSET: f64 = 1.0;

    /// Unobstructed rays are drawn to this multiple of the larger viewport side
    pub const EXIT_LENGTH_FACTOR: f64 = 3.0;

    /// Beam splitter footprint (square side, px)
    pub const BEAM_SPLITTER_SIZE: f64 = 50.0;

    /// Default viewport (matches the editor's initial canvas)
    pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1000.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 700.0;
}

/// Degrees to radians
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// Unit direction for an angle in degrees (0° = +x, 90° = +y in screen space)
#[inline]
pub fn direction_from_angle(deg: f64) -> DVec2 {
    let rad = deg_to_rad(deg);
    DVec2::new(rad.cos(), rad.sin())
}

/// Counter-clockwise perpendicular
#[inline]
pub fn perp(v: DVec2) -> DVec2 {
    DVec2::new(-v.y, v.x)
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: DVec2, angle: f64) -> DVec2 {
    DVec2::from_angle(angle).rotate(v)
}

/// Normalize, treating a zero vector as having a tiny length instead of producing NaN
#[inline]
pub fn normalize_or_tiny(v: DVec2) -> DVec2 {
    let len = v.length();
    let len = if len == 0.0 { 1e-9 } else { len };
    v / len
}
