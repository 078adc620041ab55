//! Ray intersection primitives
//!
//! Pure geometry with no optics semantics: an infinite forward ray against a
//! finite segment or a circle. Degenerate input (zero-length segment, zero
//! radius, parallel ray) yields `None` rather than an error.

use glam::DVec2;

use crate::consts::{MIN_HIT_DISTANCE, PARALLEL_EPSILON};
use crate::{normalize_or_tiny, perp};

/// Ray/segment intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Ray parameter of the hit, in units of the ray direction
    pub distance: f64,
    /// Hit point
    pub point: DVec2,
    /// Normalized position along the segment (0 at A, 1 at B)
    pub u: f64,
}

/// Ray/circle intersection (entry point only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleHit {
    pub distance: f64,
    pub point: DVec2,
}

/// Intersect a ray with the finite segment `a`-`b`.
///
/// Returns `None` when the ray is parallel to the segment, when the hit is
/// closer than [`MIN_HIT_DISTANCE`] (or behind the origin), or when it lands
/// outside the segment.
pub fn intersect_segment(origin: DVec2, dir: DVec2, a: DVec2, b: DVec2) -> Option<SegmentHit> {
    let seg = b - a;
    let seg_len = seg.length();
    let seg_dir = normalize_or_tiny(seg);

    let to_origin = origin - a;
    let ray_perp = perp(dir);

    let denom = seg_dir.dot(ray_perp);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    // origin + dir * t == a + seg_dir * along
    let along = to_origin.dot(ray_perp) / denom;
    let seg_perp = perp(seg_dir);
    let t = -to_origin.dot(seg_perp) / dir.dot(seg_perp);

    if t >= MIN_HIT_DISTANCE && along >= 0.0 && along <= seg_len {
        Some(SegmentHit {
            distance: t,
            point: origin + dir * t,
            u: along / seg_len,
        })
    } else {
        None
    }
}

/// Intersect a ray with a circle, returning the nearest forward entry point.
///
/// Origins inside the circle produce no hit (the entry point lies behind them).
pub fn intersect_circle(
    origin: DVec2,
    dir: DVec2,
    center: DVec2,
    radius: f64,
) -> Option<CircleHit> {
    let to_center = center - origin;
    let proj = to_center.dot(dir);
    if proj < 0.0 {
        return None;
    }

    let closest = origin + dir * proj;
    let dist_to_center = (center - closest).length();
    if dist_to_center > radius {
        return None;
    }

    let half_chord = (radius * radius - dist_to_center * dist_to_center).sqrt();
    let distance = proj - half_chord;
    if !(distance >= MIN_HIT_DISTANCE) {
        return None;
    }

    Some(CircleHit {
        distance,
        point: origin + dir * distance,
    })
}

/// Reflect a direction about a unit normal: d' = d - 2(d·n)n
#[inline]
pub fn reflect(dir: DVec2, normal: DVec2) -> DVec2 {
    dir - 2.0 * dir.dot(normal) * normal
}

/// Unit normal of a surface running along `surface_dir`, flipped to oppose `incoming`
pub fn facing_normal(surface_dir: DVec2, incoming: DVec2) -> DVec2 {
    let normal = normalize_or_tiny(perp(surface_dir));
    if normal.dot(incoming) > 0.0 { -normal } else { normal }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_hit_head_on() {
        let hit = intersect_segment(
            DVec2::ZERO,
            DVec2::X,
            DVec2::new(10.0, -5.0),
            DVec2::new(10.0, 5.0),
        )
        .expect("should hit");
        assert!((hit.distance - 10.0).abs() < 1e-9);
        assert!((hit.point - DVec2::new(10.0, 0.0)).length() < 1e-9);
        assert!((hit.u - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_segment_u_runs_from_a_to_b() {
        let hit = intersect_segment(
            DVec2::new(0.0, 4.0),
            DVec2::X,
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
        )
        .expect("should hit");
        assert!((hit.u - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_segment_parallel_misses() {
        let hit = intersect_segment(
            DVec2::ZERO,
            DVec2::X,
            DVec2::new(5.0, 0.0),
            DVec2::new(15.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_segment_behind_origin_misses() {
        let hit = intersect_segment(
            DVec2::ZERO,
            DVec2::X,
            DVec2::new(-10.0, -5.0),
            DVec2::new(-10.0, 5.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_segment_too_close_misses() {
        // Surface the ray is sitting on
        let hit = intersect_segment(
            DVec2::new(10.0 - 0.05, 0.0),
            DVec2::X,
            DVec2::new(10.0, -5.0),
            DVec2::new(10.0, 5.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_segment_outside_extent_misses() {
        let hit = intersect_segment(
            DVec2::new(0.0, 20.0),
            DVec2::X,
            DVec2::new(10.0, -5.0),
            DVec2::new(10.0, 5.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_segment_zero_length_misses() {
        let p = DVec2::new(10.0, 0.0);
        assert!(intersect_segment(DVec2::ZERO, DVec2::X, p, p).is_none());
    }

    #[test]
    fn test_segment_distance_in_direction_units() {
        let hit = intersect_segment(
            DVec2::ZERO,
            DVec2::new(2.0, 0.0),
            DVec2::new(10.0, -5.0),
            DVec2::new(10.0, 5.0),
        )
        .expect("should hit");
        assert!((hit.distance - 5.0).abs() < 1e-9);
        assert!((hit.point.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_entry_point() {
        let hit = intersect_circle(DVec2::ZERO, DVec2::X, DVec2::new(100.0, 0.0), 20.0)
            .expect("should hit");
        assert!((hit.distance - 80.0).abs() < 1e-9);
        assert!((hit.point - DVec2::new(80.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_circle_miss_sideways() {
        let hit = intersect_circle(DVec2::ZERO, DVec2::X, DVec2::new(100.0, 30.0), 20.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_circle_behind_misses() {
        let hit = intersect_circle(DVec2::ZERO, DVec2::X, DVec2::new(-100.0, 0.0), 20.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_circle_origin_inside_misses() {
        let hit = intersect_circle(DVec2::new(95.0, 0.0), DVec2::X, DVec2::new(100.0, 0.0), 20.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_circle_zero_radius_is_safe() {
        // Off-axis: no hit. On-axis: touches the center point, no panic.
        assert!(intersect_circle(DVec2::ZERO, DVec2::X, DVec2::new(50.0, 1.0), 0.0).is_none());
        let hit = intersect_circle(DVec2::ZERO, DVec2::X, DVec2::new(50.0, 0.0), 0.0);
        assert!(hit.map_or(true, |h| h.distance.is_finite()));
    }

    #[test]
    fn test_reflect() {
        // Moving right, hits vertical wall (normal pointing left)
        let r = reflect(DVec2::new(1.0, 0.0), DVec2::new(-1.0, 0.0));
        assert!((r.x + 1.0).abs() < 1e-12);
        assert!(r.y.abs() < 1e-12);
    }

    #[test]
    fn test_facing_normal_opposes_incoming() {
        let n = facing_normal(DVec2::Y, DVec2::X);
        assert!(n.dot(DVec2::X) < 0.0);
        let n = facing_normal(DVec2::Y, -DVec2::X);
        assert!(n.dot(-DVec2::X) < 0.0);
    }
}
