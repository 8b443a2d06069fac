//! Pure polygon geometry used by the measurement engine.
//!
//! All functions are total over any finite point sequence: degenerate input (empty, one or
//! two points) yields zero area, an empty or degenerate bounding box, and no containment.
//! Polygons are implicitly closed (the last vertex connects back to the first) and may be
//! wound in either direction.

use bevy::math::Vec2;

/// Axis-aligned extents of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
}

/// Area of a polygon via the shoelace formula. Always non-negative.
pub fn polygon_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    signed_area(points).abs()
}

/// Signed shoelace area: positive for counter-clockwise winding, negative for clockwise.
///
/// Vertices are taken relative to the first one and summed in f64, so polygons far from the
/// origin (large orthophoto coordinates) keep their precision.
fn signed_area(points: &[Vec2]) -> f32 {
    signed_area_f64(points) as f32
}

fn relative(points: &[Vec2]) -> impl Iterator<Item = (f64, f64)> + '_ {
    let origin = points.first().copied().unwrap_or(Vec2::ZERO);
    points
        .iter()
        .map(move |p| ((p.x - origin.x) as f64, (p.y - origin.y) as f64))
}

fn signed_area_f64(points: &[Vec2]) -> f64 {
    let rel: Vec<(f64, f64)> = relative(points).collect();
    let n = rel.len();
    let mut sum = 0.0;
    for i in 0..n {
        let (ax, ay) = rel[i];
        let (bx, by) = rel[(i + 1) % n];
        sum += ax * by - bx * ay;
    }
    sum / 2.0
}

/// Even-odd point-in-polygon test (ray cast along +x through `point.y`).
///
/// Self-intersecting polygons are tested as-is. Points lying exactly on an edge may land
/// on either side.
pub fn point_in_polygon(point: Vec2, points: &[Vec2]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Min and max corners of a point set, `None` when empty.
pub fn bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
    )
}

/// Width and height of the axis-aligned box around `points`.
pub fn bounding_box(points: &[Vec2]) -> BoundingBox {
    match bounds(points) {
        Some((min, max)) => BoundingBox {
            width: max.x - min.x,
            height: max.y - min.y,
        },
        None => BoundingBox::default(),
    }
}

/// Area-weighted centroid of a polygon.
///
/// Falls back to the vertex average when the polygon has (near) zero area, so labels
/// still have an anchor for degenerate shapes.
pub fn centroid(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }

    let average = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    if points.len() < 3 {
        return Some(average);
    }

    let area = signed_area_f64(points);
    if area.abs() < f32::EPSILON as f64 {
        return Some(average);
    }

    let rel: Vec<(f64, f64)> = relative(points).collect();
    let n = rel.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let (ax, ay) = rel[i];
        let (bx, by) = rel[(i + 1) % n];
        let cross = ax * by - bx * ay;
        cx += (ax + bx) * cross;
        cy += (ay + by) * cross;
    }
    let origin = points[0];
    Some(Vec2::new(
        origin.x + (cx / (6.0 * area)) as f32,
        origin.y + (cy / (6.0 * area)) as f32,
    ))
}

/// Length of the closed ring through `points`.
pub fn perimeter(points: &[Vec2]) -> f32 {
    match points.len() {
        0 | 1 => 0.0,
        2 => points[0].distance(points[1]) * 2.0,
        n => (0..n).map(|i| points[i].distance(points[(i + 1) % n])).sum(),
    }
}

/// Index of the vertex closest to `point` within `radius`, if any.
pub fn nearest_vertex(points: &[Vec2], point: Vec2, radius: f32) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.distance(point)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Upper bound on fill rows per polygon; spacing widens for taller shapes.
pub const MAX_SCANLINE_ROWS: usize = 2048;

/// Horizontal fill spans for a polygon, sampled every `spacing` units.
///
/// Each span is the segment between a pair of sorted edge crossings (even-odd rule), which
/// lets line-based renderers fill arbitrary polygons. At most [`MAX_SCANLINE_ROWS`] rows are
/// produced.
pub fn scanline_spans(points: &[Vec2], spacing: f32) -> Vec<(Vec2, Vec2)> {
    let mut spans = Vec::new();
    if points.len() < 3 || spacing.is_nan() || spacing <= 0.0 {
        return spans;
    }
    let Some((min, max)) = bounds(points) else {
        return spans;
    };
    let height = (max.y - min.y) as f64;
    if !height.is_finite() || height <= 0.0 {
        return spans;
    }

    let spacing = (spacing as f64).max(height / MAX_SCANLINE_ROWS as f64);
    let rows = ((height / spacing).ceil() as usize).min(MAX_SCANLINE_ROWS);

    let rel: Vec<(f64, f64)> = points
        .iter()
        .map(|p| ((p.x - min.x) as f64, (p.y - min.y) as f64))
        .collect();
    let mut crossings: Vec<f64> = Vec::new();
    for row in 0..rows {
        let y = (row as f64 + 0.5) * spacing;
        crossings.clear();
        let mut j = rel.len() - 1;
        for i in 0..rel.len() {
            let ((xi, yi), (xj, yj)) = (rel[i], rel[j]);
            if (yi > y) != (yj > y) {
                crossings.push((xj - xi) * (y - yi) / (yj - yi) + xi);
            }
            j = i;
        }
        crossings.sort_by(f64::total_cmp);
        let world_y = min.y + y as f32;
        for pair in crossings.chunks_exact(2) {
            spans.push((
                Vec2::new(min.x + pair[0] as f32, world_y),
                Vec2::new(min.x + pair[1] as f32, world_y),
            ));
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ]
    }

    #[test]
    fn test_unit_square_area() {
        assert_eq!(polygon_area(&unit_square()), 1.0);
    }

    #[test]
    fn test_area_ignores_winding() {
        let mut reversed = unit_square();
        reversed.reverse();
        assert_eq!(polygon_area(&reversed), 1.0);
        assert_eq!(polygon_area(&reversed), polygon_area(&unit_square()));
    }

    #[test]
    fn test_degenerate_area_is_zero() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[Vec2::ZERO, Vec2::ONE]), 0.0);
    }

    #[test]
    fn test_triangle_area() {
        let triangle = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 3.0)];
        assert_eq!(polygon_area(&triangle), 6.0);
    }

    #[test]
    fn test_point_in_square() {
        let square = unit_square();
        assert!(point_in_polygon(Vec2::new(0.5, 0.5), &square));
        assert!(!point_in_polygon(Vec2::new(2.0, 2.0), &square));
    }

    #[test]
    fn test_point_in_degenerate_polygon() {
        assert!(!point_in_polygon(Vec2::ZERO, &[]));
        assert!(!point_in_polygon(Vec2::new(0.5, 0.5), &[Vec2::ZERO, Vec2::ONE]));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upwards
        let u = [
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(2.0, 3.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(0.0, 3.0),
        ];
        assert!(point_in_polygon(Vec2::new(0.5, 2.0), &u));
        assert!(!point_in_polygon(Vec2::new(1.5, 2.0), &u));
        assert!(point_in_polygon(Vec2::new(1.5, 0.5), &u));
    }

    #[test]
    fn test_bounding_box() {
        let points = [
            Vec2::new(1.0, 2.0),
            Vec2::new(5.0, 2.0),
            Vec2::new(5.0, 9.0),
            Vec2::new(1.0, 9.0),
        ];
        assert_eq!(
            bounding_box(&points),
            BoundingBox {
                width: 4.0,
                height: 7.0
            }
        );
    }

    #[test]
    fn test_bounding_box_degenerate() {
        assert_eq!(bounding_box(&[]), BoundingBox::default());
        assert_eq!(bounding_box(&[Vec2::new(3.0, 4.0)]), BoundingBox::default());
    }

    #[test]
    fn test_centroid_of_rectangle() {
        let rect = [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 50.0),
            Vec2::new(0.0, 50.0),
        ];
        let c = centroid(&rect).unwrap();
        assert!((c - Vec2::new(50.0, 25.0)).length() < 0.001);
    }

    #[test]
    fn test_centroid_of_collinear_points_uses_average() {
        let line = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        assert_eq!(centroid(&line), Some(Vec2::new(1.0, 0.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn test_perimeter() {
        assert_eq!(perimeter(&unit_square()), 4.0);
        assert_eq!(perimeter(&[Vec2::ZERO]), 0.0);
    }

    #[test]
    fn test_nearest_vertex() {
        let square = unit_square();
        assert_eq!(nearest_vertex(&square, Vec2::new(0.9, 1.1), 0.5), Some(2));
        assert_eq!(nearest_vertex(&square, Vec2::new(0.5, 0.5), 0.1), None);
    }

    #[test]
    fn test_scanline_spans_cover_square() {
        let square: Vec<Vec2> = unit_square().iter().map(|p| *p * 10.0).collect();
        let spans = scanline_spans(&square, 1.0);
        assert_eq!(spans.len(), 10);
        for (start, end) in spans {
            assert!((start.x - 0.0).abs() < 0.001);
            assert!((end.x - 10.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_scanline_spans_degenerate() {
        assert!(scanline_spans(&[Vec2::ZERO, Vec2::ONE], 1.0).is_empty());
        assert!(scanline_spans(&unit_square(), 0.0).is_empty());
    }

    #[test]
    fn test_area_keeps_precision_far_from_origin() {
        for offset in [1.0e4_f32, 5.0e4, 1.0e5, 1.0e7] {
            let rect = vec![
                Vec2::new(offset, offset),
                Vec2::new(offset + 100.0, offset),
                Vec2::new(offset + 100.0, offset + 50.0),
                Vec2::new(offset, offset + 50.0),
            ];
            assert_eq!(polygon_area(&rect), 5000.0, "offset {}", offset);
        }
    }

    #[test]
    fn test_centroid_far_from_origin() {
        let offset = 1.0e5_f32;
        let rect = vec![
            Vec2::new(offset, offset),
            Vec2::new(offset + 100.0, offset),
            Vec2::new(offset + 100.0, offset + 50.0),
            Vec2::new(offset, offset + 50.0),
        ];
        let c = centroid(&rect).unwrap();
        assert!((c - Vec2::new(offset + 50.0, offset + 25.0)).length() < 0.1);
    }

    #[test]
    fn test_scanline_spans_terminate_at_large_offset() {
        let triangle = [
            Vec2::new(0.0, 2.0e7),
            Vec2::new(100.0, 2.0e7),
            Vec2::new(0.0, 2.0e7 + 100.0),
        ];
        let spans = scanline_spans(&triangle, 0.3);
        assert!(!spans.is_empty());
        assert!(spans.len() <= MAX_SCANLINE_ROWS);
    }

    #[test]
    fn test_scanline_rows_are_capped_for_tall_polygons() {
        let tall = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 1.0e6),
            Vec2::new(0.0, 1.0e6),
        ];
        let spans = scanline_spans(&tall, 0.3);
        assert_eq!(spans.len(), MAX_SCANLINE_ROWS);
    }
}
