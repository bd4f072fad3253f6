//! Line chart geometry for the magnitude history.
//!
//! Only the coordinate mapping lives here; drawing is left to the UI. The
//! mapping auto-scales Y to the data range and guards the degenerate case
//! where every value is the same, so a flat signal never produces NaN or
//! infinite coordinates.

use serde::Serialize;

use crate::history::min_max;

/// Below this the Y range is treated as flat.
pub const DEGENERATE_RANGE_EPSILON: f32 = 1e-9;

/// Plot area in screen coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlotRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGeometry {
    /// Border always drawn around the plot.
    pub border: PlotRect,
    /// Polyline vertices; empty when there are fewer than two values.
    pub points: Vec<(f32, f32)>,
    /// Data range used for scaling, if any data was present.
    pub range: Option<(f32, f32)>,
}

impl ChartGeometry {
    /// Whether a line should be drawn at all.
    pub fn has_line(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Map `values` into `rect`.
///
/// X spreads linearly across the index range, Y linearly across
/// `[min, max]` with larger values plotted higher.
pub fn layout(values: &[f32], rect: PlotRect) -> ChartGeometry {
    let range = min_max(values.iter().copied());

    if values.len() < 2 {
        return ChartGeometry {
            border: rect,
            points: Vec::new(),
            range,
        };
    }

    let (lo, hi) = range.unwrap_or((0.0, 0.0));
    let span = hi - lo;
    let denom = if span < DEGENERATE_RANGE_EPSILON { 1.0 } else { span };
    let last_index = (values.len() - 1) as f32;

    let points = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let px = rect.x + (i as f32 / last_index) * rect.width;
            let py = rect.y + rect.height - ((v - lo) / denom) * rect.height;
            (px, py)
        })
        .collect();

    ChartGeometry {
        border: rect,
        points,
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> PlotRect {
        PlotRect::new(0.0, 0.0, 300.0, 100.0)
    }

    #[test]
    fn test_fewer_than_two_points_draws_border_only() {
        let empty = layout(&[], rect());
        assert!(!empty.has_line());
        assert_eq!(empty.border, rect());
        assert_eq!(empty.range, None);

        let single = layout(&[9.8], rect());
        assert!(single.points.is_empty());
        assert_eq!(single.range, Some((9.8, 9.8)));
    }

    #[test]
    fn test_flat_data_produces_finite_coordinates() {
        let values = vec![9.81; 200];
        let geometry = layout(&values, rect());

        assert_eq!(geometry.points.len(), 200);
        for (x, y) in &geometry.points {
            assert!(x.is_finite() && y.is_finite());
            // Flat line sits on the bottom edge.
            assert_eq!(*y, 100.0);
        }
    }

    #[test]
    fn test_min_max_scaling() {
        let geometry = layout(&[0.0, 5.0, 10.0], rect());

        assert_eq!(geometry.points[0], (0.0, 100.0));
        assert_eq!(geometry.points[1], (150.0, 50.0));
        assert_eq!(geometry.points[2], (300.0, 0.0));
    }

    #[test]
    fn test_offset_rect() {
        let geometry = layout(&[1.0, 2.0], PlotRect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(geometry.points[0], (10.0, 70.0));
        assert_eq!(geometry.points[1], (110.0, 20.0));
    }
}
