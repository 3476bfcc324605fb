//! Ordered planar path.

use serde::{Deserialize, Serialize};

use super::Point2D;
use crate::error::{Error, Result};

/// Ordered sequence of path points (N×2).
///
/// Paths from logs carry a variable number of points; constructors that take
/// raw coordinate columns drop non-finite entries instead of padding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointSequence {
    points: Vec<Point2D>,
}

impl PointSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Wrap an existing point vector as-is.
    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Build from parallel x/y columns, skipping pairs with a non-finite value.
    ///
    /// Columns of different length are zipped to the shorter one.
    pub fn from_xy(xs: &[f64], ys: &[f64]) -> Self {
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| Point2D::new(x, y))
            .filter(Point2D::is_finite)
            .collect()
    }

    /// Build from a nested array in either N×2 or 2×N layout.
    ///
    /// A 2×N input (two rows of equal length other than 2) is read as
    /// column-major. A 1×2 input is a single point, a 2×1 input likewise.
    /// A 2×2 input is read as N×2.
    pub fn from_nested(rows: &[Vec<f64>]) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return Err(Error::Shape {
                rows: n_rows,
                cols: n_cols,
            });
        }

        if n_cols == 2 {
            Ok(rows.iter().map(|r| Point2D::new(r[0], r[1])).collect())
        } else if n_rows == 2 && n_cols > 0 {
            Ok(rows[0]
                .iter()
                .zip(&rows[1])
                .map(|(&x, &y)| Point2D::new(x, y))
                .collect())
        } else {
            Err(Error::Shape {
                rows: n_rows,
                cols: n_cols,
            })
        }
    }

    /// Append a point.
    #[inline]
    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Borrow the points.
    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Iterate over points.
    pub fn iter(&self) -> std::slice::Iter<'_, Point2D> {
        self.points.iter()
    }

    /// Point at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Point2D> {
        self.points.get(index)
    }

    /// First point, if any.
    pub fn first(&self) -> Option<&Point2D> {
        self.points.first()
    }

    /// Last point, if any.
    pub fn last(&self) -> Option<&Point2D> {
        self.points.last()
    }

    /// X coordinates as a column.
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    /// Y coordinates as a column.
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Copy of the points in `range`.
    pub fn slice(&self, range: std::ops::Range<usize>) -> PointSequence {
        Self::from_points(self.points[range].to_vec())
    }

    /// Copy with non-finite points removed.
    pub fn finite(&self) -> PointSequence {
        self.points.iter().copied().filter(Point2D::is_finite).collect()
    }

    /// Cumulative chord length at each point, starting at 0.
    pub fn arc_lengths(&self) -> Vec<f64> {
        let mut acc = 0.0;
        let mut out = Vec::with_capacity(self.points.len());
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                acc += self.points[i - 1].distance(p);
            }
            out.push(acc);
        }
        out
    }

    /// Total chord length.
    pub fn total_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    /// Mean distance between consecutive points (`None` below two points).
    pub fn mean_spacing(&self) -> Option<f64> {
        if self.points.len() < 2 {
            return None;
        }
        Some(self.total_length() / (self.points.len() - 1) as f64)
    }

    /// Index of the point closest to `target` (first one on ties).
    pub fn nearest_index(&self, target: &Point2D) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let d = p.distance_squared(target);
            if !d.is_finite() {
                continue;
            }
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Tangent heading at `index` by finite differences.
    ///
    /// Central difference inside the path, one-sided at the ends.
    /// `None` for fewer than two points or an out-of-range index.
    pub fn heading_at(&self, index: usize) -> Option<f64> {
        let n = self.points.len();
        if n < 2 || index >= n {
            return None;
        }
        let (a, b) = if index == 0 {
            (0, 1)
        } else if index == n - 1 {
            (n - 2, n - 1)
        } else {
            (index - 1, index + 1)
        };
        let dx = self.points[b].x - self.points[a].x;
        let dy = self.points[b].y - self.points[a].y;
        Some(dy.atan2(dx))
    }

    /// Consume into the point vector.
    pub fn into_points(self) -> Vec<Point2D> {
        self.points
    }
}

impl FromIterator<Point2D> for PointSequence {
    fn from_iter<I: IntoIterator<Item = Point2D>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointSequence {
    type Item = &'a Point2D;
    type IntoIter = std::slice::Iter<'a, Point2D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl From<Vec<Point2D>> for PointSequence {
    fn from(points: Vec<Point2D>) -> Self {
        Self::from_points(points)
    }
}
