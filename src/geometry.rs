//! City coordinates.
//!
//! [`CityTable`] is the immutable coordinate table shared read-only by every
//! proposal lane for the lifetime of a solve.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2-D city location.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance. Used as the edge cost by all move
    /// evaluators.
    #[inline]
    pub fn squared_distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        self.squared_distance(other).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Ordered coordinate table indexed by city.
///
/// # Examples
///
/// ```
/// use u_tsp_anneal::geometry::CityTable;
///
/// let cities = CityTable::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]).unwrap();
/// assert_eq!(cities.len(), 3);
/// assert!((cities.edge_cost(0, 2) - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CityTable {
    points: Vec<Point>,
}

impl CityTable {
    /// Builds a table, rejecting fewer than 3 cities or non-finite values.
    pub fn new<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Result<Self> {
        let points: Vec<Point> = points.into_iter().map(Into::into).collect();
        if points.len() < 3 {
            return Err(Error::TooFewCities(points.len()));
        }
        if let Some(city) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(Error::NonFiniteCoordinate(city));
        }
        Ok(Self { points })
    }

    /// Number of cities `N`.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, city: usize) -> Point {
        self.points[city]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Squared length of the edge between two cities.
    #[inline]
    pub fn edge_cost(&self, from: usize, to: usize) -> f64 {
        self.points[from].squared_distance(&self.points[to])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.squared_distance(&b) - 25.0).abs() < 1e-12);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_cities() {
        let err = CityTable::new(vec![(0.0, 0.0), (1.0, 1.0)]).unwrap_err();
        assert_eq!(err, Error::TooFewCities(2));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = CityTable::new(vec![(0.0, 0.0), (f64::NAN, 1.0), (2.0, 2.0)]).unwrap_err();
        assert_eq!(err, Error::NonFiniteCoordinate(1));
    }

    #[test]
    fn test_edge_cost_symmetric() {
        let table = CityTable::new(vec![(0.0, 0.0), (1.0, 2.0), (-3.0, 0.5)]).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert!((table.edge_cost(i, j) - table.edge_cost(j, i)).abs() < 1e-12);
            }
            assert_eq!(table.edge_cost(i, i), 0.0);
        }
    }
}
