//! Closed tour representation.
//!
//! A tour over `N` cities is stored as `N + 1` city indices: a permutation of
//! `0..N` followed by a copy of its first entry. Slots `0` and `N` are fixed
//! anchors. Proposals sample positions from the interior `1..=N-2`.

use crate::error::{Error, Result};
use crate::geometry::CityTable;
use rand::seq::SliceRandom;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A closed permutation of cities.
///
/// The only way to mutate a `Tour` from outside the crate is through the
/// committers in [`anneal`](crate::anneal), which preserve validity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tour {
    route: Vec<usize>,
}

impl Tour {
    /// Wraps a closed route of length `N + 1`, validating it.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_tsp_anneal::tour::Tour;
    ///
    /// let tour = Tour::new(vec![0, 2, 1, 3, 0]).unwrap();
    /// assert_eq!(tour.num_cities(), 4);
    /// assert!(Tour::new(vec![0, 2, 1, 3]).is_err());
    /// ```
    pub fn new(route: Vec<usize>) -> Result<Self> {
        let tour = Self { route };
        tour.validate()?;
        Ok(tour)
    }

    /// Closes an open visiting order by appending its first city.
    pub fn from_order(mut order: Vec<usize>) -> Result<Self> {
        if let Some(&first) = order.first() {
            order.push(first);
        }
        Self::new(order)
    }

    /// `0, 1, ..., n-1, 0`.
    pub fn identity(n: usize) -> Result<Self> {
        Self::from_order((0..n).collect())
    }

    /// A uniformly shuffled closed tour.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Result<Self> {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);
        Self::from_order(order)
    }

    /// Checks the closed-permutation invariant.
    pub fn validate(&self) -> Result<()> {
        let len = self.route.len();
        if len < 4 {
            return Err(Error::TooFewCities(len.saturating_sub(1)));
        }
        let n = len - 1;
        let (first, last) = (self.route[0], self.route[n]);
        if first != last {
            return Err(Error::OpenTour { first, last });
        }
        let mut seen = vec![false; n];
        for &city in &self.route[..n] {
            if city >= n {
                return Err(Error::NotAPermutation {
                    n,
                    reason: format!("city {city} out of range"),
                });
            }
            if seen[city] {
                return Err(Error::NotAPermutation {
                    n,
                    reason: format!("city {city} visited twice"),
                });
            }
            seen[city] = true;
        }
        Ok(())
    }

    /// Number of cities `N` (one less than the route length).
    pub fn num_cities(&self) -> usize {
        self.route.len() - 1
    }

    /// The full closed route, `N + 1` entries.
    pub fn as_slice(&self) -> &[usize] {
        &self.route
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [usize] {
        &mut self.route
    }

    /// Visiting order without the closing entry.
    pub fn cities(&self) -> &[usize] {
        &self.route[..self.num_cities()]
    }

    #[inline]
    pub fn city_at(&self, position: usize) -> usize {
        self.route[position]
    }

    /// Sum of squared edge lengths, the quantity the move evaluators
    /// optimize locally.
    pub fn squared_length(&self, cities: &CityTable) -> f64 {
        self.route
            .windows(2)
            .map(|w| cities.edge_cost(w[0], w[1]))
            .sum()
    }

    /// Euclidean closed-tour length.
    pub fn length(&self, cities: &CityTable) -> f64 {
        self.route
            .windows(2)
            .map(|w| cities.point(w[0]).distance(&cities.point(w[1])))
            .sum()
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn unit_square() -> CityTable {
        CityTable::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap()
    }

    #[test]
    fn test_identity() {
        let tour = Tour::identity(5).unwrap();
        assert_eq!(tour.as_slice(), &[0, 1, 2, 3, 4, 0]);
        assert_eq!(tour.cities(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_open_tour_rejected() {
        let err = Tour::new(vec![0, 1, 2, 3, 1]).unwrap_err();
        assert_eq!(err, Error::OpenTour { first: 0, last: 1 });
    }

    #[test]
    fn test_duplicate_rejected() {
        assert!(matches!(
            Tour::new(vec![0, 1, 1, 3, 0]),
            Err(Error::NotAPermutation { .. })
        ));
        assert!(matches!(
            Tour::new(vec![0, 1, 7, 3, 0]),
            Err(Error::NotAPermutation { .. })
        ));
    }

    #[test]
    fn test_too_short_rejected() {
        assert_eq!(Tour::new(vec![0, 1, 0]), Err(Error::TooFewCities(2)));
    }

    #[test]
    fn test_random_is_valid() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for n in 3..20 {
            let tour = Tour::random(n, &mut rng).unwrap();
            assert!(tour.validate().is_ok());
            assert_eq!(tour.num_cities(), n);
        }
    }

    #[test]
    fn test_lengths_unit_square() {
        let cities = unit_square();
        let crossed = Tour::new(vec![0, 2, 1, 3, 0]).unwrap();
        let square = Tour::new(vec![0, 1, 2, 3, 0]).unwrap();

        let expected = 2.0 + 2.0 * 2f64.sqrt();
        assert!((crossed.length(&cities) - expected).abs() < 1e-12);
        assert!((square.length(&cities) - 4.0).abs() < 1e-12);
        assert!((crossed.squared_length(&cities) - 6.0).abs() < 1e-12);
        assert!((square.squared_length(&cities) - 4.0).abs() < 1e-12);
    }
}
