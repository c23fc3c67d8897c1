//! Sampling window and Metropolis acceptance test.
//!
//! Both are driven by the round temperature: a lower temperature narrows the
//! window the second city is drawn from and makes cost increases less likely
//! to be accepted.

use rand::Rng;

/// Half-width `w = floor(exp(-decay / T) * n)` of the sampling window.
///
/// ```
/// use u_tsp_anneal::anneal::sampling_half_width;
///
/// assert_eq!(sampling_half_width(1e-6, 0.01, 100), 0);
/// assert_eq!(sampling_half_width(1e6, 0.01, 100), 99);
/// ```
pub fn sampling_half_width(temperature: f64, decay: f64, n: usize) -> usize {
    let width = ((-decay / temperature).exp() * n as f64).floor();
    if width.is_finite() && width > 0.0 {
        width as usize
    } else {
        0
    }
}

/// Inclusive window `[max(lo, a - w), min(hi, a + w)]`.
#[inline]
pub fn window_bounds(a: usize, half_width: usize, lo: usize, hi: usize) -> (usize, usize) {
    let min = a.saturating_sub(half_width).max(lo);
    let max = a.saturating_add(half_width).min(hi);
    (min, max)
}

/// Draws a pair of positions `(a, b)` for a tour over `n` cities.
///
/// `a` is uniform over the interior `[1, n-2]`; `b` is uniform over
/// `[max(1, a-w), min(n-1, a+w)]`. Both are clamped back into the interior,
/// so the last movable slot `n-1` is never returned.
pub(crate) fn sample_pair<R: Rng>(rng: &mut R, n: usize, half_width: usize) -> (usize, usize) {
    let hi = n - 2;
    let a = rng.random_range(1..=hi);
    let (min, max) = window_bounds(a, half_width, 1, n - 1);
    let b = rng.random_range(min..=max);
    (a.clamp(1, hi), b.clamp(1, hi))
}

/// Relative cost increase `proposal / original - 1`.
///
/// A zero original cost only arises from coincident cities. Two zero costs
/// count as a neutral move; any positive proposal over a zero original is an
/// infinite increase and never accepted.
pub fn relative_increase(original: f64, proposal: f64) -> f64 {
    if original > 0.0 {
        proposal / original - 1.0
    } else if proposal > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Metropolis-style acceptance rule for one round.
#[derive(Debug, Clone, Copy)]
pub struct Metropolis {
    pub temperature: f64,
    pub scale: f64,
}

impl Metropolis {
    pub fn new(temperature: f64, scale: f64) -> Self {
        Self { temperature, scale }
    }

    /// `exp(-scale * (proposal / original - 1) / T)`, capped at 1.
    pub fn probability(&self, original: f64, proposal: f64) -> f64 {
        let r = relative_increase(original, proposal);
        (-self.scale * r / self.temperature).exp().min(1.0)
    }

    /// Decides with an explicit uniform draw in `[0, 1)`.
    ///
    /// ```
    /// use u_tsp_anneal::anneal::Metropolis;
    ///
    /// let rule = Metropolis::new(1.0, 20.0);
    /// // improvements are taken regardless of the draw
    /// assert!(rule.accepts_with_draw(2.0, 1.0, 0.999));
    /// // a 10% increase at T = 1 has probability exp(-2)
    /// assert!(rule.accepts_with_draw(1.0, 1.1, 0.13));
    /// assert!(!rule.accepts_with_draw(1.0, 1.1, 0.14));
    /// ```
    pub fn accepts_with_draw(&self, original: f64, proposal: f64, draw: f64) -> bool {
        proposal < original || self.probability(original, proposal) > draw
    }

    /// Decides, drawing from `rng` only when the proposal is not an
    /// improvement.
    pub fn accepts<R: Rng>(&self, original: f64, proposal: f64, rng: &mut R) -> bool {
        if proposal < original {
            return true;
        }
        let draw: f64 = rng.random();
        self.probability(original, proposal) > draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_half_width_monotone_in_temperature() {
        let n = 500;
        let mut last = 0;
        for &t in &[1e-4, 1e-3, 1e-2, 1e-1, 1.0, 10.0] {
            let w = sampling_half_width(t, 0.01, n);
            assert!(w >= last, "width shrank from {last} to {w} at T={t}");
            assert!(w <= n);
            last = w;
        }
    }

    #[test]
    fn test_half_width_closed_form() {
        let expected = ((-0.01f64 / 0.05).exp() * 200.0).floor() as usize;
        assert_eq!(sampling_half_width(0.05, 0.01, 200), expected);
    }

    #[test]
    fn test_window_bounds_clamped() {
        assert_eq!(window_bounds(1, 5, 1, 8), (1, 6));
        assert_eq!(window_bounds(8, 5, 1, 8), (3, 8));
        assert_eq!(window_bounds(4, 0, 1, 8), (4, 4));
        assert_eq!(window_bounds(4, usize::MAX, 1, 8), (1, 8));
    }

    #[test]
    fn test_sample_pair_stays_in_range_at_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen_edges = (false, false);
        for _ in 0..2_000 {
            let (a, b) = sample_pair(&mut rng, 10, 100);
            assert!((1..=8).contains(&a));
            assert!((1..=8).contains(&b));
            seen_edges.0 |= a == 1;
            seen_edges.1 |= a == 8;
        }
        assert_eq!(seen_edges, (true, true));
        for _ in 0..2_000 {
            let (a, b) = sample_pair(&mut rng, 10, 2);
            assert!(a.abs_diff(b) <= 2);
        }
    }

    #[test]
    fn test_sample_pair_zero_width_repeats_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..200 {
            let (a, b) = sample_pair(&mut rng, 12, 0);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_sample_pair_three_cities() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            assert_eq!(sample_pair(&mut rng, 3, 10), (1, 1));
        }
    }

    #[test]
    fn test_relative_increase_zero_cost_policy() {
        assert_eq!(relative_increase(0.0, 0.0), 0.0);
        assert_eq!(relative_increase(0.0, 1.0), f64::INFINITY);
        assert!((relative_increase(2.0, 3.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_original_positive_proposal_rejected() {
        let rule = Metropolis::new(1e6, 20.0);
        assert!(!rule.accepts_with_draw(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_improvement_always_accepted() {
        for &t in &[1e-12, 1e-3, 1.0, 1e9] {
            let rule = Metropolis::new(t, 20.0);
            assert!(rule.accepts_with_draw(5.0, 4.999, 0.999_999));
        }
    }

    #[test]
    fn test_probability_limits() {
        let cold = Metropolis::new(1e-9, 20.0);
        let hot = Metropolis::new(1e9, 20.0);
        assert!(cold.probability(1.0, 1.5) < 1e-100);
        assert!(hot.probability(1.0, 1.5) > 0.999_999);
    }

    #[test]
    fn test_boundary_matches_closed_form() {
        let rule = Metropolis::new(0.5, 20.0);
        let (original, proposal) = (4.0, 4.2);
        let p = (-20.0f64 * (4.2 / 4.0 - 1.0) / 0.5).exp();
        assert!((rule.probability(original, proposal) - p).abs() < 1e-12);
        assert!(rule.accepts_with_draw(original, proposal, p - 1e-9));
        assert!(!rule.accepts_with_draw(original, proposal, p));
        assert!(!rule.accepts_with_draw(original, proposal, p + 1e-9));
    }
}
