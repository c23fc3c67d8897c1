//! Pairwise city swap: proposer/evaluator lane kernel and committer.

use super::acceptance::sample_pair;
use super::flag::ConsensusFlag;
use super::lane::{LaneContext, ProposalBuffers};
use super::types::Move;
use crate::geometry::CityTable;
use rand::Rng;

/// Local cost `(original, proposal)` of swapping the cities at positions
/// `a` and `b`, summed over the edges incident to both positions.
///
/// Adjacent positions share one edge, which is counted once, so
/// `proposal - original` is the exact change in squared tour length.
///
/// Both positions must lie in `1..=N-1` and differ; proposals only draw
/// from `1..=N-2`.
pub fn swap_costs(cities: &CityTable, route: &[usize], a: usize, b: usize) -> (f64, f64) {
    debug_assert_ne!(a, b);
    let (i, j) = if a < b { (a, b) } else { (b, a) };
    let swapped = |p: usize| {
        if p == i {
            route[j]
        } else if p == j {
            route[i]
        } else {
            route[p]
        }
    };

    let mut original = 0.0;
    let mut proposal = 0.0;
    for (k, start) in [i - 1, i, j - 1, j].into_iter().enumerate() {
        // edge (i, i + 1) is already counted when the positions touch
        if k == 2 && start == i {
            continue;
        }
        original += cities.edge_cost(route[start], route[start + 1]);
        proposal += cities.edge_cost(swapped(start), swapped(start + 1));
    }
    (original, proposal)
}

/// One attempt of one swap-proposer lane. Returns whether the lane
/// accepted and published.
///
/// The proposal slots always hold the lane's latest pair, so a winner's
/// slots hold the move it accepted.
pub(crate) fn propose_attempt<R: Rng>(
    ctx: &LaneContext<'_>,
    lane: usize,
    rng: &mut R,
    city_one: &mut usize,
    city_two: &mut usize,
) -> bool {
    let (a, b) = sample_pair(rng, ctx.num_cities(), ctx.half_width);
    *city_one = a;
    *city_two = b;
    if a == b {
        return false;
    }

    let (original, proposal) = swap_costs(ctx.cities, ctx.route, a, b);
    if ctx.rule.accepts(original, proposal, rng) {
        ctx.flag.publish(lane);
        return true;
    }
    false
}

/// Applies the winning swap, if any, and clears the flag.
pub(crate) fn commit(
    buffers: &ProposalBuffers,
    route: &mut [usize],
    flag: &ConsensusFlag,
) -> Option<(usize, Move)> {
    let lane = flag.take()?;
    let (a, b) = buffers.pair(lane);
    route.swap(a, b);
    tracing::trace!(lane, a, b, "committed swap");
    Some((lane, Move::Swap { a, b }))
}
