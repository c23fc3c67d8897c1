//! Single-city relocation: proposer/evaluator lane kernel and the two
//! committers.
//!
//! Moving the city at position `a` to just after the city at position `b`
//! touches only the band between them:
//!
//! - `a < b`: slots `a..b` take the value one to their right, slot `b`
//!   receives the moved city.
//! - `a > b`: slots `b+2..=a` take the value one to their left, slot `b+1`
//!   receives the moved city.

use super::acceptance::sample_pair;
use super::config::InsertionCommit;
use super::flag::ConsensusFlag;
use super::lane::{LaneContext, ProposalBuffers};
use super::types::Move;
use crate::geometry::CityTable;
use rand::Rng;
use rayon::prelude::*;

/// Whether relocating position `a` after position `b` is a real move in a
/// tour over `n` cities.
///
/// `b == a` and `b == a - 1` leave the tour unchanged; `b == n - 1` (the last
/// movable slot) is excluded as a target.
#[inline]
pub fn is_valid_insertion(a: usize, b: usize, n: usize) -> bool {
    b != a && b + 1 != a && b != n - 1
}

/// Local cost `(original, proposal)` of moving the city at position `a` to
/// directly after the city at position `b`.
///
/// Three edges on each side: the two around `a` plus the one leaving `b`
/// before the move; `b -> a`, `a -> b's successor` and the edge bridging
/// `a`'s old neighbours after it.
pub fn insertion_costs(cities: &CityTable, route: &[usize], a: usize, b: usize) -> (f64, f64) {
    let city = route[a];
    let pre = route[a - 1];
    let post = route[a + 1];
    let target = route[b];
    let target_post = route[b + 1];

    let original = cities.edge_cost(pre, city)
        + cities.edge_cost(city, post)
        + cities.edge_cost(target, target_post);
    let proposal = cities.edge_cost(target, city)
        + cities.edge_cost(city, target_post)
        + cities.edge_cost(pre, post);
    (original, proposal)
}

/// One attempt of one insertion-proposer lane. Returns whether the lane
/// accepted and published.
///
/// Invalid pairs are rejected and consume the attempt without touching the
/// proposal slots.
pub(crate) fn propose_attempt<R: Rng>(
    ctx: &LaneContext<'_>,
    lane: usize,
    rng: &mut R,
    city_one: &mut usize,
    city_two: &mut usize,
) -> bool {
    let n = ctx.num_cities();
    let (a, b) = sample_pair(rng, n, ctx.half_width);
    if !is_valid_insertion(a, b, n) {
        return false;
    }
    *city_one = a;
    *city_two = b;

    let (original, proposal) = insertion_costs(ctx.cities, ctx.route, a, b);
    if ctx.rule.accepts(original, proposal, rng) {
        ctx.flag.publish(lane);
        return true;
    }
    false
}

/// Copies the pre-move tour into `snapshot`, one position per task.
fn take_snapshot(route: &[usize], snapshot: &mut [usize], parallel: bool) {
    if parallel {
        snapshot
            .par_iter_mut()
            .zip(route.par_iter())
            .for_each(|(dst, &src)| *dst = src);
    } else {
        snapshot.copy_from_slice(route);
    }
}

/// New value of `position` after the move, read from the pre-move
/// `snapshot`, or `None` if the position is outside the band.
#[inline]
fn shifted_value(snapshot: &[usize], position: usize, a: usize, b: usize) -> Option<usize> {
    if a < b {
        if position >= a && position < b {
            Some(snapshot[position + 1])
        } else if position == b {
            Some(snapshot[a])
        } else {
            None
        }
    } else if position > b + 1 && position <= a {
        Some(snapshot[position - 1])
    } else if position == b + 1 {
        Some(snapshot[a])
    } else {
        None
    }
}

/// Every position gathers its post-move value from the snapshot; positions
/// outside the band keep theirs.
fn shift_from_snapshot(route: &mut [usize], snapshot: &[usize], a: usize, b: usize, parallel: bool) {
    let gather = |(position, slot): (usize, &mut usize)| {
        if let Some(value) = shifted_value(snapshot, position, a, b) {
            *slot = value;
        }
    };
    if parallel {
        route.par_iter_mut().enumerate().for_each(gather);
    } else {
        route.iter_mut().enumerate().for_each(gather);
    }
}

/// Shifts the band in place, carrying the moved city across it.
pub(crate) fn shift_serial(route: &mut [usize], a: usize, b: usize) {
    if a < b {
        route[a..=b].rotate_left(1);
    } else {
        route[b + 1..=a].rotate_right(1);
    }
}

/// Moves the city at position `a` to just after position `b` with the
/// chosen strategy.
///
/// `snapshot` must be as long as `route` when `strategy` is
/// [`InsertionCommit::Snapshot`]; it is ignored otherwise.
pub(crate) fn relocate(
    route: &mut [usize],
    snapshot: &mut [usize],
    a: usize,
    b: usize,
    strategy: InsertionCommit,
    parallel: bool,
) {
    match strategy {
        InsertionCommit::Snapshot => {
            take_snapshot(route, snapshot, parallel);
            shift_from_snapshot(route, snapshot, a, b, parallel);
        }
        InsertionCommit::Serial => shift_serial(route, a, b),
    }
}

/// Applies the winning relocation, if any, and clears the flag.
pub(crate) fn commit(
    buffers: &ProposalBuffers,
    route: &mut [usize],
    snapshot: &mut [usize],
    flag: &ConsensusFlag,
    strategy: InsertionCommit,
    parallel: bool,
) -> Option<(usize, Move)> {
    let lane = flag.take()?;
    let (a, b) = buffers.pair(lane);
    relocate(route, snapshot, a, b, strategy, parallel);
    tracing::trace!(lane, from = a, after = b, ?strategy, "committed insertion");
    Some((lane, Move::Insertion { from: a, after: b }))
}
