//! Weighted choice among equivalent tiles

use crate::wang::CandidateSet;
use rand::Rng;
use wangtile_core::TileId;

/// Pick one tile from a candidate set, proportionally to weight
///
/// Weights are scaled by the largest one first, so the running sum stays
/// finite however large the declared probabilities are. Draws `r` uniformly
/// from `[0, total)` and walks candidates in ascending id order until the
/// running sum exceeds `r`. The random source is only touched when two or
/// more candidates have a positive weight, so a singleton never consumes
/// randomness. When every weight is zero the lowest id wins.
pub fn select<R: Rng + ?Sized>(candidates: &CandidateSet, rng: &mut R) -> TileId {
    let mut positive = candidates.iter().filter(|c| c.weight > 0.0);
    let Some(only) = positive.next() else {
        return candidates.first().tile_id;
    };
    if positive.next().is_none() {
        return only.tile_id;
    }

    let max = candidates.iter().map(|c| c.weight).fold(0.0, f64::max);
    let scaled = || {
        candidates
            .iter()
            .filter(|c| c.weight > 0.0)
            .map(move |c| (c.tile_id, c.weight / max))
    };
    let total: f64 = scaled().map(|(_, w)| w).sum();
    let r = rng.gen_range(0.0..total);

    let mut acc = 0.0;
    let mut chosen = only.tile_id;
    for (tile_id, weight) in scaled() {
        acc += weight;
        chosen = tile_id;
        if r < acc {
            break;
        }
    }
    // Rounding can leave r just past the final sum; the last candidate takes it
    chosen
}
