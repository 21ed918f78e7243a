//! Enumeration of the information states definable over a model's worlds.
//!
//! The states considered by the global relations are the subsets of the
//! ignorant state: bare possibilities, one per chosen world. A model with
//! `W` worlds has `2^W` of them. That growth is inherent to deciding the
//! relations by enumeration.

use gsv_core::{Identity, InformationState};
use gsv_eval::log::targets;
use gsv_types::World;

/// The binomial coefficient `C(n, k)`; zero when `k > n`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (1..=k).fold(1, |acc, i| acc * (n + 1 - i) / i)
}

/// Every `k`-element subset of the worlds `0..=n`, as bare states, in
/// lexicographic order of their worlds.
///
/// `k == 0` yields exactly the empty state; `k > n + 1` yields nothing.
pub fn generate_sub_states(n: usize, k: usize, identity: Identity) -> Vec<InformationState> {
    if k == 0 {
        return vec![InformationState::with_identity(identity)];
    }
    if k > n + 1 {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(binomial(n + 1, k));
    let mut current = Vec::with_capacity(k);
    backtrack(0, n, k, &mut current, &mut |worlds: &[World]| {
        result.push(InformationState::from_worlds(worlds.iter().copied(), identity));
    });
    log::trace!(target: targets::ENUMERATION, "Generated {} states of size {k} over {} worlds", result.len(), n + 1);
    result
}

fn backtrack(
    start: World,
    n: usize,
    k: usize,
    current: &mut Vec<World>,
    emit: &mut impl FnMut(&[World]),
) {
    if current.len() == k {
        emit(current);
        return;
    }
    // Leave room for the worlds still to be chosen.
    let last = n + 1 - (k - current.len());
    for world in start..=last {
        current.push(world);
        backtrack(world + 1, n, k, current, emit);
        current.pop();
    }
}

/// The states with `k` worlds of a model with `worlds` worlds.
pub fn states_of_size(worlds: usize, k: usize, identity: Identity) -> Vec<InformationState> {
    match worlds.checked_sub(1) {
        Some(n) => generate_sub_states(n, k, identity),
        None if k == 0 => vec![InformationState::with_identity(identity)],
        None => Vec::new(),
    }
}

/// Every state of a model with `worlds` worlds, by increasing size.
pub fn state_space(worlds: usize, identity: Identity) -> impl Iterator<Item = InformationState> {
    (0..=worlds).flat_map(move |k| states_of_size(worlds, k, identity))
}
