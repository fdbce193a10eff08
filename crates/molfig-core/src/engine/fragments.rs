//! Connectivity repair for multi-fragment inputs.
//!
//! The layout tree needs a single connected graph to walk. Inputs with
//! several disconnected fragments (salts, mixtures) get invisible link
//! edges from the last atom of one fragment to the first atom of the next;
//! atoms without any bonds are hung off the nearest anchor the same way.

use std::collections::HashSet;

use super::state::LayoutState;

/// Joins all fragments and orphaned atoms of `state` into one connected
/// graph using link edges.
///
/// Links are added after bond angles have been accumulated, so they never
/// influence hydrogen or charge placement.
pub fn connect_fragments(state: &mut LayoutState) {
    let fragments = bonded_fragments(&state.bond_pairs);

    for window in fragments.windows(2) {
        let head_last = window[0][window[0].len() - 1].1;
        let tail_first = window[1][0].0;
        state.add_link(head_last, tail_first);
    }

    let bonded: HashSet<usize> = state
        .bond_pairs
        .iter()
        .flat_map(|&(a, b)| [a, b])
        .collect();
    let orphans: Vec<usize> = (0..state.atoms.len())
        .filter(|index| !bonded.contains(index))
        .collect();
    if orphans.is_empty() {
        return;
    }

    match fragments.last() {
        Some(fragment) => {
            let anchor = fragment[fragment.len() - 1].1;
            for &orphan in &orphans {
                state.add_link(anchor, orphan);
            }
        }
        None => {
            let anchor = orphans[0];
            for &orphan in &orphans[1..] {
                state.add_link(anchor, orphan);
            }
        }
    }
}

/// Groups bond pairs into connected fragments, ordered by the first pair
/// that touches each fragment.
fn bonded_fragments(pairs: &[(usize, usize)]) -> Vec<Vec<(usize, usize)>> {
    let mut fragments = Vec::new();
    let mut remaining = pairs.to_vec();
    while !remaining.is_empty() {
        let (connected, rest) = split_connected(remaining);
        fragments.push(connected);
        remaining = rest;
    }
    fragments
}

// Splits off every pair connected, directly or transitively, to the first
// pair of the list. Sweeps until a pass stops finding new pairs.
fn split_connected(pairs: Vec<(usize, usize)>) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let mut pairs = pairs.into_iter();
    let Some(first) = pairs.next() else {
        return (Vec::new(), Vec::new());
    };

    let mut connected_atoms: HashSet<usize> = HashSet::from([first.0, first.1]);
    let mut connected = vec![first];
    let mut rest: Vec<(usize, usize)> = pairs.collect();

    loop {
        let before = rest.len();
        let mut unconnected = Vec::with_capacity(before);
        for pair in rest {
            if connected_atoms.contains(&pair.0) || connected_atoms.contains(&pair.1) {
                connected_atoms.insert(pair.0);
                connected_atoms.insert(pair.1);
                connected.push(pair);
            } else {
                unconnected.push(pair);
            }
        }
        if unconnected.len() == before {
            return (connected, unconnected);
        }
        rest = unconnected;
    }
}
