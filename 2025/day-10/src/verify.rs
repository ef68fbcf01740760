//! Replay of candidate solutions against the physical button wiring.
//!
//! These functions never look at a reduced matrix or a relaxed program; they
//! start from an all-zero state and apply the presses exactly as the machine
//! would. Everything the solvers emit goes through here before it is trusted.

use bitvec::prelude::*;

use crate::model::{Button, Row};

/// Applies every button with an odd press count to an all-zero pattern of `len` lights.
///
/// Returns `None` when the solution does not have one entry per button.
pub fn replay_toggle(
    solution: &BitSlice<usize, Lsb0>,
    buttons: &[Button],
    len: usize,
) -> Option<Row> {
    if solution.len() != buttons.len() {
        return None;
    }

    let mut state = Row::repeat(false, len);
    for idx in solution.iter_ones() {
        for p in buttons[idx].effects(len) {
            let lit = state[p];
            state.set(p, !lit);
        }
    }
    Some(state)
}

/// Applies `counts[i]` presses of button `i` to an all-zero vector of `len` counters.
///
/// Returns `None` on a length mismatch or if a counter overflows.
pub fn replay_increment(counts: &[u64], buttons: &[Button], len: usize) -> Option<Vec<u64>> {
    if counts.len() != buttons.len() {
        return None;
    }

    let mut state = vec![0u64; len];
    for (button, &count) in buttons.iter().zip(counts) {
        if count == 0 {
            continue;
        }
        for p in button.effects(len) {
            state[p] = state[p].checked_add(count)?;
        }
    }
    Some(state)
}

/// True iff pressing the selected buttons once each lights exactly `target`.
pub fn verify_toggle(
    solution: &BitSlice<usize, Lsb0>,
    buttons: &[Button],
    target: &BitSlice<usize, Lsb0>,
) -> bool {
    replay_toggle(solution, buttons, target.len())
        .is_some_and(|state| state[..] == target[..])
}

/// True iff the press counts drive every counter to exactly its target value.
pub fn verify_increment(counts: &[u64], buttons: &[Button], target: &[u64]) -> bool {
    replay_increment(counts, buttons, target.len())
        .is_some_and(|state| state[..] == target[..])
}
