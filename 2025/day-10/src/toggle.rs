use bitvec::prelude::*;
use tracing::{debug, trace};

use crate::config::{SolverConfig, MASK_BITS};
use crate::error::ToggleError;
use crate::gf2::{AugmentedMatrix, Echelon};
use crate::model::{Button, Row, ToggleSolution};
use crate::verify::verify_toggle;

/// Finds the fewest button presses that light exactly `target`.
///
/// Every assignment of the free variables is expanded in ascending mask order,
/// replayed against the original buttons, and the first one with the lowest
/// Hamming weight is kept.
#[tracing::instrument(skip_all, fields(lights = target.len(), buttons = buttons.len()))]
pub fn solve(
    target: &BitSlice<usize, Lsb0>,
    buttons: &[Button],
    config: &SolverConfig,
) -> Result<ToggleSolution, ToggleError> {
    let echelon = AugmentedMatrix::from_buttons(target, buttons).rref()?;
    debug!(
        rank = echelon.rank(),
        free = echelon.free_cols().len(),
        "eliminated"
    );
    min_weight(&echelon, buttons, target, config.max_free_variables)
}

/// Enumerates the solution space of a consistent system for its minimum weight member.
pub fn min_weight(
    echelon: &Echelon,
    buttons: &[Button],
    target: &BitSlice<usize, Lsb0>,
    max_free_variables: usize,
) -> Result<ToggleSolution, ToggleError> {
    let free = echelon.free_cols();
    let k = free.len();
    let limit = max_free_variables.min(MASK_BITS);
    if k > limit {
        return Err(ToggleError::TooManyFreeVariables { free: k, limit });
    }

    let mut best: Option<(u64, Row)> = None;
    let mut x = echelon.base_solution();
    let num_combinations: u64 = 1 << k;

    for mask in 0..num_combinations {
        for (i, &f) in free.iter().enumerate() {
            x.set(f, (mask >> i) & 1 == 1);
        }
        echelon.back_substitute(&mut x);

        if !verify_toggle(&x, buttons, target) {
            trace!(mask, "candidate failed replay");
            continue;
        }

        // Strict comparison keeps the smallest mask on ties.
        let weight = x.count_ones();
        if best
            .as_ref()
            .map_or(true, |(_, current)| weight < current.count_ones())
        {
            trace!(mask, weight, "new minimum");
            best = Some((mask, x.clone()));
        }
    }

    let (mask, presses) = best.ok_or(ToggleError::NoVerifiedCandidate)?;
    debug!(mask, weight = presses.count_ones(), "minimum weight solution");
    Ok(ToggleSolution::new(presses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn buttons(raw: &[&[usize]]) -> Vec<Button> {
        raw.iter().map(|b| Button::new(b.iter().copied())).collect()
    }

    fn pattern(bits: &[u8]) -> Row {
        bits.iter().map(|&b| b == 1).collect()
    }

    /// Weight of the lightest verified subset, by trying all 2^n of them.
    fn brute_force_min(target: &BitSlice<usize, Lsb0>, buttons: &[Button]) -> Option<usize> {
        (0u64..1 << buttons.len())
            .filter_map(|mask| {
                let x: Row = (0..buttons.len()).map(|i| (mask >> i) & 1 == 1).collect();
                verify_toggle(&x, buttons, target).then(|| x.count_ones())
            })
            .min()
    }

    #[rstest]
    #[case(&[0, 1, 1, 0], &[&[3][..], &[1, 3], &[2], &[2, 3], &[0, 2], &[0, 1]], 2)]
    #[case(&[0, 0, 0, 1, 0], &[&[0, 2, 3, 4][..], &[2, 3], &[0, 4], &[0, 1, 2], &[1, 2, 3, 4]], 3)]
    #[case(&[0, 1, 1, 1, 0, 1], &[&[0, 1, 2, 3, 4][..], &[0, 3, 4], &[0, 1, 2, 4, 5], &[1, 2]], 2)]
    fn sample_machines(#[case] lights: &[u8], #[case] raw: &[&[usize]], #[case] expected: usize) {
        let target = pattern(lights);
        let buttons = buttons(raw);
        let solution = solve(&target, &buttons, &SolverConfig::default()).unwrap();
        assert_eq!(solution.weight(), expected);
        assert!(verify_toggle(solution.presses(), &buttons, &target));
    }

    #[test]
    fn chain_of_pairs_finds_true_minimum() {
        let target = pattern(&[0, 1, 1, 0]);
        let buttons = buttons(&[&[0, 1], &[1, 2], &[2, 3]]);
        let solution = solve(&target, &buttons, &SolverConfig::default()).unwrap();

        assert!(verify_toggle(solution.presses(), &buttons, &target));
        assert_eq!(Some(solution.weight()), brute_force_min(&target, &buttons));
        assert_eq!(solution.pressed_buttons(), vec![1]);
    }

    #[test]
    fn unreachable_light_is_inconsistent() {
        let target = pattern(&[1, 1]);
        let buttons = buttons(&[&[0]]);
        assert_eq!(
            solve(&target, &buttons, &SolverConfig::default()),
            Err(ToggleError::Inconsistent)
        );
    }

    #[test]
    fn no_buttons_and_lit_target_has_no_solution() {
        let target = pattern(&[0, 1]);
        assert!(solve(&target, &[], &SolverConfig::default()).is_err());
    }

    #[test]
    fn dark_target_selects_the_empty_press_set() {
        let target = pattern(&[0, 0, 0]);
        let buttons = buttons(&[&[0, 1], &[1, 2], &[0, 2]]);
        let solution = solve(&target, &buttons, &SolverConfig::default()).unwrap();
        assert_eq!(solution.weight(), 0);
        assert_eq!(solution.presses().len(), 3);
    }

    #[test]
    fn ties_resolve_to_the_smallest_mask() {
        // Three identical buttons: masks 0, 1 and 2 all have weight 1, and
        // mask 0 presses only the pivot button.
        let target = pattern(&[1]);
        let buttons = buttons(&[&[0], &[0], &[0]]);
        let config = SolverConfig::default();

        let first = solve(&target, &buttons, &config).unwrap();
        assert_eq!(first.pressed_buttons(), vec![0]);
        for _ in 0..5 {
            assert_eq!(solve(&target, &buttons, &config).unwrap(), first);
        }
    }

    #[test]
    fn free_variable_guard_rejects_large_spaces() {
        let target = pattern(&[1]);
        let buttons = buttons(&[&[0], &[0], &[0], &[0]]);
        let config = SolverConfig::default().with_max_free_variables(2);
        assert_eq!(
            solve(&target, &buttons, &config),
            Err(ToggleError::TooManyFreeVariables { free: 3, limit: 2 })
        );
    }

    #[test]
    fn matches_brute_force_on_dense_wiring() {
        let buttons = buttons(&[&[0, 1, 2], &[1, 3], &[0, 3, 4], &[2, 4], &[0, 1, 2, 3, 4], &[4]]);
        for bits in 0u8..32 {
            let target: Row = (0..5).map(|i| (bits >> i) & 1 == 1).collect();
            let expected = brute_force_min(&target, &buttons);
            let got = solve(&target, &buttons, &SolverConfig::default())
                .ok()
                .map(|s| s.weight());
            assert_eq!(got, expected, "target {bits:05b}");
        }
    }
}
