//! Permutation ranking in the factorial number system.
//!
//! Both the move tables and the pruning table are indexed by the
//! lexicographic rank of an eight element projection of the puzzle, so these
//! functions sit underneath everything else in the crate.

use crate::FACT_UNTIL_12;

/// Compute the 0-based lexicographic rank of `perm` among all permutations of
/// its elements. The elements must be distinct.
#[must_use]
pub fn rank(perm: &[u8]) -> usize {
    let piece_count = perm.len();
    debug_assert!(piece_count < FACT_UNTIL_12.len());

    // The last element never has a smaller element after it, so it never
    // contributes to the rank
    (0..piece_count.saturating_sub(1))
        .map(|i| {
            let lt_after_current_count = perm[i + 1..].iter().filter(|&&p| p < perm[i]).count();
            // FACT_UNTIL_12[i] = i!
            lt_after_current_count * FACT_UNTIL_12[piece_count - 1 - i]
        })
        .sum()
}

/// Overwrite `perm` with the permutation of `0..perm.len()` whose rank is
/// `index`. This is the inverse of [`rank`].
#[allow(clippy::cast_possible_truncation)]
pub fn unrank(mut index: usize, perm: &mut [u8]) {
    let piece_count = perm.len();
    debug_assert!(index < FACT_UNTIL_12[piece_count]);

    for i in (0..piece_count).rev() {
        let radix = piece_count - i;
        perm[i] = (index % radix) as u8;
        index /= radix;
        // Everything after `i` was decoded relative to the values still
        // unused, so bump the ones at or above the value just placed
        for j in i + 1..piece_count {
            if perm[j] >= perm[i] {
                perm[j] += 1;
            }
        }
    }
}

/// Cycle the entries of `perm` at `positions` forward by one: the entry at
/// the last position moves to the first and every other entry moves to the
/// next position. Two positions describe a swap.
pub fn cycle<T: Copy>(perm: &mut [T], positions: &[usize]) {
    let Some(&last) = positions.last() else {
        return;
    };
    let temp = perm[last];
    for window in positions.windows(2).rev() {
        perm[window[1]] = perm[window[0]];
    }
    perm[positions[0]] = temp;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_unrank_round_trip() {
        let mut perm = [0; 8];
        for i in 0..FACT_UNTIL_12[8] {
            unrank(i, &mut perm);
            assert_eq!(rank(&perm), i);
        }
    }

    #[test]
    fn test_rank_extremes() {
        assert_eq!(rank(&[0, 1, 2, 3, 4, 5, 6, 7]), 0);
        assert_eq!(rank(&[7, 6, 5, 4, 3, 2, 1, 0]), 40_319);
        assert_eq!(rank(&[1, 0, 2]), 2);
        assert_eq!(rank(&[2, 0, 1]), 4);
        assert_eq!(rank(&[]), 0);
    }

    #[test]
    fn test_unrank_known() {
        let mut perm = [0; 4];
        unrank(0, &mut perm);
        assert_eq!(perm, [0, 1, 2, 3]);
        unrank(23, &mut perm);
        assert_eq!(perm, [3, 2, 1, 0]);
        unrank(9, &mut perm);
        assert_eq!(perm, [1, 2, 3, 0]);
    }

    #[test]
    fn test_rank_ignores_labels() {
        // Only relative order matters
        assert_eq!(rank(&[10, 3, 7]), rank(&[2, 0, 1]));
    }

    #[test]
    fn test_cycle() {
        let mut perm = [0, 1, 2, 3, 4, 5, 6, 7];
        cycle(&mut perm, &[0, 3, 2, 1]);
        assert_eq!(perm, [1, 2, 3, 0, 4, 5, 6, 7]);

        let mut perm = [0, 1, 2, 3, 4, 5, 6, 7];
        cycle(&mut perm, &[2, 4]);
        cycle(&mut perm, &[3, 5]);
        assert_eq!(perm, [0, 1, 4, 5, 2, 3, 6, 7]);

        let mut perm = [0, 1, 2];
        cycle(&mut perm, &[]);
        assert_eq!(perm, [0, 1, 2]);
    }
}
