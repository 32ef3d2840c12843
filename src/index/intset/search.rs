//! Searches over one section's element run.
//!
//! A run is the slice `elements[left..=right]` of a single section, so it is
//! strictly ascending. Every search exists twice: a binary search used by the
//! set itself and a linear scan kept as the reference the binary search is
//! checked against.

use std::cmp::Ordering;

/// Classic binary search for `elem` in an ascending run
pub fn binarysearch_is_member<E: Ord + Copy>(run: &[E], elem: E) -> bool {
    let mut left = 0usize;
    let mut right = run.len();

    while left < right {
        let mid = left + (right - left) / 2;
        match elem.cmp(&run[mid]) {
            Ordering::Less => right = mid,
            Ordering::Greater => left = mid + 1,
            Ordering::Equal => return true,
        }
    }

    false
}

/// Linear-scan counterpart of [`binarysearch_is_member`]
pub fn linear_is_member<E: Ord + Copy>(run: &[E], elem: E) -> bool {
    run.iter()
        .take_while(|&&stored| stored <= elem)
        .any(|&stored| stored == elem)
}

/// Offset of the first element `>= value`.
///
/// Returns 0 when `value` is at most the first element (or the run is empty)
/// and `run.len()` when `value` exceeds the last element.
pub fn binarysearch_idx_smallest_geq<E: Ord + Copy>(run: &[E], value: E) -> usize {
    let (Some(&first), Some(&last)) = (run.first(), run.last()) else {
        return 0;
    };
    if value <= first {
        return 0;
    }
    if value > last {
        return run.len();
    }

    let mut left = 0usize;
    let mut right = run.len() - 1;
    while left < right {
        let mid = left + (right - left) / 2;
        if value <= run[mid] {
            right = mid;
        } else {
            left = mid + 1;
        }
    }

    left
}

/// Linear-scan counterpart of [`binarysearch_idx_smallest_geq`]
pub fn linear_idx_smallest_geq<E: Ord + Copy>(run: &[E], value: E) -> usize {
    run.iter()
        .position(|&stored| stored >= value)
        .unwrap_or(run.len())
}
