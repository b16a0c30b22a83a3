//! Run extraction and grid helpers

/// Longest run of consecutive integers in `items`
///
/// Input order does not matter and duplicates are ignored. When two runs
/// tie, the one found first in ascending order wins.
pub fn find_longest_sequence(items: &[usize]) -> Vec<usize> {
    let mut sorted = items.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let Some(&first) = sorted.first() else {
        return Vec::new();
    };

    let (mut best_start, mut best_len) = (first, 1);
    let (mut run_start, mut run_len) = (first, 1);

    for pair in sorted.windows(2) {
        if pair[1] == pair[0] + 1 {
            run_len += 1;
        } else {
            run_start = pair[1];
            run_len = 1;
        }
        if run_len > best_len {
            best_start = run_start;
            best_len = run_len;
        }
    }

    (best_start..best_start + best_len).collect()
}

/// Swap rows and columns of a rectangular matrix
///
/// The column count comes from the first row. Input is expected to be
/// rectangular.
pub fn transpose<T: Clone>(matrix: &[Vec<T>]) -> Vec<Vec<T>> {
    let Some(width) = matrix.first().map(Vec::len) else {
        return Vec::new();
    };
    (0..width)
        .map(|col| {
            matrix
                .iter()
                .filter_map(|row| row.get(col).cloned())
                .collect()
        })
        .collect()
}
