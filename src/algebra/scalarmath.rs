/// k-th triangular number
#[inline]
pub(crate) fn triangular_number(k: usize) -> usize {
    (k * (k + 1)) >> 1
}

/// 0-based offset of entry `(row, col)`, `col <= row`, in a lower
/// triangle packed row by row.  Row `r` starts at `triangular_number(r)`
/// and holds `r + 1` slots, the last of which is the diagonal.
#[inline]
pub(crate) fn triangular_index(row: usize, col: usize) -> usize {
    debug_assert!(col <= row);
    triangular_number(row) + col
}

#[test]
fn test_triangular_index() {
    assert_eq!(triangular_number(0), 0);
    assert_eq!(triangular_number(3), 6);
    assert_eq!(triangular_index(0, 0), 0);
    assert_eq!(triangular_index(1, 0), 1);
    assert_eq!(triangular_index(2, 0), 3);
    assert_eq!(triangular_index(2, 2), 5);
    assert_eq!(triangular_index(4, 3), 13);
}
