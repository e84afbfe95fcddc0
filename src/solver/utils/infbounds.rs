use crate::solver::utils::atomic::{AtomicF64, Ordering};
use crate::solver::_INFINITY_DEFAULT;
use crate::algebra::*;
use lazy_static::lazy_static;
//
lazy_static! {
    static ref INFINITY: AtomicF64 = AtomicF64::new(_INFINITY_DEFAULT);
}

/// Revert internal infinity bound to its default value.
pub fn default_infinity() {
    INFINITY.store(_INFINITY_DEFAULT, Ordering::Relaxed);
}
/// Set the internal infinity bound to a new value.
///
/// Constraint bounds at or beyond this magnitude are treated as absent
/// when a problem is set up.
pub fn set_infinity(v: f64) {
    INFINITY.store(v, Ordering::Relaxed);
}
/// Get the current internal infinity bound.
pub fn get_infinity() -> f64 {
    INFINITY.load(Ordering::Relaxed)
}

/// True if a lower bound is at or beyond the infinity bound
pub(crate) fn lower_is_absent<T: FloatT>(b: T) -> bool {
    b <= -AsFloatT::<T>::as_T(&get_infinity())
}

/// True if an upper bound is at or beyond the infinity bound
pub(crate) fn upper_is_absent<T: FloatT>(b: T) -> bool {
    b >= AsFloatT::<T>::as_T(&get_infinity())
}

#[test]
fn test_absent_bounds() {
    // default infinity bound
    assert!(lower_is_absent(-1e20));
    assert!(lower_is_absent(f64::NEG_INFINITY));
    assert!(!lower_is_absent(-1e19));
    assert!(upper_is_absent(1e21_f32));
    assert!(!upper_is_absent(0.0));
}
