// AtomicF64 stored through its bit pattern in an AtomicU64

pub(crate) use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicU64;

#[derive(Debug, Default)]
pub(crate) struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(v: f64) -> Self {
        Self {
            bits: AtomicU64::new(v.to_bits()),
        }
    }

    pub fn store(&self, v: f64, order: Ordering) {
        self.bits.store(v.to_bits(), order);
    }

    pub fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.bits.load(order))
    }
}

#[test]
fn test_atomic_f64() {
    let a = AtomicF64::new(1e20);
    assert_eq!(a.load(Ordering::Relaxed), 1e20);
    a.store(-2.5, Ordering::Relaxed);
    assert_eq!(a.load(Ordering::Relaxed), -2.5);
}
