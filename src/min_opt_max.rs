//! # MinOptMax
//!
//! An elastic length: a minimum, an optimum and a maximum, all in
//! millipoints. Spaces between blocks and leader lengths are expressed this
//! way so the layout can stretch or shrink them.
//!
//! `min <= opt <= max` is expected but never enforced. Subtraction is the
//! interval difference, so the widest possible result is kept:
//! `(a - b).min == a.min - b.max` and `(a - b).max == a.max - b.min`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinOptMax {
    pub min: i32,
    pub opt: i32,
    pub max: i32,
}

impl MinOptMax {
    pub const ZERO: MinOptMax = MinOptMax { min: 0, opt: 0, max: 0 };

    pub fn new(min: i32, opt: i32, max: i32) -> Self {
        Self { min, opt, max }
    }

    /// A rigid length: all three components equal.
    pub fn fixed(value: i32) -> Self {
        Self::new(value, value, value)
    }

    pub fn add(a: MinOptMax, b: MinOptMax) -> MinOptMax {
        MinOptMax::new(a.min + b.min, a.opt + b.opt, a.max + b.max)
    }

    pub fn subtract(a: MinOptMax, b: MinOptMax) -> MinOptMax {
        MinOptMax::new(a.min - b.max, a.opt - b.opt, a.max - b.min)
    }

    /// Scales each component, truncating toward zero.
    pub fn multiply(a: MinOptMax, factor: f64) -> MinOptMax {
        MinOptMax::new(
            (a.min as f64 * factor) as i32,
            (a.opt as f64 * factor) as i32,
            (a.max as f64 * factor) as i32,
        )
    }

    pub fn add_assign(&mut self, other: MinOptMax) {
        *self = MinOptMax::add(*self, other);
    }

    pub fn subtract_assign(&mut self, other: MinOptMax) {
        *self = MinOptMax::subtract(*self, other);
    }

    /// Stretch available beyond the optimum.
    pub fn stretch(&self) -> i32 {
        self.max - self.opt
    }

    /// Shrink available below the optimum.
    pub fn shrink(&self) -> i32 {
        self.opt - self.min
    }

    pub fn is_elastic(&self) -> bool {
        self.min != self.opt || self.opt != self.max
    }
}

impl Add for MinOptMax {
    type Output = MinOptMax;
    fn add(self, rhs: MinOptMax) -> MinOptMax {
        MinOptMax::add(self, rhs)
    }
}

impl Sub for MinOptMax {
    type Output = MinOptMax;
    fn sub(self, rhs: MinOptMax) -> MinOptMax {
        MinOptMax::subtract(self, rhs)
    }
}

impl Mul<f64> for MinOptMax {
    type Output = MinOptMax;
    fn mul(self, rhs: f64) -> MinOptMax {
        MinOptMax::multiply(self, rhs)
    }
}

impl From<i32> for MinOptMax {
    fn from(value: i32) -> Self {
        MinOptMax::fixed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sums_each_component() {
        let a = MinOptMax::new(1, 2, 3);
        let b = MinOptMax::new(10, 20, 30);
        let r = a + b;
        assert_eq!(r, MinOptMax::new(11, 22, 33));
        assert_eq!(r.opt, a.opt + b.opt);
    }

    #[test]
    fn subtract_is_interval_difference() {
        let a = MinOptMax::new(10, 20, 30);
        let b = MinOptMax::new(1, 2, 5);
        let r = MinOptMax::subtract(a, b);
        assert_eq!(r.min, a.min - b.max);
        assert_eq!(r.opt, a.opt - b.opt);
        assert_eq!(r.max, a.max - b.min);
        assert_eq!(r, a - b);
    }

    #[test]
    fn multiply_truncates() {
        let r = MinOptMax::new(3, 5, 7) * 1.5;
        assert_eq!(r, MinOptMax::new(4, 7, 10));
    }

    #[test]
    fn ordering_is_not_enforced() {
        let inverted = MinOptMax::new(5, 0, -5);
        assert_eq!(inverted.stretch(), -5);
        assert!(inverted.is_elastic());
    }

    #[test]
    fn assign_variants_match_operators() {
        let mut m = MinOptMax::fixed(100);
        m.add_assign(MinOptMax::new(0, 10, 20));
        assert_eq!(m, MinOptMax::new(100, 110, 120));
        m.subtract_assign(MinOptMax::new(0, 10, 20));
        assert_eq!(m, MinOptMax::new(80, 100, 120));
    }
}
