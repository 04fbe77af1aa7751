use crate::Real;
use std::iter::FromIterator;
use std::ops::AddAssign;

/// A running sum with Kahan compensation.
///
/// Each added term is corrected by the rounding error accumulated so far, so that the
/// error of the sum does not grow with the number of terms. The result is sensitive to the
/// order in which terms are added, which makes a serial sum over the same sequence of terms
/// reproducible bit for bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KahanSum<T> {
    sum: T,
    compensation: T,
}

impl<T: Real> Default for KahanSum<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Real> KahanSum<T> {
    pub fn zero() -> Self {
        Self {
            sum: T::zero(),
            compensation: T::zero(),
        }
    }

    pub fn add(&mut self, value: T) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// Merges two partial sums, e.g. sums computed over disjoint chunks on different threads.
    pub fn combine(mut self, other: Self) -> Self {
        self.add(other.sum);
        self.add(-other.compensation);
        self
    }

    pub fn value(&self) -> T {
        self.sum
    }

    /// The rounding error that has not yet been folded back into the sum.
    pub fn compensation(&self) -> T {
        self.compensation
    }
}

impl<T: Real> AddAssign<T> for KahanSum<T> {
    fn add_assign(&mut self, value: T) {
        self.add(value)
    }
}

impl<T: Real> Extend<T> for KahanSum<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Real> FromIterator<T> for KahanSum<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sum = Self::zero();
        sum.extend(iter);
        sum
    }
}

/// Sums the values in the order given, using Kahan compensation.
pub fn kahan_sum<T: Real>(values: impl IntoIterator<Item = T>) -> T {
    values.into_iter().collect::<KahanSum<T>>().value()
}
