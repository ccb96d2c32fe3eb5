//! The tropical semiring: `(non-negative reals ∪ {+∞}, min, +, +∞, 0)`.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::Add;

/// A weight in the tropical semiring. `⊕` is `min`, `⊗` is `+`.
#[derive(Clone, Copy, Debug)]
pub struct Weight(pub f64);

impl Weight {
    pub const ZERO: Weight = Weight(0.0);
    pub const INFINITY: Weight = Weight(f64::INFINITY);

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// `⊕`: the tropical "addition", i.e. the cheaper of the two paths.
    pub fn oplus(self, other: Weight) -> Weight {
        if self.0 <= other.0 { self } else { other }
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::INFINITY
    }
}

impl From<f64> for Weight {
    fn from(v: f64) -> Self {
        Weight(v)
    }
}

impl From<Weight> for f64 {
    fn from(w: Weight) -> Self {
        w.0
    }
}

/// `⊗`: the tropical "multiplication", i.e. cost accumulation along a path.
impl Add for Weight {
    type Output = Weight;
    fn add(self, rhs: Weight) -> Weight {
        Weight(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Weight {
    type Output = Weight;
    fn sub(self, rhs: Weight) -> Weight {
        Weight(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Weight {
    fn add_assign(&mut self, rhs: Weight) {
        self.0 += rhs.0;
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}
impl Eq for Weight {}

impl Hash for Weight {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}
