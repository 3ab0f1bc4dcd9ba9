use std::fmt;

/// Represent a simple privacy budget
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Budget {
    epsilon: f64,
    delta: f64,
}

impl Budget {
    pub fn new(epsilon: f64, delta: f64) -> Budget {
        Budget { epsilon, delta }
    }

    /// A budget that is never exhausted
    pub fn unbounded() -> Budget {
        Budget::new(f64::INFINITY, f64::INFINITY)
    }

    pub fn zero() -> Budget {
        Budget::new(0., 0.)
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn add(&self, other: &Budget) -> Budget {
        Budget::new(self.epsilon + other.epsilon, self.delta + other.delta)
    }

    /// What is left of `self` after `other` is spent, never negative
    pub fn saturating_sub(&self, other: &Budget) -> Budget {
        Budget::new(
            (self.epsilon - other.epsilon).max(0.),
            (self.delta - other.delta).max(0.),
        )
    }

    /// Whether `other` fits in `self`, up to rounding errors
    pub fn covers(&self, other: &Budget) -> bool {
        other.epsilon <= self.epsilon + TOLERANCE && other.delta <= self.delta + TOLERANCE
    }
}

/// Absorbs the rounding errors of repeated spending
pub const TOLERANCE: f64 = 1e-12;

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ε = {}, δ = {})", self.epsilon, self.delta)
    }
}
