use super::{budget::Budget, mechanisms::Laplace, Error, Result};

/// The parameters of the private releases, fixed for the lifetime of the process
#[derive(Clone, Debug, PartialEq)]
pub struct DpParameters {
    /// Spent by each release
    epsilon: f64,
    delta: f64,
    /// Total budget of one request
    budget: Budget,
}

impl DpParameters {
    pub fn new(epsilon: f64, delta: f64, budget: Budget) -> DpParameters {
        DpParameters { epsilon, delta, budget }
    }

    /// Parameters with an unbounded budget per request
    pub fn from_epsilon_delta(epsilon: f64, delta: f64) -> DpParameters {
        DpParameters::new(epsilon, delta, Budget::unbounded())
    }

    pub fn with_budget(self, budget: Budget) -> DpParameters {
        DpParameters { budget, ..self }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.) {
            Err(Error::invalid_parameters(format!("epsilon = {} must be positive", self.epsilon)))
        } else if !(0. ..1.).contains(&self.delta) {
            Err(Error::invalid_parameters(format!("delta = {} must be in [0, 1)", self.delta)))
        } else if self.budget.epsilon().is_nan()
            || self.budget.delta().is_nan()
            || self.budget.epsilon() < 0.
            || self.budget.delta() < 0.
        {
            Err(Error::invalid_parameters(format!("budget {} must be non-negative", self.budget)))
        } else {
            Ok(())
        }
    }

    /// A fresh mechanism with its own accountant; build one per request
    pub fn laplace(&self) -> Result<Laplace> {
        Laplace::new(self.epsilon, self.delta, self.budget)
    }
}
