use super::{
    accountant::Accountant,
    budget::Budget,
    dp_event::{laplace_scale, DpEvent},
    Error, Result,
};
use rand::{distributions::Distribution, rngs::OsRng};
use statrs::distribution;

/// The Laplace mechanism.
///
/// Noise is drawn with the operating system's cryptographically secure generator,
/// so released values cannot be replayed from a seed.
/// Every release spends `(epsilon, delta)` from the mechanism's accountant;
/// once the accountant is exhausted, releases are `0`.
#[derive(Debug)]
pub struct Laplace {
    epsilon: f64,
    delta: f64,
    sensitivity: Option<f64>,
    accountant: Accountant,
}

impl Laplace {
    pub fn new(epsilon: f64, delta: f64, budget: Budget) -> Result<Self> {
        if !(epsilon.is_finite() && epsilon > 0.) {
            return Err(Error::invalid_parameters(format!("epsilon = {epsilon} must be positive")));
        }
        if !(0. ..1.).contains(&delta) {
            return Err(Error::invalid_parameters(format!("delta = {delta} must be in [0, 1)")));
        }
        Ok(Laplace {
            epsilon,
            delta,
            sensitivity: None,
            accountant: Accountant::new(budget),
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Set the sensitivity of the next releases
    pub fn configure(&mut self, sensitivity: u64) -> Result<()> {
        self.configure_f64(sensitivity as f64)
    }

    pub fn configure_f64(&mut self, sensitivity: f64) -> Result<()> {
        if sensitivity.is_finite() && sensitivity > 0. {
            self.sensitivity = Some(sensitivity);
            Ok(())
        } else {
            Err(Error::invalid_parameters(format!(
                "sensitivity = {sensitivity} must be positive"
            )))
        }
    }

    pub fn scale(&self) -> Result<f64> {
        let sensitivity = self.sensitivity.ok_or_else(|| {
            Error::invalid_parameters("the sensitivity must be configured before releasing")
        })?;
        Ok(laplace_scale(self.epsilon, self.delta, sensitivity))
    }

    /// Add noise to `value`, or `None` when there is no budget left
    fn release(&mut self, value: f64) -> Result<Option<f64>> {
        let scale = self.scale()?;
        let sensitivity = self.sensitivity.unwrap_or(1.);
        let cost = Budget::new(self.epsilon, self.delta);
        if !self.accountant.try_spend(cost, DpEvent::laplace(scale / sensitivity)) {
            return Ok(None);
        }
        let noise = distribution::Laplace::new(0., scale)?.sample(&mut OsRng);
        Ok(Some(value + noise))
    }

    /// Release a count: the noisy value is rounded up and never negative
    pub fn randomize(&mut self, value: u64) -> Result<u64> {
        Ok(self
            .release(value as f64)?
            .map_or(0, |noisy| noisy.ceil().max(0.) as u64))
    }

    /// Release a real value, `0` when there is no budget left
    pub fn randomize_f64(&mut self, value: f64) -> Result<f64> {
        Ok(self.release(value)?.unwrap_or(0.))
    }

    pub fn remaining_budget(&self) -> Budget {
        self.accountant.remaining()
    }

    pub fn is_exhausted(&self) -> bool {
        self.accountant.is_exhausted()
    }

    pub fn accountant(&self) -> &Accountant {
        &self.accountant
    }

    pub fn into_accountant(self) -> Accountant {
        self.accountant
    }
}
