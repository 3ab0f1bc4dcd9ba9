use super::{budget::Budget, dp_event::DpEvent};
use std::mem;

/// Tracks the privacy budget spent by the releases of one request.
///
/// An accountant starts with budget and becomes exhausted the first time a release does not fit;
/// it never goes back.
#[derive(Clone, Debug, PartialEq)]
pub struct Accountant {
    total: Budget,
    spent: Budget,
    exhausted: bool,
    dp_event: DpEvent,
}

impl Accountant {
    pub fn new(total: Budget) -> Self {
        Accountant {
            total,
            spent: Budget::zero(),
            exhausted: false,
            dp_event: DpEvent::no_op(),
        }
    }

    pub fn total(&self) -> Budget {
        self.total
    }

    pub fn spent(&self) -> Budget {
        self.spent
    }

    pub fn remaining(&self) -> Budget {
        self.total.saturating_sub(&self.spent)
    }

    /// The releases accounted for so far
    pub fn dp_event(&self) -> &DpEvent {
        &self.dp_event
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted || self.remaining().epsilon() <= super::budget::TOLERANCE
    }

    /// Spend `cost` on `event` if it fits in the remaining budget
    pub fn try_spend(&mut self, cost: Budget, event: DpEvent) -> bool {
        if !self.is_exhausted() && self.remaining().covers(&cost) {
            self.spent = self.spent.add(&cost);
            self.dp_event = mem::replace(&mut self.dp_event, DpEvent::NoOp).compose(event);
            true
        } else {
            if !self.exhausted {
                log::warn!(
                    "Privacy budget exhausted: {} spent out of {}, releasing zeros",
                    self.spent,
                    self.total
                );
            }
            self.exhausted = true;
            false
        }
    }
}

impl Default for Accountant {
    fn default() -> Self {
        Accountant::new(Budget::unbounded())
    }
}
