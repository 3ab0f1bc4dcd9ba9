/// An object inspired by Google's
/// [DPEvent](https://github.com/google/differential-privacy/blob/main/python/dp_accounting/dp_event.py)
/// to represent the releases made by a mechanism
#[derive(Clone, Debug, PartialEq)]
pub enum DpEvent {
    /// Represents application of an operation with no privacy impact.
    NoOp,
    /// Represents an application of the Laplace mechanism.
    ///
    /// For a value v and noise z sampled from the Laplace distribution L(0, s),
    /// this mechanism returns v + z.
    /// If the value has sensitivity C, the noise_multiplier is defined as s / C.
    Laplace { noise_multiplier: f64 },
    /// Represents application of a series of composed mechanisms.
    Composed { events: Vec<DpEvent> },
}

impl DpEvent {
    pub fn no_op() -> Self {
        Self::NoOp
    }

    pub fn laplace(noise_multiplier: f64) -> Self {
        Self::Laplace { noise_multiplier }
    }

    pub fn compose(self, other: Self) -> Self {
        if other.is_no_op() {
            self
        } else if self.is_no_op() {
            other
        } else {
            let (v1, v2) = match (self, other) {
                (DpEvent::Composed { events: v1 }, DpEvent::Composed { events: v2 }) => (v1, v2),
                (DpEvent::Composed { events: v }, other) => (v, vec![other]),
                (current, DpEvent::Composed { events: v }) => (vec![current], v),
                (current, other) => (vec![current], vec![other]),
            };
            DpEvent::Composed {
                events: v1.into_iter().chain(v2).collect(),
            }
        }
    }

    pub fn is_no_op(&self) -> bool {
        match self {
            DpEvent::NoOp => true,
            DpEvent::Laplace { noise_multiplier } => noise_multiplier == &0.0,
            DpEvent::Composed { events } => events.iter().all(|q| q.is_no_op()),
        }
    }

    /// The number of releases in the event
    pub fn len(&self) -> usize {
        match self {
            DpEvent::Composed { events } => events.iter().map(DpEvent::len).sum(),
            event if event.is_no_op() => 0,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The scale of the Laplace noise for an (epsilon, delta) release of a value
/// with the given sensitivity.
/// A positive delta relaxes epsilon to `epsilon - ln(1 - delta)`.
pub fn laplace_scale(epsilon: f64, delta: f64, sensitivity: f64) -> f64 {
    sensitivity / (epsilon - (1. - delta).ln())
}
