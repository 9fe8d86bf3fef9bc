//! Units of work flowing through the queue

use rand::Rng;
use rand_distr::{Distribution, Exp};

/// Task identifier, assigned in arrival order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

/// Simulated task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    creation_time: u64,   // tick of arrival
    processing_time: u32, // ticks of service, never zero
}

impl Task {
    /// Build a task with a known service time. Zero is raised to one tick.
    pub fn new(id: TaskId, creation_time: u64, processing_time: u32) -> Self {
        Self {
            id,
            creation_time,
            processing_time: processing_time.max(1),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn creation_time(&self) -> u64 {
        self.creation_time
    }

    pub fn processing_time(&self) -> u32 {
        self.processing_time
    }
}

/// Draw a service time in whole ticks: `max(1, round(x))`
pub fn sample_processing_time<R: Rng + ?Sized>(service: &Exp<f64>, rng: &mut R) -> u32 {
    ticks_from_sample(service.sample(rng))
}

/// Round a continuous sample to ticks. Float-to-int casts saturate, NaN maps to 0.
pub fn ticks_from_sample(x: f64) -> u32 {
    (x.round() as u32).max(1)
}
