//! Arrival and service-time sources
//!
//! The engine never touches a global RNG. Every random draw goes through a
//! [`Workload`], so a seeded or scripted source makes a run reproducible.

use crate::config::{validate_arrival_lambda, validate_service_time};
use crate::error::SimError;
use crate::task::sample_processing_time;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Poisson};
use std::collections::{BTreeMap, VecDeque};

/// Source of arrivals and service times
pub trait Workload {
    /// Number of tasks arriving at `tick`
    fn arrivals(&mut self, tick: u64) -> u64;

    /// Service ticks for the next task created at `tick` (at least 1)
    fn processing_time(&mut self, tick: u64) -> u32;
}

/// Exponential service distribution with the given mean
pub fn service_distribution(avg_service_time: f64) -> Result<Exp<f64>, SimError> {
    validate_service_time(avg_service_time)?;
    Exp::new(1.0 / avg_service_time).map_err(|_| SimError::InvalidServiceTime(avg_service_time))
}

/// Poisson arrivals per tick, exponential service times
pub struct PoissonWorkload<R = StdRng> {
    arrivals: Option<Poisson<f64>>, // None when λ = 0
    service: Exp<f64>,
    rng: R,
}

impl PoissonWorkload<StdRng> {
    pub fn seeded(arrival_lambda: f64, avg_service_time: f64, seed: u64) -> Result<Self, SimError> {
        Self::with_rng(arrival_lambda, avg_service_time, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PoissonWorkload<R> {
    pub fn with_rng(
        arrival_lambda: f64,
        avg_service_time: f64,
        rng: R,
    ) -> Result<Self, SimError> {
        validate_arrival_lambda(arrival_lambda)?;
        let arrivals = if arrival_lambda > 0.0 {
            let poisson = Poisson::new(arrival_lambda)
                .map_err(|_| SimError::InvalidArrivalRate(arrival_lambda))?;
            Some(poisson)
        } else {
            None
        };

        Ok(Self {
            arrivals,
            service: service_distribution(avg_service_time)?,
            rng,
        })
    }
}

impl<R: Rng> Workload for PoissonWorkload<R> {
    fn arrivals(&mut self, _tick: u64) -> u64 {
        match &self.arrivals {
            Some(poisson) => {
                let count: f64 = poisson.sample(&mut self.rng);
                count as u64
            }
            None => 0,
        }
    }

    fn processing_time(&mut self, _tick: u64) -> u32 {
        sample_processing_time(&self.service, &mut self.rng)
    }
}

/// Fixed arrival schedule of `(tick, processing_time)` pairs
#[derive(Debug, Default, Clone)]
pub struct ScriptedWorkload {
    schedule: BTreeMap<u64, Vec<u32>>,
    pending: VecDeque<u32>,
}

impl ScriptedWorkload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule one arrival. Multiple arrivals on a tick keep insertion order.
    pub fn arrive(mut self, tick: u64, processing_time: u32) -> Self {
        self.schedule.entry(tick).or_default().push(processing_time);
        self
    }
}

impl Workload for ScriptedWorkload {
    fn arrivals(&mut self, tick: u64) -> u64 {
        let batch = self.schedule.remove(&tick).unwrap_or_default();
        let count = batch.len() as u64;
        self.pending.extend(batch);
        count
    }

    fn processing_time(&mut self, _tick: u64) -> u32 {
        self.pending.pop_front().unwrap_or(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_lambda_never_arrives() {
        let mut workload = PoissonWorkload::seeded(0.0, 2.0, 1).unwrap();
        assert!((0..1000).all(|t| workload.arrivals(t) == 0));
    }

    #[test]
    fn test_poisson_mean() {
        let mut workload = PoissonWorkload::seeded(0.8, 2.0, 3).unwrap();
        let n = 50_000u64;
        let total: u64 = (0..n).map(|t| workload.arrivals(t)).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 0.8).abs() < 0.03, "mean {mean}");
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = PoissonWorkload::seeded(1.5, 3.0, 99).unwrap();
        let mut b = PoissonWorkload::seeded(1.5, 3.0, 99).unwrap();
        for t in 0..500 {
            assert_eq!(a.arrivals(t), b.arrivals(t));
            assert_eq!(a.processing_time(t), b.processing_time(t));
        }
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(
            PoissonWorkload::seeded(-1.0, 2.0, 0),
            Err(SimError::InvalidArrivalRate(_))
        ));
        assert!(matches!(
            PoissonWorkload::seeded(1.0, 0.0, 0),
            Err(SimError::InvalidServiceTime(_))
        ));
        assert!(service_distribution(-3.0).is_err());
    }

    #[test]
    fn test_scripted_schedule() {
        let mut workload = ScriptedWorkload::new().arrive(0, 3).arrive(2, 5).arrive(2, 0);
        assert_eq!(workload.arrivals(0), 1);
        assert_eq!(workload.processing_time(0), 3);
        assert_eq!(workload.arrivals(1), 0);
        assert_eq!(workload.arrivals(2), 2);
        assert_eq!(workload.processing_time(2), 5);
        assert_eq!(workload.processing_time(2), 1);
        assert_eq!(workload.arrivals(3), 0);
    }
}
