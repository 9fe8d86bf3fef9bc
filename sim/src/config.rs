//! Run configuration

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters fixed for the lifetime of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub num_servers: usize,
    pub arrival_lambda: f64,   // mean arrivals per tick
    pub avg_service_time: f64, // mean service ticks
    pub duration: u64,         // ticks
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_servers: 2,
            arrival_lambda: 0.8,
            avg_service_time: 2.0,
            duration: 2000,
            seed: 42,
        }
    }
}

impl SimConfig {
    pub fn new(num_servers: usize, arrival_lambda: f64, avg_service_time: f64) -> Self {
        Self {
            num_servers,
            arrival_lambda,
            avg_service_time,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        validate_arrival_lambda(self.arrival_lambda)?;
        validate_service_time(self.avg_service_time)
    }

    /// Load and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Offered load per server: λ · E[S] / c
    pub fn traffic_intensity(&self) -> f64 {
        let offered = self.arrival_lambda * self.avg_service_time;
        if self.num_servers == 0 {
            return if offered > 0.0 { f64::INFINITY } else { 0.0 };
        }
        offered / self.num_servers as f64
    }

    /// Queueing theory predicts a bounded queue when ρ < 1
    pub fn is_stable(&self) -> bool {
        self.traffic_intensity() < 1.0
    }
}

pub(crate) fn validate_arrival_lambda(lambda: f64) -> Result<(), SimError> {
    if lambda.is_finite() && lambda >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidArrivalRate(lambda))
    }
}

pub(crate) fn validate_service_time(mean: f64) -> Result<(), SimError> {
    if mean.is_finite() && mean > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidServiceTime(mean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.traffic_intensity() - 0.8).abs() < 1e-12);
        assert!(config.is_stable());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            SimConfig::new(1, -0.1, 1.0).validate(),
            Err(SimError::InvalidArrivalRate(_))
        ));
        assert!(matches!(
            SimConfig::new(1, f64::NAN, 1.0).validate(),
            Err(SimError::InvalidArrivalRate(_))
        ));
        assert!(matches!(
            SimConfig::new(1, 0.5, 0.0).validate(),
            Err(SimError::InvalidServiceTime(_))
        ));
        assert!(matches!(
            SimConfig::new(1, 0.5, f64::INFINITY).validate(),
            Err(SimError::InvalidServiceTime(_))
        ));
    }

    #[test]
    fn test_zero_servers_is_valid() {
        let config = SimConfig::new(0, 0.5, 1.0);
        assert!(config.validate().is_ok());
        assert!(config.traffic_intensity().is_infinite());
        assert!(!config.is_stable());
        assert!(SimConfig::new(0, 0.0, 1.0).is_stable());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{"num_servers": 4, "seed": 9}"#).unwrap();
        assert_eq!(config.num_servers, 4);
        assert_eq!(config.seed, 9);
        assert_eq!(config.duration, 2000);
        assert_eq!(config.arrival_lambda, 0.8);
    }

    #[test]
    fn test_from_json_file_validates() {
        let path = std::env::temp_dir().join(format!("mmc-sim-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"avg_service_time": -2.0}"#).unwrap();
        let result = SimConfig::from_json_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(SimError::InvalidServiceTime(_))));
    }
}
