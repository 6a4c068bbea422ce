//! Model parameters. Every constant of the model lives here so a run can be configured from a
//! JSON file; the defaults reproduce the reference outbreak of 5000 subjects.
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ContagionError;
use crate::time::days_as_whole_hours;

/// Upper bound on the time from infection to recovery, about a million years. Longer periods
/// would overflow simulated timestamps.
pub const MAX_INFECTION_DAYS: f64 = 365.0e6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Number of subjects.
    pub population: usize,
    /// Maximum distance at which one subject can infect another.
    pub interaction_radius: f64,
    /// Probability that a contact within the interaction radius transmits.
    pub transmission_probability: f64,
    /// Days from infection to symptom onset.
    pub days_to_symptoms: f64,
    /// Days from symptom onset to recovery.
    pub days_symptoms_to_recovery: f64,
    /// Scale of the random change in heading, in radians per second.
    pub angle_volatility_per_second: f64,
    /// Base speed, in domain widths per second.
    pub cruising_speed_per_second: f64,
    /// Rate of the exponential distribution speeds are drawn from each tick.
    pub speed_rate: f64,
    /// Multiplier applied to the exponential draw and the base speed.
    pub speed_scale: f64,
    /// Base seed for the simulation's random number generator.
    pub seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            population: 5000,
            interaction_radius: 0.005,
            transmission_probability: 0.02,
            days_to_symptoms: 14.0,
            days_symptoms_to_recovery: 10.0,
            angle_volatility_per_second: 1e-3,
            cruising_speed_per_second: 3e-7,
            speed_rate: 2.0,
            speed_scale: 5.0,
            seed: 0,
        }
    }
}

impl Parameters {
    /// Reads and validates parameters from a JSON file. Fields missing from the file take their
    /// default values.
    pub fn from_json_file(path: &Path) -> Result<Parameters, ContagionError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Parameters, ContagionError> {
        let parameters: Parameters = serde_json::from_str(json)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Checks that the parameters describe a runnable model.
    pub fn validate(&self) -> Result<(), ContagionError> {
        if self.population == 0 {
            return Err(invalid("population must be at least 1"));
        }
        if !(self.interaction_radius > 0.0 && self.interaction_radius <= 1.0) {
            return Err(invalid(format!(
                "interaction_radius must be in (0, 1], got {}",
                self.interaction_radius
            )));
        }
        if !(0.0..=1.0).contains(&self.transmission_probability) {
            return Err(invalid(format!(
                "transmission_probability must be in [0, 1], got {}",
                self.transmission_probability
            )));
        }
        for (name, value) in [
            ("days_to_symptoms", self.days_to_symptoms),
            ("days_symptoms_to_recovery", self.days_symptoms_to_recovery),
            ("angle_volatility_per_second", self.angle_volatility_per_second),
            ("cruising_speed_per_second", self.cruising_speed_per_second),
            ("speed_scale", self.speed_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        let infection_days = self.days_to_symptoms + self.days_symptoms_to_recovery;
        if infection_days > MAX_INFECTION_DAYS {
            return Err(invalid(format!(
                "days_to_symptoms + days_symptoms_to_recovery must be at most \
                 {MAX_INFECTION_DAYS}, got {infection_days}"
            )));
        }
        if !self.speed_rate.is_finite() || self.speed_rate <= 0.0 {
            return Err(invalid(format!(
                "speed_rate must be finite and positive, got {}",
                self.speed_rate
            )));
        }
        Ok(())
    }

    /// Time from infection to symptom onset, truncated to whole hours.
    pub fn incubation_period(&self) -> Duration {
        days_as_whole_hours(self.days_to_symptoms)
    }

    /// Time from infection to recovery. The two periods are summed before truncating to whole
    /// hours.
    pub fn infection_to_recovery_period(&self) -> Duration {
        days_as_whole_hours(self.days_to_symptoms + self.days_symptoms_to_recovery)
    }

    /// Side of a spatial index cell: about one subject per cell, but never smaller than the
    /// interaction radius, or contacts could fall outside a 3×3 neighborhood.
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_size(&self) -> f64 {
        let recommended = 1.0 / (self.population as f64).sqrt();
        recommended.max(self.interaction_radius)
    }
}

fn invalid(message: impl Into<String>) -> ContagionError {
    ContagionError::InvalidParameter(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::hours;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let parameters = Parameters::default();
        assert!(parameters.validate().is_ok());
        assert_eq!(parameters.incubation_period(), hours(14 * 24));
        assert_eq!(parameters.infection_to_recovery_period(), hours(24 * 24));
    }

    #[test]
    fn recovery_truncates_the_sum() {
        let parameters = Parameters {
            days_to_symptoms: 0.02,
            days_symptoms_to_recovery: 0.03,
            ..Parameters::default()
        };
        // 0.48h and 0.72h each truncate to zero, but together they make 1.2h.
        assert_eq!(parameters.incubation_period(), hours(0));
        assert_eq!(parameters.infection_to_recovery_period(), hours(1));
    }

    #[test]
    fn cell_size_never_below_radius() {
        let parameters = Parameters::default();
        assert_relative_eq!(parameters.cell_size(), 1.0 / 5000f64.sqrt());

        let crowded = Parameters {
            population: 1_000_000,
            ..Parameters::default()
        };
        assert_relative_eq!(crowded.cell_size(), 0.005);

        let single = Parameters {
            population: 1,
            ..Parameters::default()
        };
        assert_relative_eq!(single.cell_size(), 1.0);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let parameters =
            Parameters::from_json_str(r#"{"population": 100, "seed": 7}"#).unwrap();
        assert_eq!(parameters.population, 100);
        assert_eq!(parameters.seed, 7);
        assert_relative_eq!(parameters.transmission_probability, 0.02);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Parameters::from_json_str(r#"{"populaton": 100}"#);
        assert!(matches!(result, Err(ContagionError::JsonError(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{"population": 0}"#,
            r#"{"interaction_radius": 0.0}"#,
            r#"{"interaction_radius": 1.5}"#,
            r#"{"transmission_probability": 1.1}"#,
            r#"{"days_to_symptoms": -1.0}"#,
            r#"{"speed_rate": 0.0}"#,
            r#"{"days_to_symptoms": 1e16}"#,
            r#"{"days_to_symptoms": 2e8, "days_symptoms_to_recovery": 2e8}"#,
        ] {
            let result = Parameters::from_json_str(json);
            assert!(
                matches!(result, Err(ContagionError::InvalidParameter(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn longest_periods_are_representable() {
        let parameters = Parameters {
            days_to_symptoms: MAX_INFECTION_DAYS / 2.0,
            days_symptoms_to_recovery: MAX_INFECTION_DAYS / 2.0,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_ok());
        assert_eq!(
            parameters.infection_to_recovery_period(),
            hours(365_000_000 * 24)
        );
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"population": 42, "interaction_radius": 0.01}}"#).unwrap();
        let parameters = Parameters::from_json_file(file.path()).unwrap();
        assert_eq!(parameters.population, 42);
        assert_relative_eq!(parameters.interaction_radius, 0.01);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Parameters::from_json_file(Path::new("/nonexistent/parameters.json"));
        assert!(matches!(result, Err(ContagionError::IoError(_))));
    }
}
