//! Subjects: the mobile agents of the model, their infection state machine and their motion.
//!
//! A subject's infection state is never stored. It is computed from the subject's
//! [`InfectionRecord`] and the current time, which makes the progression
//! `Uninfected → InfectedWithoutSymptoms → InfectedWithSymptoms → Recovered` monotonic by
//! construction.
use std::f64::consts::TAU;
use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

use crate::parameters::Parameters;
use crate::position::Position;
use crate::time::{whole_seconds, SimulationTime};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
)]
pub enum InfectionState {
    Uninfected,
    InfectedWithoutSymptoms,
    InfectedWithSymptoms,
    Recovered,
}

impl InfectionState {
    /// Position of the state in the fixed reporting order.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn is_contagious(self) -> bool {
        matches!(
            self,
            InfectionState::InfectedWithoutSymptoms | InfectionState::InfectedWithSymptoms
        )
    }
}

/// When an infected subject develops symptoms and when it recovers. Created once, at infection,
/// and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfectionRecord {
    pub symptom_onset_time: SimulationTime,
    pub recovery_time: SimulationTime,
}

impl InfectionRecord {
    pub fn new(infection_time: SimulationTime, parameters: &Parameters) -> Self {
        InfectionRecord {
            symptom_onset_time: infection_time + parameters.incubation_period(),
            recovery_time: infection_time + parameters.infection_to_recovery_period(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    position: Position,
    heading_radians: f64,
    cruising_speed_per_second: f64,
    infection: Option<InfectionRecord>,
}

impl Subject {
    /// Creates an uninfected subject at `position` with a random heading and cruising speed.
    pub fn new(position: Position, rng: &mut impl Rng, parameters: &Parameters) -> Self {
        let heading_radians = rng.random::<f64>() * TAU;
        let cruising_speed_per_second =
            parameters.cruising_speed_per_second * (1.2 - rng.random::<f64>() * 0.4);
        Subject {
            position,
            heading_radians,
            cruising_speed_per_second,
            infection: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading_radians(&self) -> f64 {
        self.heading_radians
    }

    /// The speed the subject was created with. Motion draws a fresh speed every tick instead.
    pub fn cruising_speed_per_second(&self) -> f64 {
        self.cruising_speed_per_second
    }

    pub fn infection(&self) -> Option<&InfectionRecord> {
        self.infection.as_ref()
    }

    pub fn infection_state(&self, now: SimulationTime) -> InfectionState {
        match self.infection {
            None => InfectionState::Uninfected,
            Some(record) if now < record.symptom_onset_time => {
                InfectionState::InfectedWithoutSymptoms
            }
            Some(record) if now < record.recovery_time => InfectionState::InfectedWithSymptoms,
            Some(_) => InfectionState::Recovered,
        }
    }

    pub fn is_contagious(&self, now: SimulationTime) -> bool {
        self.infection_state(now).is_contagious()
    }

    /// Infects the subject at `now` unless it has been infected before. Recovered subjects are
    /// immune and there is no reinfection, so once a record exists this does nothing. Returns
    /// whether a new infection started.
    pub fn maybe_infect(&mut self, now: SimulationTime, parameters: &Parameters) -> bool {
        if self.infection.is_some() {
            return false;
        }
        self.infection = Some(InfectionRecord::new(now, parameters));
        true
    }

    /// Moves the subject for one tick of length `dt`. Only whole seconds of `dt` count.
    ///
    /// The heading drifts by a uniform random amount proportional to `dt`, then the subject
    /// travels along it at a speed freshly drawn from `speed_distribution`. Each coordinate that
    /// leaves the unit square is wrapped back by one domain width.
    #[allow(clippy::cast_precision_loss)]
    pub fn update(
        &mut self,
        dt: Duration,
        rng: &mut impl Rng,
        speed_distribution: &Exp<f64>,
        parameters: &Parameters,
    ) {
        let dt_seconds = whole_seconds(dt) as f64;

        self.heading_radians +=
            (rng.random::<f64>() - 0.5) * parameters.angle_volatility_per_second * dt_seconds;

        let speed_per_second = speed_distribution.sample(rng)
            * parameters.speed_scale
            * parameters.cruising_speed_per_second;
        let displacement = Position::new(
            self.heading_radians.cos() * speed_per_second * dt_seconds,
            self.heading_radians.sin() * speed_per_second * dt_seconds,
        );
        self.position = (self.position + displacement).wrapped_once();
    }
}
