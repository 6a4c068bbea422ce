//! The simulation engine: a fixed population of subjects moving on the unit torus, a spatial
//! index over their positions, and the tick loop that moves them and spreads infection.
//!
//! A tick processes subjects one at a time, in population order. Each subject is taken out of the
//! index, moved, put back at its new position, and then tested against everything the index
//! returns near that position. Subjects later in the order have not moved yet when an earlier
//! subject looks for contacts, and earlier ones already have. This interleaving is part of the
//! model's behavior: batching all moves before all contacts produces different dynamics.
use std::ops::Index;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp;
use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};

use crate::error::ContagionError;
use crate::log::{debug, info, trace};
use crate::parameters::Parameters;
use crate::position::Position;
use crate::report::StatusReport;
use crate::spatial_index::SpatialIndex;
use crate::subject::{InfectionState, Subject};
use crate::time::SimulationTime;

/// A stable handle to a subject: its index in the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubjectId(pub usize);

/// Number of subjects in each infection state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfectionStateHistogram {
    counts: [usize; InfectionState::COUNT],
}

impl InfectionStateHistogram {
    pub fn count(&self, state: InfectionState) -> usize {
        self.counts[state.ordinal()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Counts in the fixed state order.
    pub fn iter(&self) -> impl Iterator<Item = (InfectionState, usize)> + '_ {
        InfectionState::iter().map(|state| (state, self.count(state)))
    }

    fn increment(&mut self, state: InfectionState) {
        self.counts[state.ordinal()] += 1;
    }
}

impl Index<InfectionState> for InfectionStateHistogram {
    type Output = usize;

    fn index(&self, state: InfectionState) -> &usize {
        &self.counts[state.ordinal()]
    }
}

impl FromIterator<InfectionState> for InfectionStateHistogram {
    fn from_iter<I: IntoIterator<Item = InfectionState>>(states: I) -> Self {
        let mut histogram = InfectionStateHistogram::default();
        for state in states {
            histogram.increment(state);
        }
        histogram
    }
}

/// What a renderer needs to draw one subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSnapshot {
    pub position: Position,
    pub infection_state: InfectionState,
}

pub struct Simulation<R = SmallRng> {
    parameters: Parameters,
    subjects: Vec<Subject>,
    spatial_index: SpatialIndex<SubjectId>,
    start_time: SimulationTime,
    current_time: SimulationTime,
    rng: R,
    speed_distribution: Exp<f64>,
    // Reused between neighbor queries.
    neighbors: Vec<SubjectId>,
}

impl Simulation<SmallRng> {
    /// Creates a simulation whose random numbers come from a `SmallRng` seeded with
    /// `parameters.seed`.
    pub fn new(parameters: Parameters) -> Result<Self, ContagionError> {
        let rng = SmallRng::seed_from_u64(parameters.seed);
        Simulation::with_rng(parameters, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Creates a simulation that draws all of its random numbers from `rng`, in a fixed order, so
    /// the same generator state always gives the same run.
    ///
    /// Subjects are placed uniformly at random and registered in the spatial index, and the
    /// first subject is infected at the start time.
    pub fn with_rng(parameters: Parameters, rng: R) -> Result<Self, ContagionError> {
        parameters.validate()?;
        let speed_distribution = Exp::new(parameters.speed_rate)
            .map_err(|e| ContagionError::InvalidParameter(format!("speed_rate: {e}")))?;

        let spatial_index = SpatialIndex::new(parameters.cell_size());
        let mut simulation = Simulation {
            subjects: Vec::with_capacity(parameters.population),
            spatial_index,
            start_time: SimulationTime::ZERO,
            current_time: SimulationTime::ZERO,
            rng,
            speed_distribution,
            neighbors: Vec::new(),
            parameters,
        };
        simulation.populate();
        Ok(simulation)
    }

    fn populate(&mut self) {
        info!(
            "initializing {} subjects, cell size {:.5}, {}x{} grid",
            self.parameters.population,
            self.spatial_index.cell_size(),
            self.spatial_index.resolution(),
            self.spatial_index.resolution()
        );
        for id in 0..self.parameters.population {
            let position = Position::new(self.rng.random(), self.rng.random());
            let subject = Subject::new(position, &mut self.rng, &self.parameters);
            self.subjects.push(subject);
            self.spatial_index.add(SubjectId(id), position);
        }

        let now = self.current_time;
        self.subjects[0].maybe_infect(now, &self.parameters);
        debug!("seeded infection in {:?} at {}", SubjectId(0), now);
    }

    /// Advances the clock by `dt`, then moves each subject in turn and lets it meet its
    /// neighbors.
    pub fn update(&mut self, dt: Duration) {
        self.current_time += dt;
        trace!("tick to {}", self.current_time);

        let mut neighbors = std::mem::take(&mut self.neighbors);
        for index in 0..self.subjects.len() {
            let id = SubjectId(index);

            let old_position = self.subjects[index].position();
            self.spatial_index.remove(id, old_position);
            self.subjects[index].update(
                dt,
                &mut self.rng,
                &self.speed_distribution,
                &self.parameters,
            );
            let new_position = self.subjects[index].position();
            self.spatial_index.add(id, new_position);

            self.spatial_index.neighbors_into(new_position, &mut neighbors);
            for &neighbor in &neighbors {
                self.maybe_pairwise_infect(id, neighbor);
            }
        }
        self.neighbors = neighbors;
    }

    /// Tests one contact between `a` and `b`. If they are closer than the interaction radius,
    /// one random draw decides whether the contact transmits; if it does, each contagious side
    /// infects the other.
    ///
    /// # Panics
    ///
    /// Panics if either handle is not in the population.
    pub fn maybe_pairwise_infect(&mut self, a: SubjectId, b: SubjectId) {
        let radius = self.parameters.interaction_radius;
        let distance_squared = self.subjects[a.0]
            .position()
            .squared_distance(self.subjects[b.0].position());
        if distance_squared >= radius * radius {
            return;
        }
        if self.rng.random::<f64>() > self.parameters.transmission_probability {
            return;
        }

        let now = self.current_time;
        let a_contagious = self.subjects[a.0].is_contagious(now);
        let b_contagious = self.subjects[b.0].is_contagious(now);
        if a_contagious && self.subjects[b.0].maybe_infect(now, &self.parameters) {
            debug!("{a:?} infected {b:?} at {now}");
        }
        if b_contagious && self.subjects[a.0].maybe_infect(now, &self.parameters) {
            debug!("{b:?} infected {a:?} at {now}");
        }
    }

    /// Counts subjects by their infection state at the current time.
    pub fn infection_state_histogram(&self) -> InfectionStateHistogram {
        let now = self.current_time;
        self.subjects
            .iter()
            .map(|subject| subject.infection_state(now))
            .collect()
    }

    pub fn elapsed_simulation_time(&self) -> Duration {
        self.current_time - self.start_time
    }

    /// The histogram and elapsed time in the shape consumed by reporting.
    pub fn status_report(&self) -> StatusReport {
        StatusReport::new(
            &self.infection_state_histogram(),
            self.elapsed_simulation_time(),
        )
    }

    /// Positions and current infection states, in population order.
    pub fn snapshot(&self) -> Vec<SubjectSnapshot> {
        let now = self.current_time;
        self.subjects
            .iter()
            .map(|subject| SubjectSnapshot {
                position: subject.position(),
                infection_state: subject.infection_state(now),
            })
            .collect()
    }

    /// Checks that every subject is in exactly one cell of the spatial index, the one for its
    /// current position.
    pub fn check_index_consistency(&self) -> Result<(), ContagionError> {
        if self.spatial_index.len() != self.subjects.len() {
            return Err(format!(
                "spatial index holds {} entries for {} subjects",
                self.spatial_index.len(),
                self.subjects.len()
            )
            .into());
        }
        for (index, subject) in self.subjects.iter().enumerate() {
            if !self.spatial_index.contains(SubjectId(index), subject.position()) {
                return Err(format!(
                    "{:?} is not indexed at its position {}",
                    SubjectId(index),
                    subject.position()
                )
                .into());
            }
        }
        Ok(())
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// # Panics
    ///
    /// Panics if `id` is not in the population.
    pub fn subject(&self, id: SubjectId) -> &Subject {
        &self.subjects[id.0]
    }

    pub fn population(&self) -> usize {
        self.subjects.len()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn spatial_index(&self) -> &SpatialIndex<SubjectId> {
        &self.spatial_index
    }

    pub fn start_time(&self) -> SimulationTime {
        self.start_time
    }

    pub fn current_time(&self) -> SimulationTime {
        self.current_time
    }
}
