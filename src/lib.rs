//! A spatial agent-based model of infection spread
//!
//! Contagion simulates a fixed population of mobile subjects wandering over the unit square,
//! whose opposite edges are joined so that it forms a torus. One subject starts out infected.
//! Whenever two subjects come within an interaction radius of each other there is a fixed chance
//! that a contagious one infects the other. Infected subjects progress through a fixed
//! incubation period, a symptomatic period, and then recover with permanent immunity.
//!
//! The pieces, from the bottom up:
//! * [`spatial_index::SpatialIndex`] buckets elements into a uniform toroidal grid and answers
//!   "what is near this point" from the surrounding 3×3 block of cells.
//! * [`subject::Subject`] holds a subject's position, heading and infection record. Its
//!   infection state is computed from the record and the current time, never stored.
//! * [`simulation::Simulation`] owns the population and the index and advances them tick by
//!   tick.
//! * [`report`] and [`runner`] turn a simulation into a headless program that periodically
//!   reports how many subjects are in each state.
//!
//! ```rust
//! use contagion::prelude::*;
//!
//! let parameters = Parameters { population: 500, ..Parameters::default() };
//! let mut simulation = Simulation::new(parameters).unwrap();
//! for _ in 0..24 {
//!     simulation.update(hours(1));
//! }
//! assert_eq!(simulation.infection_state_histogram().total(), 500);
//! ```
pub mod error;
pub mod log;
pub mod parameters;
pub mod position;
pub mod prelude;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod spatial_index;
pub mod subject;
pub mod time;

pub use error::ContagionError;
pub use parameters::Parameters;
pub use simulation::{InfectionStateHistogram, Simulation, SubjectId, SubjectSnapshot};

// Re-exports so models and tests can use the same versions
pub use rand;
pub use rand_distr;
