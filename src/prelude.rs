pub use crate::error::ContagionError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::Parameters;
pub use crate::position::Position;
pub use crate::report::{CsvReport, JsonLinesReport, ReportSink, StatusReport};
pub use crate::simulation::{InfectionStateHistogram, Simulation, SubjectId, SubjectSnapshot};
pub use crate::spatial_index::SpatialIndex;
pub use crate::subject::{InfectionRecord, InfectionState, Subject};
pub use crate::time::{hours, SimulationTime};
