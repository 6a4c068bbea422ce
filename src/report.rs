//! Periodic reports of the infection-state counts.
//!
//! A [`StatusReport`] is the histogram plus elapsed simulated hours. It serializes to the JSON
//! consumed by the front end:
//!
//! ```json
//! {"infectionStateHistogram":[{"state":"Uninfected","count":4999}, ...],"hoursElapsed":20}
//! ```
//!
//! Reports go to any number of [`ReportSink`]s: a CSV file with one row per report, or a stream
//! of JSON lines.
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use csv::Writer;
use serde::{Deserialize, Serialize};

use crate::error::ContagionError;
use crate::simulation::InfectionStateHistogram;
use crate::subject::InfectionState;
use crate::time::whole_hours;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramEntry {
    pub state: InfectionState,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// One entry per state, in the fixed state order.
    pub infection_state_histogram: Vec<HistogramEntry>,
    pub hours_elapsed: u64,
}

impl StatusReport {
    pub fn new(histogram: &InfectionStateHistogram, elapsed: Duration) -> Self {
        StatusReport {
            infection_state_histogram: histogram
                .iter()
                .map(|(state, count)| HistogramEntry { state, count })
                .collect(),
            hours_elapsed: whole_hours(elapsed),
        }
    }

    pub fn count(&self, state: InfectionState) -> usize {
        self.infection_state_histogram
            .iter()
            .find(|entry| entry.state == state)
            .map_or(0, |entry| entry.count)
    }

    pub fn to_json(&self) -> Result<String, ContagionError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramRow {
    pub tick: u64,
    pub hours_elapsed: u64,
    pub uninfected: usize,
    pub infected_without_symptoms: usize,
    pub infected_with_symptoms: usize,
    pub recovered: usize,
}

impl HistogramRow {
    pub fn new(tick: u64, report: &StatusReport) -> Self {
        HistogramRow {
            tick,
            hours_elapsed: report.hours_elapsed,
            uninfected: report.count(InfectionState::Uninfected),
            infected_without_symptoms: report.count(InfectionState::InfectedWithoutSymptoms),
            infected_with_symptoms: report.count(InfectionState::InfectedWithSymptoms),
            recovered: report.count(InfectionState::Recovered),
        }
    }
}

/// A destination for periodic reports.
pub trait ReportSink {
    /// Records the report taken after `tick` ticks.
    fn send_report(&mut self, tick: u64, report: &StatusReport) -> Result<(), ContagionError>;
}

/// Writes one [`HistogramRow`] per report to a CSV file.
pub struct CsvReport {
    writer: Writer<File>,
}

impl CsvReport {
    /// Creates the file at `path`, and any missing parent directories. The path must end in
    /// `.csv`.
    pub fn create(path: &Path) -> Result<CsvReport, ContagionError> {
        let file = generate_validate_filepath(path)?;
        Ok(CsvReport {
            writer: Writer::from_writer(file),
        })
    }
}

impl ReportSink for CsvReport {
    fn send_report(&mut self, tick: u64, report: &StatusReport) -> Result<(), ContagionError> {
        self.writer.serialize(HistogramRow::new(tick, report))?;
        self.writer.flush()?;
        Ok(())
    }
}

// Checks that the path is a CSV path and creates the file along with its parent directories.
fn generate_validate_filepath(path: &Path) -> Result<File, ContagionError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(ContagionError::ReportError(format!(
            "report output files must be CSVs, got {}",
            path.display()
        ))),
    }
}

/// Writes each report as one line of compact JSON.
pub struct JsonLinesReport<W> {
    writer: W,
}

impl<W: Write> JsonLinesReport<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesReport { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonLinesReport<W> {
    fn send_report(&mut self, _tick: u64, report: &StatusReport) -> Result<(), ContagionError> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
