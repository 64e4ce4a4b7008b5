//! Result formatter

use crate::filter::FilterOutcome;
use crate::modal::{self, ModalOperator};
use crate::observation::ObservationRecord;
use chronoscope_core::{Representation, ResourceIdentifier};

pub const CSV: &str = "text/csv";
pub const JSON: &str = "application/json";

/// One `timestamp, value, unit` line per record, sorted, newline separated,
/// no header and no trailing newline.
pub fn to_csv(records: &[ObservationRecord]) -> String {
    let mut sorted: Vec<&ObservationRecord> = records.iter().collect();
    sorted.sort();
    sorted
        .iter()
        .map(|r| r.to_csv_line())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inverse of [`to_csv`]. Lines that do not have three fields are skipped.
pub fn from_csv(body: &str) -> Vec<ObservationRecord> {
    body.lines().filter_map(ObservationRecord::from_csv_line).collect()
}

/// Build the response for `target`: a JSON boolean for modal queries, the
/// CSV dump otherwise.
pub fn render(
    target: &ResourceIdentifier,
    operator: Option<ModalOperator>,
    outcome: &FilterOutcome,
) -> Representation {
    match modal::evaluate(operator, outcome) {
        Some(answer) => Representation::text(target, answer.to_string(), JSON),
        None => Representation::text(target, to_csv(&outcome.records), CSV),
    }
}
