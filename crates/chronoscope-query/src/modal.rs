//! Modal operators: existential and universal aggregates over a filtered set.

use crate::filter::FilterOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalOperator {
    /// At least one observation satisfies the value predicate.
    Diamond,
    /// Every observation that passed the structural and interval filters
    /// also satisfies the value predicate.
    Box,
}

impl ModalOperator {
    /// `None` for anything other than `diamond` or `box`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "diamond" => Some(Self::Diamond),
            "box" => Some(Self::Box),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diamond => "diamond",
            Self::Box => "box",
        }
    }

    pub fn holds(self, outcome: &FilterOutcome) -> bool {
        match self {
            Self::Diamond => !outcome.records.is_empty(),
            Self::Box => outcome.records.len() == outcome.original_value_count,
        }
    }
}

/// Boolean answer for modal queries; `None` means the records themselves are
/// the answer.
pub fn evaluate(operator: Option<ModalOperator>, outcome: &FilterOutcome) -> Option<bool> {
    operator.map(|op| op.holds(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::ObservationRecord;

    fn outcome(kept: usize, before_value_filter: usize) -> FilterOutcome {
        let records = (0..kept)
            .map(|i| ObservationRecord::new(format!("2024-01-0{}T00:00:00Z", i + 1), "1", None))
            .collect();
        FilterOutcome {
            records,
            original_value_count: before_value_filter,
        }
    }

    #[test]
    fn parse_operator() {
        assert_eq!(ModalOperator::parse("diamond"), Some(ModalOperator::Diamond));
        assert_eq!(ModalOperator::parse("box"), Some(ModalOperator::Box));
        assert_eq!(ModalOperator::parse("Box"), None);
        assert_eq!(ModalOperator::parse(""), None);
    }

    #[test]
    fn diamond_is_existential() {
        assert!(ModalOperator::Diamond.holds(&outcome(1, 3)));
        assert!(!ModalOperator::Diamond.holds(&outcome(0, 3)));
    }

    #[test]
    fn box_is_universal() {
        assert!(ModalOperator::Box.holds(&outcome(3, 3)));
        assert!(!ModalOperator::Box.holds(&outcome(2, 3)));
    }

    #[test]
    fn empty_set_box_vacuous_diamond_false() {
        let empty = outcome(0, 0);
        assert!(ModalOperator::Box.holds(&empty));
        assert!(!ModalOperator::Diamond.holds(&empty));
    }

    #[test]
    fn no_operator_means_raw_dump() {
        assert_eq!(evaluate(None, &outcome(2, 2)), None);
        assert_eq!(evaluate(Some(ModalOperator::Box), &outcome(2, 2)), Some(true));
    }
}
