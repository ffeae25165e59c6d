// Shared scan checks, ordered cheapest/most-general first so a bad scan
// fails fast with the most specific operator diagnostic. Station-specific
// operation-state checks live in the station controllers.

use crate::mes::{ContainerRecord, MesError};

/// Operator-facing rejection of a scan. Becomes a `ScanOutcome::Rejected`
/// and exactly one terminal log entry at the controller boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rejection {
    pub reason: String,
    /// Set when the rejection already wrote its own log entry (the duplicate
    /// pack-list message keeps the original wording, without the error
    /// prefix).
    pub logged: bool,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            logged: false,
        }
    }

    pub fn already_logged(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            logged: true,
        }
    }
}

impl From<MesError> for Rejection {
    fn from(err: MesError) -> Self {
        Rejection::new(err.to_string())
    }
}

/// A quantity of 0 marks the container inactive; nothing else about the
/// record matters in that case.
pub(crate) fn ensure_active(record: &ContainerRecord) -> Result<(), Rejection> {
    if record.quantity == 0 {
        return Err(Rejection::new("Container is inactive."));
    }
    Ok(())
}

/// The scanned part must match the workcenter setup. The diagnostic names
/// both values so the operator can tell a mis-scan from a misconfigured
/// workcenter.
pub(crate) fn ensure_expected_part(
    record: &ContainerRecord,
    expected: &str,
) -> Result<(), Rejection> {
    if record.part_number != expected {
        return Err(Rejection::new(format!(
            "Scanned part number does not match, please check workcenter configuration. \
             Expected: {expected}, Scanned: {}",
            record.part_number
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(part: &str, quantity: u32) -> ContainerRecord {
        ContainerRecord {
            serial_number: "S100".to_string(),
            part_number: part.to_string(),
            operation: "Assembly".to_string(),
            quantity,
        }
    }

    #[test]
    fn zero_quantity_is_inactive_regardless_of_part() {
        let err = ensure_active(&record("PN-100", 0)).unwrap_err();
        assert_eq!(err.reason, "Container is inactive.");
        assert!(ensure_active(&record("PN-999", 1)).is_ok());
    }

    #[test]
    fn part_mismatch_names_both_values() {
        let err = ensure_expected_part(&record("PN-200", 5), "PN-100").unwrap_err();
        assert!(err.reason.contains("PN-100"));
        assert!(err.reason.contains("PN-200"));
    }
}
