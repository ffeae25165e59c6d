use thiserror::Error;

/// Misuse signals from the accumulator. Consumed by the Pack controller,
/// never surfaced as station failures: a duplicate becomes an operator
/// message, a full list makes `add` a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulatorError {
    #[error("This serial number is already in the pack list.")]
    Duplicate,
    #[error("pack list is already at the standard pack quantity")]
    AtCapacity,
}

/// Validated serials accumulated toward one shipment-ready pack.
///
/// Membership is insertion-ordered with no duplicates and never exceeds the
/// target quantity. The capacity ceiling is soft: the controller stops
/// accepting scans at target, and `add` refuses to exceed it regardless.
#[derive(Debug, Default)]
pub struct PackAccumulator {
    members: Vec<String>,
    target_quantity: u32,
}

impl PackAccumulator {
    pub fn new(target_quantity: u32) -> Self {
        Self {
            members: Vec::new(),
            target_quantity,
        }
    }

    /// Update the target after a context refresh resolves a new standard
    /// pack quantity.
    pub fn set_target_quantity(&mut self, target_quantity: u32) {
        self.target_quantity = target_quantity;
    }

    pub fn target_quantity(&self) -> u32 {
        self.target_quantity
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() as u32 >= self.target_quantity
    }

    pub fn contains(&self, serial: &str) -> bool {
        self.members.iter().any(|s| s == serial)
    }

    /// Append a validated serial. Duplicates are rejected before the
    /// capacity check.
    pub fn add(&mut self, serial: impl Into<String>) -> Result<(), AccumulatorError> {
        let serial = serial.into();
        if self.contains(&serial) {
            return Err(AccumulatorError::Duplicate);
        }
        if self.is_full() {
            return Err(AccumulatorError::AtCapacity);
        }
        self.members.push(serial);
        Ok(())
    }

    /// Remove a serial after its compensating move. No-op if absent.
    /// Returns whether the serial was present.
    pub fn remove(&mut self, serial: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|s| s != serial);
        self.members.len() != before
    }

    /// Drop all members after a completed batch.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_to_target_then_ignores() {
        let mut acc = PackAccumulator::new(2);

        assert_eq!(acc.add("A"), Ok(()));
        assert_eq!(acc.members(), ["A"]);

        assert_eq!(acc.add("A"), Err(AccumulatorError::Duplicate));
        assert_eq!(acc.members(), ["A"]);

        assert_eq!(acc.add("B"), Ok(()));
        assert_eq!(acc.members(), ["A", "B"]);

        assert_eq!(acc.add("C"), Err(AccumulatorError::AtCapacity));
        assert_eq!(acc.members(), ["A", "B"]);

        acc.clear();
        assert!(acc.is_empty());
    }

    #[test]
    fn duplicate_is_reported_before_capacity() {
        let mut acc = PackAccumulator::new(1);
        acc.add("A").unwrap();
        // "A" again at a full list: the duplicate wins.
        assert_eq!(acc.add("A"), Err(AccumulatorError::Duplicate));
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let mut acc = PackAccumulator::new(3);
        acc.add("A").unwrap();
        assert!(acc.remove("A"));
        assert!(!acc.remove("A"));
        assert!(acc.is_empty());
    }

    #[test]
    fn removed_serial_can_be_added_again() {
        let mut acc = PackAccumulator::new(2);
        acc.add("A").unwrap();
        acc.remove("A");
        assert_eq!(acc.add("A"), Ok(()));
    }

    #[test]
    fn zero_target_accepts_nothing() {
        let mut acc = PackAccumulator::new(0);
        assert_eq!(acc.add("A"), Err(AccumulatorError::AtCapacity));
        assert!(acc.is_empty());
    }
}
