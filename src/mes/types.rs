use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot of a container as known to the MES at lookup time.
///
/// Read-only from the workflow's point of view: the scan logic never writes
/// these fields back, it only moves the container or records production
/// against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub serial_number: String,
    pub part_number: String,
    /// Operation the container currently sits at (e.g. "Waterjet", "Assembly").
    pub operation: String,
    /// A quantity of 0 marks the container inactive.
    pub quantity: u32,
}

/// Result of a container lookup: the record plus the MES's own
/// human-readable confirmation line.
#[derive(Debug, Clone)]
pub struct ContainerLookup {
    pub record: ContainerRecord,
    pub message: String,
}

/// Confirmation message returned by a side-effecting MES operation
/// (container move, single-unit production record, label print).
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub message: String,
}

/// Result of recording batch production: the serial number the MES minted
/// for the new master unit, plus its confirmation line.
#[derive(Debug, Clone)]
pub struct ProductionReport {
    pub new_serial_number: String,
    pub message: String,
}

/// Workcenter configuration as loaded from the MES.
///
/// `part_number` is the field the scan workflow validates against; the rest
/// of the field map is kept verbatim for display by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkcenterInfo {
    pub part_number: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}
