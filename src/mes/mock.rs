// Scripted MES mock for tests - no network, no side effects outside the
// struct. Responses are staged up front, every call is recorded.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::mes::client::MesClient;
use crate::mes::error::MesError;
use crate::mes::types::{
    Confirmation, ContainerLookup, ContainerRecord, ProductionReport, WorkcenterInfo,
};

/// One recorded call against the mock, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MesCall {
    Lookup {
        serial: String,
    },
    Move {
        serial: String,
        destination: String,
    },
    RecordBatch {
        workcenter_key: String,
        quantity: u32,
    },
    RecordSerial {
        workcenter_key: String,
        serial: String,
    },
    PrintLabel {
        serial: String,
        station_label: String,
    },
    WorkcenterInfo {
        workcenter_key: String,
    },
    StandardPackQuantity {
        part_number: String,
    },
}

/// Scripted `MesClient` for workflow tests.
///
/// `Mutex` rather than `RefCell` because the trait is async and `Send`.
#[derive(Debug, Default)]
pub struct MockMesClient {
    containers: Mutex<HashMap<String, ContainerRecord>>,
    lookup_errors: Mutex<HashMap<String, MesError>>,
    workcenters: Mutex<HashMap<String, WorkcenterInfo>>,
    pack_quantities: Mutex<HashMap<String, u32>>,
    move_error: Mutex<Option<MesError>>,
    record_batch_error: Mutex<Option<MesError>>,
    record_serial_error: Mutex<Option<MesError>>,
    print_error: Mutex<Option<MesError>>,
    info_error: Mutex<Option<MesError>>,
    next_serial: Mutex<String>,
    calls: Mutex<Vec<MesCall>>,
}

impl MockMesClient {
    pub fn new() -> Self {
        Self {
            next_serial: Mutex::new("FG0001".to_string()),
            ..Default::default()
        }
    }

    pub fn insert_container(&self, record: ContainerRecord) {
        self.containers
            .lock()
            .unwrap()
            .insert(record.serial_number.clone(), record);
    }

    pub fn set_lookup_error(&self, serial: &str, error: MesError) {
        self.lookup_errors
            .lock()
            .unwrap()
            .insert(serial.to_string(), error);
    }

    pub fn set_workcenter(&self, workcenter_key: &str, part_number: &str) {
        self.workcenters.lock().unwrap().insert(
            workcenter_key.to_string(),
            WorkcenterInfo {
                part_number: part_number.to_string(),
                fields: [(
                    "Part Number".to_string(),
                    serde_json::Value::String(part_number.to_string()),
                )]
                .into_iter()
                .collect(),
            },
        );
    }

    pub fn set_pack_quantity(&self, part_number: &str, quantity: u32) {
        self.pack_quantities
            .lock()
            .unwrap()
            .insert(part_number.to_string(), quantity);
    }

    pub fn set_next_serial(&self, serial: &str) {
        *self.next_serial.lock().unwrap() = serial.to_string();
    }

    pub fn fail_moves(&self, error: MesError) {
        *self.move_error.lock().unwrap() = Some(error);
    }

    pub fn fail_record_batch(&self, error: MesError) {
        *self.record_batch_error.lock().unwrap() = Some(error);
    }

    pub fn clear_record_batch_failure(&self) {
        *self.record_batch_error.lock().unwrap() = None;
    }

    pub fn fail_record_serial(&self, error: MesError) {
        *self.record_serial_error.lock().unwrap() = Some(error);
    }

    pub fn fail_print(&self, error: MesError) {
        *self.print_error.lock().unwrap() = Some(error);
    }

    pub fn fail_workcenter_info(&self, error: MesError) {
        *self.info_error.lock().unwrap() = Some(error);
    }

    pub fn clear_workcenter_info_failure(&self) {
        *self.info_error.lock().unwrap() = None;
    }

    pub fn recorded_calls(&self) -> Vec<MesCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: MesCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MesClient for MockMesClient {
    async fn lookup_container(&self, serial: &str) -> Result<ContainerLookup, MesError> {
        self.record(MesCall::Lookup {
            serial: serial.to_string(),
        });
        if let Some(error) = self.lookup_errors.lock().unwrap().get(serial) {
            return Err(error.clone());
        }
        let record = self
            .containers
            .lock()
            .unwrap()
            .get(serial)
            .cloned()
            .ok_or_else(|| MesError::NotFound(format!("container {serial}")))?;
        Ok(ContainerLookup {
            message: format!("Container {serial} located"),
            record,
        })
    }

    async fn move_container(
        &self,
        serial: &str,
        destination: &str,
    ) -> Result<Confirmation, MesError> {
        self.record(MesCall::Move {
            serial: serial.to_string(),
            destination: destination.to_string(),
        });
        if let Some(error) = self.move_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(Confirmation {
            message: format!("Container {serial} moved to {destination}"),
        })
    }

    async fn record_production(
        &self,
        workcenter_key: &str,
        quantity: u32,
    ) -> Result<ProductionReport, MesError> {
        self.record(MesCall::RecordBatch {
            workcenter_key: workcenter_key.to_string(),
            quantity,
        });
        if let Some(error) = self.record_batch_error.lock().unwrap().clone() {
            return Err(error);
        }
        let new_serial = self.next_serial.lock().unwrap().clone();
        Ok(ProductionReport {
            message: format!("Recorded production of {quantity} at {workcenter_key}"),
            new_serial_number: new_serial,
        })
    }

    async fn record_production_for_serial(
        &self,
        workcenter_key: &str,
        serial: &str,
    ) -> Result<Confirmation, MesError> {
        self.record(MesCall::RecordSerial {
            workcenter_key: workcenter_key.to_string(),
            serial: serial.to_string(),
        });
        if let Some(error) = self.record_serial_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(Confirmation {
            message: format!("Recorded production for {serial} at {workcenter_key}"),
        })
    }

    async fn print_label(
        &self,
        serial: &str,
        station_label: &str,
    ) -> Result<Confirmation, MesError> {
        self.record(MesCall::PrintLabel {
            serial: serial.to_string(),
            station_label: station_label.to_string(),
        });
        if let Some(error) = self.print_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(Confirmation {
            message: format!("Label for {serial} sent to {station_label}"),
        })
    }

    async fn workcenter_info(&self, workcenter_key: &str) -> Result<WorkcenterInfo, MesError> {
        self.record(MesCall::WorkcenterInfo {
            workcenter_key: workcenter_key.to_string(),
        });
        if let Some(error) = self.info_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.workcenters
            .lock()
            .unwrap()
            .get(workcenter_key)
            .cloned()
            .ok_or_else(|| MesError::NotFound(format!("workcenter {workcenter_key}")))
    }

    async fn standard_pack_quantity(&self, part_number: &str) -> Result<u32, MesError> {
        self.record(MesCall::StandardPackQuantity {
            part_number: part_number.to_string(),
        });
        self.pack_quantities
            .lock()
            .unwrap()
            .get(part_number)
            .copied()
            .ok_or_else(|| MesError::NotFound(format!("part {part_number}")))
    }

    fn server_identity(&self) -> String {
        "mock-mes".to_string()
    }
}
