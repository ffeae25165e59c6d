// Pack station controller - batch accumulation. Validated containers are
// moved to the pack location and collected until the standard pack quantity
// is reached, then the batch is recorded and labeled as one new unit.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::PackConfig;
use crate::mes::MesClient;
use crate::station::accumulator::{AccumulatorError, PackAccumulator};
use crate::station::context::WorkcenterContext;
use crate::station::log::{SessionLog, Severity};
use crate::station::types::{ContextStatus, ScanOutcome, ScanStatus, StationEvent};
use crate::station::validation::{self, Rejection};

/// One Pack station session: context, log, busy flag, and the accumulator
/// collecting validated serials toward the next pack.
pub struct PackStation<C: MesClient> {
    client: Arc<C>,
    config: PackConfig,
    context: WorkcenterContext,
    log: SessionLog,
    scan_status: ScanStatus,
    accumulator: PackAccumulator,
    packing: bool,
    events: Option<UnboundedSender<StationEvent>>,
}

impl<C: MesClient> PackStation<C> {
    pub fn new(client: Arc<C>, config: PackConfig) -> Self {
        let context = WorkcenterContext::new(config.workcenter_key.clone(), true);
        Self {
            client,
            config,
            context,
            log: SessionLog::new(),
            scan_status: ScanStatus::Idle,
            accumulator: PackAccumulator::new(0),
            packing: false,
            events: None,
        }
    }

    /// Attach a UI event channel. Events are best-effort; a dropped receiver
    /// never fails the workflow.
    pub fn with_events(mut self, events: UnboundedSender<StationEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn context(&self) -> &WorkcenterContext {
        &self.context
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn scan_status(&self) -> ScanStatus {
        self.scan_status
    }

    pub fn accumulator(&self) -> &PackAccumulator {
        &self.accumulator
    }

    /// True while a batch completion sequence is in flight.
    pub fn is_packing(&self) -> bool {
        self.packing
    }

    /// Reload the workcenter context and the standard pack quantity for the
    /// loaded part. Scanning stays disabled until the refresh succeeds.
    pub async fn refresh(&mut self) {
        self.set_scan_status(ScanStatus::Idle);
        self.emit(StationEvent::ContextStatus(ContextStatus::Loading));
        let result = self.context.refresh(self.client.as_ref()).await;
        self.emit(StationEvent::ContextStatus(self.context.status()));
        match result {
            Ok(()) => {
                if let Some(quantity) = self.context.standard_batch_quantity() {
                    self.accumulator.set_target_quantity(quantity);
                }
                self.set_scan_status(ScanStatus::Ready);
            }
            Err(err) => {
                self.log_entry(format!("Error: {err} ❌"), Some(Severity::Error));
            }
        }
    }

    /// Validate a scanned finished-goods serial, move it to the pack
    /// location, and add it to the pack list.
    pub async fn scan(&mut self, serial: &str) -> ScanOutcome {
        if self.scan_status != ScanStatus::Ready {
            return self.reject_busy();
        }
        self.set_scan_status(ScanStatus::Loading);
        if self.accumulator.is_empty() {
            // New accumulation cycle: the previous pack's log is done.
            self.clear_log();
        }

        let outcome = match self.process(serial).await {
            Ok(message) => {
                info!(serial, members = self.accumulator.len(), "scan accepted");
                ScanOutcome::Accepted { message }
            }
            Err(rejection) => {
                warn!(serial, reason = %rejection.reason, "scan rejected");
                if !rejection.logged {
                    self.log_entry(
                        format!("Error: {} ❌", rejection.reason),
                        Some(Severity::Error),
                    );
                }
                ScanOutcome::Rejected {
                    reason: rejection.reason,
                }
            }
        };

        self.set_scan_status(ScanStatus::Ready);
        outcome
    }

    async fn process(&mut self, serial: &str) -> Result<String, Rejection> {
        let expected_part = self
            .context
            .expected_part_number()
            .map(str::to_string)
            .ok_or_else(|| Rejection::new("Workcenter info is not loaded."))?;

        let lookup = self.client.lookup_container(serial).await?;
        validation::ensure_active(&lookup.record)?;
        validation::ensure_expected_part(&lookup.record, &expected_part)?;

        if lookup.record.operation != self.config.source_operation {
            return Err(Rejection::new(format!(
                "This container is not in {} operation. Current operation: {}",
                self.config.source_operation, lookup.record.operation
            )));
        }

        self.client
            .move_container(serial, &self.config.pack_destination)
            .await?;
        let message = format!("{serial} is packed ✔️");
        self.log_entry(message.clone(), Some(Severity::Success));

        match self.accumulator.add(serial) {
            Ok(()) => {
                self.emit_members();
                Ok(message)
            }
            Err(AccumulatorError::AtCapacity) => {
                // Soft ceiling: the container was still moved, the list just
                // refuses to grow past the standard pack quantity.
                debug!(serial, "pack list already at target, scan ignored");
                Ok(message)
            }
            Err(err @ AccumulatorError::Duplicate) => {
                let text = err.to_string();
                self.log_entry(text.clone(), Some(Severity::Error));
                Err(Rejection::already_logged(text))
            }
        }
    }

    /// Return a serial to the upstream operation and drop it from the pack
    /// list. The unit leaves the list even when the compensating move fails;
    /// it is immediately eligible for re-scan.
    pub async fn unload(&mut self, serial: &str) -> ScanOutcome {
        if self.scan_status != ScanStatus::Ready {
            return self.reject_busy();
        }
        self.set_scan_status(ScanStatus::Loading);

        let outcome = match self
            .client
            .move_container(serial, &self.config.return_destination)
            .await
        {
            Ok(_) => {
                let message = format!("Container {serial} is unloaded ✔️");
                self.log_entry(message.clone(), Some(Severity::Success));
                ScanOutcome::Accepted { message }
            }
            Err(err) => {
                warn!(serial, error = %err, "compensating move failed during unload");
                self.log_entry(format!("Error: {err} ❌"), Some(Severity::Error));
                ScanOutcome::Rejected {
                    reason: err.to_string(),
                }
            }
        };

        self.accumulator.remove(serial);
        self.emit_members();
        self.set_scan_status(ScanStatus::Ready);
        outcome
    }

    /// Record production for the accumulated batch, print the label for the
    /// new master unit, then clear the list and resync the context. Any
    /// failure before the clear leaves the members untouched so the operator
    /// can retry without re-scanning.
    pub async fn complete(&mut self) -> ScanOutcome {
        if self.scan_status != ScanStatus::Ready {
            return self.reject_busy();
        }
        if self.accumulator.is_empty() {
            let reason = "Pack list is empty.";
            self.log_entry(format!("Error: {reason} ❌"), Some(Severity::Error));
            return ScanOutcome::Rejected {
                reason: reason.to_string(),
            };
        }
        self.set_scan_status(ScanStatus::Loading);
        self.packing = true;

        let outcome = match self.run_complete().await {
            Ok(message) => {
                info!(quantity = self.accumulator.len(), "pack recorded");
                ScanOutcome::Accepted { message }
            }
            Err(rejection) => {
                warn!(reason = %rejection.reason, "pack failed, list preserved");
                if !rejection.logged {
                    self.log_entry(
                        format!("Error: {} ❌", rejection.reason),
                        Some(Severity::Error),
                    );
                }
                ScanOutcome::Rejected {
                    reason: rejection.reason,
                }
            }
        };

        self.packing = false;
        if outcome.is_accepted() {
            self.refresh().await;
            self.accumulator.clear();
            self.emit_members();
        } else {
            self.set_scan_status(ScanStatus::Ready);
        }
        outcome
    }

    async fn run_complete(&mut self) -> Result<String, Rejection> {
        self.log_entry("Recording production, please wait... ⏳", None);
        let report = self
            .client
            .record_production(&self.config.workcenter_key, self.accumulator.len() as u32)
            .await?;
        self.log_entry(report.message.clone(), None);

        let confirmation = self
            .client
            .print_label(&report.new_serial_number, &self.config.label_station)
            .await?;
        self.log_entry(confirmation.message.clone(), Some(Severity::Success));
        Ok(confirmation.message)
    }

    fn reject_busy(&mut self) -> ScanOutcome {
        debug!(status = ?self.scan_status, "command refused, station not ready");
        let reason = "Scanner is not ready.";
        self.log_entry(format!("Error: {reason} ❌"), Some(Severity::Error));
        ScanOutcome::Rejected {
            reason: reason.to_string(),
        }
    }

    fn clear_log(&mut self) {
        self.log.clear();
        self.emit(StationEvent::LogCleared);
    }

    fn log_entry(&mut self, text: impl Into<String>, severity: Option<Severity>) {
        let entry = self.log.record(text, severity).clone();
        self.emit(StationEvent::Log(entry));
    }

    fn set_scan_status(&mut self, status: ScanStatus) {
        self.scan_status = status;
        self.emit(StationEvent::ScanStatus(status));
    }

    fn emit_members(&self) {
        self.emit(StationEvent::Members(self.accumulator.members().to_vec()));
    }

    fn emit(&self, event: StationEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
