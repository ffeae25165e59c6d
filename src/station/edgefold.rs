// Edgefold station controller - single-unit processing. Each scan validates
// one substrate container and backflushes production for it; there is no
// accumulation step.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::EdgefoldConfig;
use crate::mes::MesClient;
use crate::station::context::WorkcenterContext;
use crate::station::log::{SessionLog, Severity};
use crate::station::types::{ContextStatus, ScanOutcome, ScanStatus, StationEvent};
use crate::station::validation::{self, Rejection};

/// One Edgefold station session. Created on station entry, dropped on
/// navigation away; owns all session state.
pub struct EdgefoldStation<C: MesClient> {
    client: Arc<C>,
    config: EdgefoldConfig,
    context: WorkcenterContext,
    log: SessionLog,
    scan_status: ScanStatus,
    events: Option<UnboundedSender<StationEvent>>,
}

impl<C: MesClient> EdgefoldStation<C> {
    pub fn new(client: Arc<C>, config: EdgefoldConfig) -> Self {
        let context = WorkcenterContext::new(config.workcenter_key.clone(), false);
        Self {
            client,
            config,
            context,
            log: SessionLog::new(),
            scan_status: ScanStatus::Idle,
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

    /// Reload the workcenter context. Scanning stays disabled until the
    /// refresh succeeds.
    pub async fn refresh(&mut self) {
        self.set_scan_status(ScanStatus::Idle);
        self.emit(StationEvent::ContextStatus(ContextStatus::Loading));
        let result = self.context.refresh(self.client.as_ref()).await;
        self.emit(StationEvent::ContextStatus(self.context.status()));
        match result {
            Ok(()) => self.set_scan_status(ScanStatus::Ready),
            Err(err) => {
                self.log_entry(format!("Error: {err} ❌"), Some(Severity::Error));
            }
        }
    }

    /// Validate a scanned substrate serial and record production for it.
    ///
    /// The check sequence short-circuits on the first failure; the commit
    /// step runs last, so a scan either fully succeeds or has no side
    /// effects beyond the log.
    pub async fn scan(&mut self, serial: &str) -> ScanOutcome {
        if self.scan_status != ScanStatus::Ready {
            return self.reject_busy();
        }
        self.set_scan_status(ScanStatus::Loading);
        self.clear_log();

        let outcome = match self.process(serial).await {
            Ok(message) => {
                info!(serial, "scan accepted");
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

        if outcome.is_accepted() {
            // Production changed the workcenter totals; resync. A failed
            // refresh leaves scanning disabled until the operator retries.
            self.refresh().await;
        } else {
            self.set_scan_status(ScanStatus::Ready);
        }
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
        self.log_entry(lookup.message.clone(), None);

        validation::ensure_expected_part(&lookup.record, &expected_part)?;
        self.log_entry("Substrate part number matched ✔️", None);

        if lookup.record.operation != self.config.ready_operation {
            if lookup.record.operation == self.config.completed_operation {
                return Err(Rejection::new(format!(
                    "Serial No {serial} was already edgefolded."
                )));
            }
            return Err(Rejection::new(format!(
                "Serial No {serial} is not ready for edgefolding."
            )));
        }

        self.log_entry("Recording production, please wait... ⏳", None);
        let confirmation = self
            .client
            .record_production_for_serial(&self.config.workcenter_key, serial)
            .await?;
        self.log_entry(confirmation.message.clone(), Some(Severity::Success));
        Ok(confirmation.message)
    }

    fn reject_busy(&mut self) -> ScanOutcome {
        debug!(status = ?self.scan_status, "scan refused, station not ready");
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

    fn emit(&self, event: StationEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
