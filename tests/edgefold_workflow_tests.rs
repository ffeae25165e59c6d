//! Edgefold station workflow tests
//!
//! These tests drive the single-unit scan workflow against the scripted MES
//! mock and verify the check ordering, the idempotence guard, and that a
//! rejected scan has zero side effects beyond the session log.
//!
//! Test coverage:
//! - Scanning disabled until the workcenter context is loaded
//! - Inactive container (quantity 0) rejected regardless of other fields
//! - Part mismatch diagnostic names both expected and scanned values
//! - Distinct "already edgefolded" rejection vs the generic "not ready" one
//! - Commit step runs last; its failure reports the collaborator's message
//! - Accepted scan triggers a context refresh

use std::sync::Arc;

use shopfloor::mes::mock::{MesCall, MockMesClient};
use shopfloor::{
    ContainerRecord, EdgefoldConfig, EdgefoldStation, MesError, ScanOutcome, ScanStatus, Severity,
};

const WORKCENTER: &str = "74883";
const PART: &str = "PN-100";

fn container(serial: &str, part: &str, operation: &str, quantity: u32) -> ContainerRecord {
    ContainerRecord {
        serial_number: serial.to_string(),
        part_number: part.to_string(),
        operation: operation.to_string(),
        quantity,
    }
}

fn mes() -> Arc<MockMesClient> {
    let client = MockMesClient::new();
    client.set_workcenter(WORKCENTER, PART);
    Arc::new(client)
}

async fn ready_station(client: Arc<MockMesClient>) -> EdgefoldStation<MockMesClient> {
    let mut station = EdgefoldStation::new(client, EdgefoldConfig::default());
    station.refresh().await;
    assert_eq!(station.scan_status(), ScanStatus::Ready);
    station
}

fn reason(outcome: &ScanOutcome) -> &str {
    match outcome {
        ScanOutcome::Rejected { reason } => reason,
        ScanOutcome::Accepted { message } => panic!("expected rejection, got: {message}"),
    }
}

#[tokio::test]
async fn scanning_is_disabled_until_context_loads() {
    let client = mes();
    let mut station = EdgefoldStation::new(client.clone(), EdgefoldConfig::default());

    let outcome = station.scan("S100").await;

    assert!(!outcome.is_accepted());
    // The guard fires before any collaborator call.
    assert!(client.recorded_calls().is_empty());
    // Every outcome still gets its terminal log entry.
    assert_eq!(station.log().entries().len(), 1);
}

#[tokio::test]
async fn context_load_failure_keeps_scanning_disabled() {
    let client = mes();
    client.fail_workcenter_info(MesError::Network("connection refused".to_string()));
    let mut station = EdgefoldStation::new(client, EdgefoldConfig::default());

    station.refresh().await;

    assert_eq!(station.scan_status(), ScanStatus::Idle);
    assert_eq!(station.log().severity(), Some(Severity::Error));
}

#[tokio::test]
async fn inactive_container_is_rejected() {
    let client = mes();
    client.insert_container(container("S100", PART, "Waterjet", 0));
    let mut station = ready_station(client.clone()).await;

    let outcome = station.scan("S100").await;

    assert_eq!(reason(&outcome), "Container is inactive.");
    let calls = client.recorded_calls();
    assert!(!calls
        .iter()
        .any(|c| matches!(c, MesCall::RecordSerial { .. })));
}

#[tokio::test]
async fn lookup_failure_propagates_the_lookup_message() {
    let client = mes();
    client.set_lookup_error("S100", MesError::Network("MES timed out".to_string()));
    let mut station = ready_station(client).await;

    let outcome = station.scan("S100").await;

    assert!(reason(&outcome).contains("MES timed out"));
}

#[tokio::test]
async fn part_mismatch_names_expected_and_scanned() {
    let client = mes();
    client.insert_container(container("S100", "PN-200", "Waterjet", 5));
    let mut station = ready_station(client.clone()).await;

    let outcome = station.scan("S100").await;

    let reason = reason(&outcome).to_string();
    assert!(reason.contains("PN-100"));
    assert!(reason.contains("PN-200"));
    assert!(!client
        .recorded_calls()
        .iter()
        .any(|c| matches!(c, MesCall::RecordSerial { .. })));
}

#[tokio::test]
async fn already_edgefolded_gets_the_distinct_rejection() {
    let client = mes();
    client.insert_container(container("S100", PART, "Edgefold", 5));
    let mut station = ready_station(client).await;

    let outcome = station.scan("S100").await;

    assert!(reason(&outcome).contains("already edgefolded"));
}

#[tokio::test]
async fn other_operations_get_the_generic_not_ready_rejection() {
    let client = mes();
    client.insert_container(container("S100", PART, "Assembly", 5));
    let mut station = ready_station(client).await;

    let outcome = station.scan("S100").await;

    let reason = reason(&outcome);
    assert!(reason.contains("not ready for edgefolding"));
    assert!(!reason.contains("already"));
}

#[tokio::test]
async fn waterjet_container_is_accepted_and_production_recorded() {
    let client = mes();
    client.insert_container(container("S100", PART, "Waterjet", 5));
    let mut station = ready_station(client.clone()).await;

    let outcome = station.scan("S100").await;

    assert!(outcome.is_accepted());
    assert!(client.recorded_calls().contains(&MesCall::RecordSerial {
        workcenter_key: WORKCENTER.to_string(),
        serial: "S100".to_string(),
    }));
    assert_eq!(station.log().severity(), Some(Severity::Success));
    assert_eq!(station.scan_status(), ScanStatus::Ready);
}

#[tokio::test]
async fn accepted_scan_resyncs_the_workcenter_context() {
    let client = mes();
    client.insert_container(container("S100", PART, "Waterjet", 5));
    let mut station = ready_station(client.clone()).await;

    station.scan("S100").await;

    let info_loads = client
        .recorded_calls()
        .iter()
        .filter(|c| matches!(c, MesCall::WorkcenterInfo { .. }))
        .count();
    // Initial load plus the post-scan resync.
    assert_eq!(info_loads, 2);
}

#[tokio::test]
async fn commit_failure_is_rejected_with_collaborator_message() {
    let client = mes();
    client.insert_container(container("S100", PART, "Waterjet", 5));
    client.fail_record_serial(MesError::Api {
        status: 500,
        message: "backflush failed".to_string(),
    });
    let mut station = ready_station(client).await;

    let outcome = station.scan("S100").await;

    assert!(reason(&outcome).contains("backflush failed"));
    assert_eq!(station.log().severity(), Some(Severity::Error));
    // The operator can scan again right away.
    assert_eq!(station.scan_status(), ScanStatus::Ready);
}

#[tokio::test]
async fn log_is_cleared_before_each_scan() {
    let client = mes();
    client.insert_container(container("S100", PART, "Edgefold", 5));
    client.insert_container(container("S200", PART, "Waterjet", 0));
    let mut station = ready_station(client).await;

    station.scan("S100").await;
    let first_len = station.log().entries().len();
    assert!(first_len >= 1);

    station.scan("S200").await;
    // Only the second scan's entries remain.
    let texts: Vec<_> = station
        .log()
        .entries()
        .iter()
        .map(|e| e.text.as_str())
        .collect();
    assert!(texts.iter().all(|t| !t.contains("already edgefolded")));
    assert!(texts.iter().any(|t| t.contains("Container is inactive.")));
}

#[tokio::test]
async fn refresh_failure_after_accept_disables_scanning() {
    let client = mes();
    client.insert_container(container("S100", PART, "Waterjet", 5));
    let mut station = ready_station(client.clone()).await;
    client.fail_workcenter_info(MesError::Network("gateway down".to_string()));

    let outcome = station.scan("S100").await;

    // The production event committed, so the scan itself is accepted...
    assert!(outcome.is_accepted());
    // ...but the stale context blocks further scans until a manual refresh.
    assert_eq!(station.scan_status(), ScanStatus::Idle);

    client.clear_workcenter_info_failure();
    station.refresh().await;
    assert_eq!(station.scan_status(), ScanStatus::Ready);
}
