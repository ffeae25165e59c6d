// Shopfloor - scan validation and workflow state machine for manufacturing
// stations. This exposes the core components for testing and integration.

pub mod config;
pub mod mes;
pub mod station;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{EdgefoldConfig, MesConfig, ObservabilityConfig, PackConfig, ShopfloorConfig};
pub use mes::{
    Confirmation, ContainerLookup, ContainerRecord, HttpMesClient, MesClient, MesError,
    ProductionReport, WorkcenterInfo,
};
pub use station::{
    AccumulatorError, ContextStatus, EdgefoldStation, LogEntry, PackAccumulator, PackStation,
    ScanOutcome, ScanStatus, SessionLog, Severity, StationEvent, WorkcenterContext,
};
pub use telemetry::{generate_scan_id, init_telemetry, scan_span};
