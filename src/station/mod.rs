// Station workflow core - one session object per physical station, owning
// the workcenter context, session log, busy flag, and (for Pack) the
// accumulator. Everything else is an external collaborator behind MesClient.

pub mod accumulator;
pub mod context;
pub mod edgefold;
pub mod log;
pub mod pack;
pub mod types;
pub(crate) mod validation;

pub use accumulator::{AccumulatorError, PackAccumulator};
pub use context::WorkcenterContext;
pub use edgefold::EdgefoldStation;
pub use log::{LogEntry, SessionLog, Severity};
pub use pack::PackStation;
pub use types::{ContextStatus, ScanOutcome, ScanStatus, StationEvent};
