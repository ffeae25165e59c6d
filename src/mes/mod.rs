pub mod client;
pub mod error;
pub mod mock;
pub mod types;

pub use client::{HttpMesClient, MesClient};
pub use error::MesError;
pub use types::{Confirmation, ContainerLookup, ContainerRecord, ProductionReport, WorkcenterInfo};
