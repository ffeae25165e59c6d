// MES collaborator seam - the workflow core only ever talks to the trait,
// the HTTP implementation is swapped out for a scripted mock in tests.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::mes::error::MesError;
use crate::mes::types::{
    Confirmation, ContainerLookup, ContainerRecord, ProductionReport, WorkcenterInfo,
};

/// Remote production system operations consumed by the station workflows.
///
/// Each call suspends at the network boundary and is atomic from the
/// workflow's perspective: it either returns a confirmation or an error, and
/// the workflow never interleaves two in-flight calls for one station.
#[async_trait]
pub trait MesClient: Send + Sync {
    /// Fetch the current snapshot of a container by serial number.
    async fn lookup_container(&self, serial: &str) -> Result<ContainerLookup, MesError>;

    /// Move a container to another operation/location.
    async fn move_container(
        &self,
        serial: &str,
        destination: &str,
    ) -> Result<Confirmation, MesError>;

    /// Record batch production against a workcenter; the MES mints a new
    /// serial number for the resulting master unit.
    async fn record_production(
        &self,
        workcenter_key: &str,
        quantity: u32,
    ) -> Result<ProductionReport, MesError>;

    /// Record single-unit production (backflush) for an existing serial.
    async fn record_production_for_serial(
        &self,
        workcenter_key: &str,
        serial: &str,
    ) -> Result<Confirmation, MesError>;

    /// Print a label for a serial at the named station printer.
    async fn print_label(&self, serial: &str, station_label: &str)
        -> Result<Confirmation, MesError>;

    /// Fetch workcenter configuration (expected part number plus raw fields).
    async fn workcenter_info(&self, workcenter_key: &str) -> Result<WorkcenterInfo, MesError>;

    /// Standard pack quantity configured for a part number.
    async fn standard_pack_quantity(&self, part_number: &str) -> Result<u32, MesError>;

    /// Which MES instance this client talks to. Display only.
    fn server_identity(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct ContainerBody {
    serial_no: String,
    part_no: String,
    operation: String,
    quantity: u32,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ProductionBody {
    new_serial_no: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct QuantityBody {
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// REST client for the MES gateway.
#[derive(Debug, Clone)]
pub struct HttpMesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpMesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MesError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    /// Turn a non-success response into a `MesError`, mapping 404 onto
    /// `NotFound` with caller-supplied context.
    async fn check(
        response: reqwest::Response,
        not_found: &str,
    ) -> Result<reqwest::Response, MesError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MesError::NotFound(not_found.to_string()));
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body
                .error
                .or(body.message)
                .unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        Err(MesError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl MesClient for HttpMesClient {
    async fn lookup_container(&self, serial: &str) -> Result<ContainerLookup, MesError> {
        debug!(serial, "looking up container");
        let response = self
            .request(reqwest::Method::GET, &format!("/containers/{serial}"))
            .send()
            .await?;
        let body: ContainerBody = Self::check(response, &format!("container {serial}"))
            .await?
            .json()
            .await
            .map_err(|e| MesError::InvalidResponse(e.to_string()))?;
        let message = body
            .message
            .unwrap_or_else(|| format!("Container {} located", body.serial_no));
        Ok(ContainerLookup {
            record: ContainerRecord {
                serial_number: body.serial_no,
                part_number: body.part_no,
                operation: body.operation,
                quantity: body.quantity,
            },
            message,
        })
    }

    async fn move_container(
        &self,
        serial: &str,
        destination: &str,
    ) -> Result<Confirmation, MesError> {
        debug!(serial, destination, "moving container");
        let response = self
            .request(reqwest::Method::POST, &format!("/containers/{serial}/move"))
            .json(&serde_json::json!({ "destination": destination }))
            .send()
            .await?;
        let body: MessageBody = Self::check(response, &format!("container {serial}"))
            .await?
            .json()
            .await
            .map_err(|e| MesError::InvalidResponse(e.to_string()))?;
        Ok(Confirmation {
            message: body.message,
        })
    }

    async fn record_production(
        &self,
        workcenter_key: &str,
        quantity: u32,
    ) -> Result<ProductionReport, MesError> {
        debug!(workcenter_key, quantity, "recording batch production");
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/workcenters/{workcenter_key}/production"),
            )
            .json(&serde_json::json!({ "quantity": quantity }))
            .send()
            .await?;
        let body: ProductionBody = Self::check(response, &format!("workcenter {workcenter_key}"))
            .await?
            .json()
            .await
            .map_err(|e| MesError::InvalidResponse(e.to_string()))?;
        Ok(ProductionReport {
            new_serial_number: body.new_serial_no,
            message: body.message,
        })
    }

    async fn record_production_for_serial(
        &self,
        workcenter_key: &str,
        serial: &str,
    ) -> Result<Confirmation, MesError> {
        debug!(workcenter_key, serial, "recording single-unit production");
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/workcenters/{workcenter_key}/production/backflush"),
            )
            .json(&serde_json::json!({ "serial_no": serial }))
            .send()
            .await?;
        let body: MessageBody = Self::check(response, &format!("workcenter {workcenter_key}"))
            .await?
            .json()
            .await
            .map_err(|e| MesError::InvalidResponse(e.to_string()))?;
        Ok(Confirmation {
            message: body.message,
        })
    }

    async fn print_label(
        &self,
        serial: &str,
        station_label: &str,
    ) -> Result<Confirmation, MesError> {
        debug!(serial, station_label, "printing label");
        let response = self
            .request(reqwest::Method::POST, "/labels")
            .json(&serde_json::json!({ "serial_no": serial, "station": station_label }))
            .send()
            .await?;
        let body: MessageBody = Self::check(response, &format!("serial {serial}"))
            .await?
            .json()
            .await
            .map_err(|e| MesError::InvalidResponse(e.to_string()))?;
        Ok(Confirmation {
            message: body.message,
        })
    }

    async fn workcenter_info(&self, workcenter_key: &str) -> Result<WorkcenterInfo, MesError> {
        debug!(workcenter_key, "fetching workcenter info");
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/workcenters/{workcenter_key}"),
            )
            .send()
            .await?;
        let fields: BTreeMap<String, serde_json::Value> =
            Self::check(response, &format!("workcenter {workcenter_key}"))
                .await?
                .json()
                .await
                .map_err(|e| MesError::InvalidResponse(e.to_string()))?;
        // The MES reports the configured part as a display field; it may come
        // back as a string or a bare number depending on the part naming.
        let part_number = match fields.get("Part Number") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(MesError::InvalidResponse(
                    "workcenter info is missing a Part Number field".to_string(),
                ))
            }
        };
        Ok(WorkcenterInfo {
            part_number,
            fields,
        })
    }

    async fn standard_pack_quantity(&self, part_number: &str) -> Result<u32, MesError> {
        debug!(part_number, "fetching standard pack quantity");
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/parts/{part_number}/standard-pack-quantity"),
            )
            .send()
            .await?;
        let body: QuantityBody = Self::check(response, &format!("part {part_number}"))
            .await?
            .json()
            .await
            .map_err(|e| MesError::InvalidResponse(e.to_string()))?;
        Ok(body.quantity)
    }

    fn server_identity(&self) -> String {
        self.base_url.clone()
    }
}
