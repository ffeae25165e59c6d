use tracing::{info, warn};

use crate::mes::{MesClient, MesError, WorkcenterInfo};
use crate::station::types::ContextStatus;

/// The active workcenter's expected part/quantity state, loaded from the MES.
///
/// Mutated only by a successful `refresh`; a failed refresh flips the status
/// to `Error` but keeps the previously loaded values readable (stale-read
/// semantics). After an accepted scan changes downstream state the context is
/// stale until the controller triggers the next refresh.
#[derive(Debug)]
pub struct WorkcenterContext {
    workcenter_key: String,
    /// Batch stations resolve the standard pack quantity for the loaded part
    /// via a secondary lookup.
    track_batch_quantity: bool,
    status: ContextStatus,
    info: Option<WorkcenterInfo>,
    standard_batch_quantity: Option<u32>,
    server: Option<String>,
}

impl WorkcenterContext {
    pub fn new(workcenter_key: impl Into<String>, track_batch_quantity: bool) -> Self {
        Self {
            workcenter_key: workcenter_key.into(),
            track_batch_quantity,
            status: ContextStatus::Idle,
            info: None,
            standard_batch_quantity: None,
            server: None,
        }
    }

    pub fn workcenter_key(&self) -> &str {
        &self.workcenter_key
    }

    pub fn status(&self) -> ContextStatus {
        self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.status == ContextStatus::Loaded
    }

    pub fn expected_part_number(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.part_number.as_str())
    }

    pub fn standard_batch_quantity(&self) -> Option<u32> {
        self.standard_batch_quantity
    }

    /// Raw workcenter field map for display by the UI layer.
    pub fn info(&self) -> Option<&WorkcenterInfo> {
        self.info.as_ref()
    }

    /// Which MES instance answered the last successful refresh.
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Reload the context from the MES. All fields are staged and assigned
    /// only when every lookup succeeds, so a failure leaves the prior context
    /// intact.
    pub async fn refresh<C: MesClient>(&mut self, client: &C) -> Result<(), MesError> {
        self.status = ContextStatus::Loading;
        match self.load(client).await {
            Ok((info, quantity)) => {
                info!(
                    workcenter = %self.workcenter_key,
                    part = %info.part_number,
                    "workcenter context loaded"
                );
                self.info = Some(info);
                self.standard_batch_quantity = quantity;
                self.server = Some(client.server_identity());
                self.status = ContextStatus::Loaded;
                Ok(())
            }
            Err(err) => {
                warn!(workcenter = %self.workcenter_key, error = %err, "context refresh failed");
                self.status = ContextStatus::Error;
                Err(err)
            }
        }
    }

    async fn load<C: MesClient>(
        &self,
        client: &C,
    ) -> Result<(WorkcenterInfo, Option<u32>), MesError> {
        let info = client.workcenter_info(&self.workcenter_key).await?;
        let quantity = if self.track_batch_quantity {
            Some(client.standard_pack_quantity(&info.part_number).await?)
        } else {
            None
        };
        Ok((info, quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mes::mock::MockMesClient;

    #[tokio::test]
    async fn refresh_loads_part_number() {
        let client = MockMesClient::new();
        client.set_workcenter("74883", "PN-100");
        let mut context = WorkcenterContext::new("74883", false);

        context.refresh(&client).await.unwrap();

        assert_eq!(context.status(), ContextStatus::Loaded);
        assert_eq!(context.expected_part_number(), Some("PN-100"));
        assert_eq!(context.standard_batch_quantity(), None);
    }

    #[tokio::test]
    async fn refresh_resolves_batch_quantity_from_loaded_part() {
        let client = MockMesClient::new();
        client.set_workcenter("74895", "PN-100");
        client.set_pack_quantity("PN-100", 12);
        let mut context = WorkcenterContext::new("74895", true);

        context.refresh(&client).await.unwrap();

        assert_eq!(context.standard_batch_quantity(), Some(12));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_prior_context_readable() {
        let client = MockMesClient::new();
        client.set_workcenter("74883", "PN-100");
        let mut context = WorkcenterContext::new("74883", false);
        context.refresh(&client).await.unwrap();

        client.fail_workcenter_info(MesError::Network("connection reset".to_string()));
        let result = context.refresh(&client).await;

        assert!(result.is_err());
        assert_eq!(context.status(), ContextStatus::Error);
        // Stale read: prior values survive the failure.
        assert_eq!(context.expected_part_number(), Some("PN-100"));
    }

    #[tokio::test]
    async fn batch_quantity_lookup_failure_fails_the_whole_refresh() {
        let client = MockMesClient::new();
        client.set_workcenter("74895", "PN-100");
        // No pack quantity staged for PN-100.
        let mut context = WorkcenterContext::new("74895", true);

        let result = context.refresh(&client).await;

        assert!(result.is_err());
        assert_eq!(context.status(), ContextStatus::Error);
        assert_eq!(context.expected_part_number(), None);
    }
}
