use std::sync::Arc;

use stockledger_infra::{GatewayError, LedgerService, PersistenceGateway};

/// The ledger service as wired into the router; the backend is chosen at startup.
pub type AppServices = LedgerService<Arc<dyn PersistenceGateway>>;

/// Rehydrate the ledger from the gateway.
pub async fn build_services(gateway: Arc<dyn PersistenceGateway>) -> Result<Arc<AppServices>, GatewayError> {
    Ok(Arc::new(LedgerService::bootstrap(gateway).await?))
}
