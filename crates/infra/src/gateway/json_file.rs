use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use stockledger_inventory::Snapshot;

use super::{GatewayError, PersistenceGateway};

/// Whole-snapshot JSON file (`{ "products": [...], "movements": [...] }`).
///
/// A missing file is created holding an empty snapshot. Saves write a sibling
/// temp file and rename it over the target, so readers never see a torn file.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "data.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write(&self, snapshot: &Snapshot) -> Result<(), GatewayError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn load(&self) -> Result<Snapshot, GatewayError> {
        if !tokio::fs::try_exists(&self.path).await? {
            info!(path = %self.path.display(), "data file missing; creating empty snapshot");
            let empty = Snapshot::default();
            self.write(&empty).await?;
            return Ok(empty);
        }

        let raw = tokio::fs::read_to_string(&self.path).await?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        debug!(
            products = snapshot.products.len(),
            movements = snapshot.movements.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), GatewayError> {
        self.write(snapshot).await?;
        debug!(
            products = snapshot.products.len(),
            movements = snapshot.movements.len(),
            "snapshot saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockledger_inventory::{CreateProduct, Ledger, ProductInput};

    #[tokio::test]
    async fn missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let gateway = JsonFileGateway::new(&path);

        let snapshot = gateway.load().await.unwrap();
        assert!(snapshot.is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn save_then_load_preserves_order_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("data.json"));

        let mut ledger = Ledger::new();
        for sku in ["A1", "B1"] {
            ledger
                .create_product(CreateProduct {
                    input: ProductInput::new(sku, "Widget", 3, 1),
                    occurred_at: Utc::now(),
                })
                .unwrap();
        }

        gateway.save(ledger.snapshot()).await.unwrap();
        let loaded = gateway.load().await.unwrap();
        assert_eq!(&loaded, ledger.snapshot());
        assert!(!gateway.temp_path().exists());
    }

    #[tokio::test]
    async fn loads_files_written_with_legacy_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{
    "products": [{
        "id": "lq3k9x2abc123def",
        "sku": "A1",
        "name": "Widget",
        "description": "",
        "quantity": 5,
        "minStock": 2,
        "createdAt": "2024-01-01T10:00:00.000Z",
        "updatedAt": "2024-01-01T10:00:00.000Z"
    }],
    "movements": [{
        "id": "lq3ka1b2c3",
        "productId": "lq3k9x2abc123def",
        "productName": "Widget",
        "productSku": "A1",
        "type": "in",
        "quantity": 5,
        "previousStock": 0,
        "newStock": 5,
        "reason": "initial stock entry",
        "createdAt": "2024-01-01T10:00:00.000Z"
    }]
}"#,
        )
        .unwrap();

        let snapshot = JsonFileGateway::new(&path).load().await.unwrap();
        assert_eq!(snapshot.products[0].id_typed().as_str(), "lq3k9x2abc123def");
        assert_eq!(snapshot.movements[0].product_id(), snapshot.products[0].id_typed());

        let ledger = Ledger::from_snapshot(snapshot);
        let id = "lq3k9x2abc123def".parse().unwrap();
        assert_eq!(ledger.product(&id).map(|p| p.quantity()), Some(5));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileGateway::new(&path).load().await.unwrap_err();
        assert!(matches!(err, GatewayError::Serialization(_)));
    }
}
