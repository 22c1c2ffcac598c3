use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct FirestoreConfig {
    /// Service-account key file.
    pub credentials: Option<PathBuf>,
    /// Defaults to the project of the service account.
    pub project_id: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Field to sort on for "most recent"; unset means last in store order.
    pub order_by: Option<String>,
    pub emulator_host: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_collection() -> String {
    "weather".to_string()
}

fn default_page_size() -> u32 {
    300
}

impl FirestoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        envy::prefixed("WEATHERDESK_FIRESTORE_")
            .from_env::<FirestoreConfig>()
            .map_err(|e| anyhow::anyhow!("Invalid Firestore config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg: FirestoreConfig = envy::prefixed("WEATHERDESK_FIRESTORE_")
            .from_iter(vec![(
                "WEATHERDESK_FIRESTORE_CREDENTIALS".to_string(),
                "key.json".to_string(),
            )])
            .unwrap();

        assert_eq!(cfg.credentials, Some(PathBuf::from("key.json")));
        assert_eq!(cfg.collection, "weather");
        assert_eq!(cfg.page_size, 300);
        assert!(cfg.order_by.is_none());
        assert!(cfg.emulator_host.is_none());
    }

    #[test]
    fn test_overrides() {
        let vars = vec![
            ("WEATHERDESK_FIRESTORE_EMULATOR_HOST", "localhost:8080"),
            ("WEATHERDESK_FIRESTORE_PROJECT_ID", "demo"),
            ("WEATHERDESK_FIRESTORE_COLLECTION", "readings"),
            ("WEATHERDESK_FIRESTORE_ORDER_BY", "timestamp"),
            ("WEATHERDESK_FIRESTORE_PAGE_SIZE", "50"),
        ];
        let cfg: FirestoreConfig = envy::prefixed("WEATHERDESK_FIRESTORE_")
            .from_iter(vars.into_iter().map(|(k, v)| (k.to_string(), v.to_string())))
            .unwrap();

        assert_eq!(cfg.emulator_host.as_deref(), Some("localhost:8080"));
        assert_eq!(cfg.project_id.as_deref(), Some("demo"));
        assert_eq!(cfg.collection, "readings");
        assert_eq!(cfg.order_by.as_deref(), Some("timestamp"));
        assert_eq!(cfg.page_size, 50);
    }
}
