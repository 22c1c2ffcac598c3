//! Firestore REST adapter for the sensor collection.
//!
//! Reads go through the v1 REST API with a service-account bearer token, or
//! unauthenticated against a local emulator. Typed Firestore values are
//! flattened to plain JSON before they reach the sensor mapping.

use chrono::{DateTime, Utc};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::FirestoreConfig;
use crate::error::{Error, Result};
use crate::sensors::{SensorDocument, SensorStore};

pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const SERVICE: &str = "Firestore";

/// A Firestore value, tagged by its type name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Value {
    NullValue(()),
    BooleanValue(bool),
    /// int64 travels as a decimal string.
    IntegerValue(String),
    DoubleValue(Double),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(Json),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

/// Non-finite doubles arrive as `"NaN"`, `"Infinity"` or `"-Infinity"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Double {
    Finite(f64),
    Special(String),
}

#[derive(Debug, Default, Deserialize)]
struct ArrayValue {
    #[serde(default)]
    values: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct MapValue {
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        match value {
            Value::NullValue(()) => Json::Null,
            Value::BooleanValue(b) => Json::Bool(b),
            Value::IntegerValue(s) => s
                .parse::<i64>()
                .map(|i| Json::Number(i.into()))
                .unwrap_or(Json::String(s)),
            Value::DoubleValue(Double::Finite(d)) => {
                Number::from_f64(d).map(Json::Number).unwrap_or(Json::Null)
            }
            Value::DoubleValue(Double::Special(_)) => Json::Null,
            Value::TimestampValue(s)
            | Value::StringValue(s)
            | Value::BytesValue(s)
            | Value::ReferenceValue(s) => Json::String(s),
            Value::GeoPointValue(p) => p,
            Value::ArrayValue(a) => Json::Array(a.values.into_iter().map(Json::from).collect()),
            Value::MapValue(m) => Json::Object(flatten(m.fields)),
        }
    }
}

fn flatten(fields: HashMap<String, Value>) -> Map<String, Json> {
    fields.into_iter().map(|(k, v)| (k, Json::from(v))).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
    update_time: Option<DateTime<Utc>>,
}

impl From<Document> for SensorDocument {
    fn from(doc: Document) -> Self {
        SensorDocument {
            name: doc.name,
            fields: flatten(doc.fields),
            updated_at: doc.update_time,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryResponse {
    document: Option<Document>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryRequest<'a> {
    structured_query: StructuredQuery<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredQuery<'a> {
    from: [CollectionSelector<'a>; 1],
    order_by: [Order<'a>; 1],
    limit: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSelector<'a> {
    collection_id: &'a str,
}

#[derive(Serialize)]
struct Order<'a> {
    field: FieldReference<'a>,
    direction: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldReference<'a> {
    field_path: &'a str,
}

#[derive(Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    order_by: Option<String>,
    page_size: u32,
    auth: Option<Arc<CustomServiceAccount>>,
}

impl FirestoreStore {
    /// Unauthenticated store, for emulators and tests.
    pub fn new(base_url: &str, project_id: &str, collection: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            collection: collection.to_string(),
            order_by: None,
            page_size: 300,
            auth: None,
        })
    }

    pub async fn from_config(cfg: &FirestoreConfig, timeout: Duration) -> anyhow::Result<Self> {
        let mut store = match (&cfg.emulator_host, &cfg.credentials) {
            (Some(host), _) => {
                let project_id = cfg.project_id.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("WEATHERDESK_FIRESTORE_PROJECT_ID is required with an emulator")
                })?;
                log::info!("Using Firestore emulator at {}", host);
                Self::new(&format!("http://{}/v1", host), project_id, &cfg.collection, timeout)?
            }
            (None, Some(path)) => {
                let account = CustomServiceAccount::from_file(path)?;
                let project_id = match &cfg.project_id {
                    Some(id) => id.clone(),
                    None => TokenProvider::project_id(&account).await?.to_string(),
                };
                let mut store = Self::new(FIRESTORE_URL, &project_id, &cfg.collection, timeout)?;
                store.auth = Some(Arc::new(account));
                store
            }
            (None, None) => anyhow::bail!(
                "Missing Firestore config. Set WEATHERDESK_FIRESTORE_CREDENTIALS or WEATHERDESK_FIRESTORE_EMULATOR_HOST"
            ),
        };

        store = store.with_page_size(cfg.page_size);
        if let Some(field) = &cfg.order_by {
            store = store.with_order_by(field);
        }
        log::info!(
            "Reading sensor data from {}/{}",
            store.project_id,
            store.collection
        );
        Ok(store)
    }

    pub fn with_order_by(mut self, field: &str) -> Self {
        self.order_by = Some(field.to_string());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url, self.project_id
        )
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match &self.auth {
            Some(account) => {
                let token = TokenProvider::token(&**account, &[DATASTORE_SCOPE]).await?;
                Ok(request.bearer_auth(token.as_str()))
            }
            None => Ok(request),
        }
    }

    async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.authorize(request).await?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Walk every page of the collection and keep the final document.
    async fn last_listed(&self) -> Result<Option<SensorDocument>> {
        let url = format!("{}/{}", self.documents_url(), self.collection);
        let page_size = self.page_size.to_string();
        let mut page_token: Option<String> = None;
        let mut last = None;
        let mut pages = 0;

        loop {
            let mut query = vec![("pageSize", page_size.as_str())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.as_str()));
            }

            let page: ListDocumentsResponse = self.send(self.http.get(&url).query(&query)).await?;
            pages += 1;

            if let Some(doc) = page.documents.into_iter().last() {
                last = Some(doc);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() && page_token.as_ref() != Some(&token) => {
                    page_token = Some(token)
                }
                Some(token) if !token.is_empty() => {
                    log::warn!("{} repeated page token {}, stopping", SERVICE, token);
                    break;
                }
                _ => break,
            }
        }

        log::debug!("Listed {} in {} page(s)", self.collection, pages);
        Ok(last.map(SensorDocument::from))
    }

    /// Highest document by `field`, through a one-row descending query.
    async fn top_by(&self, field: &str) -> Result<Option<SensorDocument>> {
        let url = format!("{}:runQuery", self.documents_url());
        let body = RunQueryRequest {
            structured_query: StructuredQuery {
                from: [CollectionSelector {
                    collection_id: &self.collection,
                }],
                order_by: [Order {
                    field: FieldReference { field_path: field },
                    direction: "DESCENDING",
                }],
                limit: 1,
            },
        };

        let rows: Vec<RunQueryResponse> = self.send(self.http.post(&url).json(&body)).await?;
        Ok(rows
            .into_iter()
            .find_map(|row| row.document)
            .map(SensorDocument::from))
    }
}

impl SensorStore for FirestoreStore {
    async fn latest_document(&self) -> Result<Option<SensorDocument>> {
        match &self.order_by {
            Some(field) => self.top_by(field).await,
            None => self.last_listed().await,
        }
    }
}
