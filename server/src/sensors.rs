use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use shared::SensorReading;
use std::future::Future;

use crate::error::{Error, Result};

/// A raw document as read from the sensor collection, with typed store
/// values already flattened to plain JSON.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SensorDocument {
    pub name: String,
    pub fields: Map<String, Value>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SensorDocument {
    fn number(&self, field: &str) -> Result<f64> {
        self.fields
            .get(field)
            .and_then(Value::as_f64)
            .ok_or_else(|| Error::MissingField(field.to_string()))
    }
}

impl TryFrom<&SensorDocument> for SensorReading {
    type Error = Error;

    fn try_from(doc: &SensorDocument) -> Result<Self> {
        Ok(SensorReading {
            humidity: doc.number("humidity")?,
            feels_like: doc.number("feelsLike")?,
            temperature: doc.number("temperature")?,
            wind: doc.number("wind")?,
            updated_at: doc.updated_at,
        })
    }
}

/// Read access to the collection the weather station writes into.
pub trait SensorStore: Clone + Send + Sync + 'static {
    /// Final document of the collection's ordered sequence, `None` when the
    /// collection is empty.
    fn latest_document(&self) -> impl Future<Output = Result<Option<SensorDocument>>> + Send;
}

pub async fn latest_sensor_reading<S: SensorStore>(store: &S) -> Result<SensorReading> {
    let doc = store.latest_document().await?.ok_or(Error::EmptyCollection)?;
    log::debug!("Latest sensor document: {}", doc.name);
    SensorReading::try_from(&doc)
}


#[cfg(test)]
mod tests {
    use super::memory::{doc, MemoryStore};
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_latest_of_three_documents() {
        let store = MemoryStore::new(vec![
            doc("a", json!({ "humidity": 40.0, "feelsLike": 9.0, "temperature": 10.0, "wind": 1.0 })),
            doc("b", json!({ "humidity": 45.0, "feelsLike": 10.0, "temperature": 11.0, "wind": 2.0 })),
            doc("c", json!({ "humidity": 52.5, "feelsLike": 11.5, "temperature": 12.25, "wind": 3.5 })),
        ]);

        let reading = latest_sensor_reading(&store).await.unwrap();

        assert_eq!(
            reading,
            SensorReading {
                humidity: 52.5,
                feels_like: 11.5,
                temperature: 12.25,
                wind: 3.5,
                updated_at: None,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_collection_fails() {
        let store = MemoryStore::new(vec![]);
        let result = latest_sensor_reading(&store).await;
        assert!(matches!(result, Err(Error::EmptyCollection)));
    }

    #[tokio::test]
    async fn test_integer_fields_accepted() {
        let store = MemoryStore::new(vec![doc(
            "a",
            json!({ "humidity": 60, "feelsLike": -2, "temperature": 1, "wind": 0 }),
        )]);

        let reading = latest_sensor_reading(&store).await.unwrap();
        assert_eq!(reading.humidity, 60.0);
        assert_eq!(reading.feels_like, -2.0);
    }

    #[tokio::test]
    async fn test_missing_field_fails() {
        let store = MemoryStore::new(vec![doc(
            "a",
            json!({ "humidity": 60.0, "temperature": 1.0, "wind": 0.5 }),
        )]);

        let result = latest_sensor_reading(&store).await;
        assert!(matches!(result, Err(Error::MissingField(f)) if f == "feelsLike"));
    }

    #[tokio::test]
    async fn test_non_numeric_field_fails() {
        let store = MemoryStore::new(vec![doc(
            "a",
            json!({ "humidity": "wet", "feelsLike": 1.0, "temperature": 1.0, "wind": 0.5 }),
        )]);

        let result = latest_sensor_reading(&store).await;
        assert!(matches!(result, Err(Error::MissingField(f)) if f == "humidity"));
    }
}
