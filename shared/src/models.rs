use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// A place as typed by the user: city, state or region, country.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Location {
    pub fn new(city: &str, state: &str, country: &str) -> Self {
        Self {
            city: city.trim().to_string(),
            state: state.trim().to_string(),
            country: country.trim().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.parts().next().is_none()
    }

    /// Geocoding query string, `city,state,country` with blank parts skipped.
    pub fn query(&self) -> String {
        self.parts().collect::<Vec<_>>().join(",")
    }

    fn parts(&self) -> impl Iterator<Item = &str> {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub condition: String,
    pub description: String,
    pub icon_code: String,
    pub temperature_celsius: i32,
}

impl WeatherReading {
    pub fn icon_url(&self) -> String {
        format!("{}/{}@2x.png", ICON_BASE_URL, self.icon_code)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub humidity: f64,
    pub feels_like: f64,
    pub temperature: f64,
    pub wind: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
