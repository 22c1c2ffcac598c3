//! OpenWeatherMap client: direct geocoding and current conditions.
//!
//! The client is built once at startup and handed to whoever needs it; the
//! API key travels with it as a query parameter on every call.

use serde::Deserialize;
use shared::{Coordinates, Location, WeatherReading};
use std::time::Duration;

use crate::error::{Error, Result};

/// Public OpenWeatherMap API host.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const SERVICE: &str = "OpenWeatherMap";

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: MainBlock,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Clone, Debug)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Resolve a place name to the coordinates of the first geocoding match.
    pub async fn resolve_coordinates(&self, location: &Location) -> Result<Coordinates> {
        if location.is_blank() {
            return Err(Error::InvalidLocation);
        }
        let query = location.query();

        let results: Vec<GeocodingResult> = self
            .get(
                "/geo/1.0/direct",
                &[("q", query.as_str()), ("appid", self.api_key.as_str())],
            )
            .await?;

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| Error::LocationNotFound(query.clone()))?;

        log::debug!("Resolved {} to ({}, {})", query, first.lat, first.lon);
        Ok(Coordinates {
            lat: first.lat,
            lon: first.lon,
        })
    }

    /// Current conditions at the given coordinates, in metric units.
    pub async fn fetch_current_conditions(&self, coordinates: Coordinates) -> Result<WeatherReading> {
        let lat = coordinates.lat.to_string();
        let lon = coordinates.lon.to_string();

        let current: CurrentWeather = self
            .get(
                "/data/2.5/weather",
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                ],
            )
            .await?;

        let condition = current.weather.into_iter().next().ok_or(Error::NoConditions)?;

        Ok(WeatherReading {
            condition: condition.main,
            description: condition.description,
            icon_code: condition.icon,
            // Truncated toward zero, not rounded.
            temperature_celsius: current.main.temp.trunc() as i32,
        })
    }

    pub async fn get_weather(&self, location: &Location) -> Result<WeatherReading> {
        let coordinates = self.resolve_coordinates(location).await?;
        let reading = self.fetch_current_conditions(coordinates).await?;
        log::info!(
            "Weather for {}: {} {}°C",
            location.query(),
            reading.condition,
            reading.temperature_celsius
        );
        Ok(reading)
    }

    async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        // Urls carry the api key, keep it out of error messages.
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await.map_err(reqwest::Error::without_url)?)
    }
}
