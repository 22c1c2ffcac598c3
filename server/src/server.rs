use serde::Deserialize;
use shared::{Location, SensorReading, WeatherReading};
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::error::Result;
use crate::openweather::OpenWeatherClient;
use crate::page::Page;
use crate::sensors::{self, SensorStore};

const MAX_FORM_BYTES: u64 = 16 * 1024;

pub async fn run<S: SensorStore>(address: std::net::SocketAddr, weather: OpenWeatherClient, store: S) {
    log::info!("Listening on http://{}", address);
    warp::serve(routes(weather, store)).run(address).await
}

pub fn routes<S: SensorStore>(
    weather: OpenWeatherClient,
    store: S,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health_route = warp::path!("health")
        .and(warp::get())
        .map(|| StatusCode::OK);

    let index_route = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(Page::default().render()));

    let search_route = warp::path::end()
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_FORM_BYTES))
        .and(warp::body::form())
        .and(with_weather(weather))
        .and(with_store(store))
        .and_then(search::<S>);

    health_route
        .or(index_route)
        .or(search_route)
        .recover(rejection)
}

fn with_weather(
    client: OpenWeatherClient,
) -> impl Filter<Extract = (OpenWeatherClient,), Error = Infallible> + Clone {
    warp::any().map(move || client.clone())
}

fn with_store<S: SensorStore>(store: S) -> impl Filter<Extract = (S,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationForm {
    #[serde(default)]
    city_name: String,
    #[serde(default)]
    state_name: String,
    #[serde(default)]
    country_name: String,
}

async fn lookup<S: SensorStore>(
    location: &Location,
    weather: &OpenWeatherClient,
    store: &S,
) -> Result<(WeatherReading, SensorReading)> {
    let reading = weather.get_weather(location).await?;
    let sensor = sensors::latest_sensor_reading(store).await?;
    Ok((reading, sensor))
}

pub async fn search<S: SensorStore>(
    form: LocationForm,
    weather: OpenWeatherClient,
    store: S,
) -> std::result::Result<impl Reply, Rejection> {
    let location = Location::new(&form.city_name, &form.state_name, &form.country_name);
    let mut page = Page {
        location,
        ..Default::default()
    };

    let status = match lookup(&page.location, &weather, &store).await {
        Ok((reading, sensor)) => {
            page.weather = Some(reading);
            page.sensor = Some(sensor);
            StatusCode::OK
        }
        Err(e) => {
            log::error!("Lookup for \"{}\" failed: {}", page.location.query(), e);
            page.error = Some(e.public_message());
            e.status()
        }
    };

    Ok(warp::reply::with_status(
        warp::reply::html(page.render()),
        status,
    ))
}

pub async fn rejection(err: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Page not found.")
    } else if err.find::<warp::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid form submission.")
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Please submit the search form.")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Form submission too large.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        // Checked last, the GET route on `/` adds one to every failed POST.
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
    } else {
        log::error!("Error: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
    };

    let page = Page {
        error: Some(message.to_string()),
        ..Default::default()
    };

    Ok(warp::reply::with_status(warp::reply::html(page.render()), code))
}
