use clap::Parser;
use cli::{Cli, Command};
use shared::Location;
use std::time::Duration;

use config::FirestoreConfig;
use firestore::FirestoreStore;
use openweather::OpenWeatherClient;

mod cli;
mod config;
mod error;
mod firestore;
mod openweather;
mod page;
mod sensors;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Cli::parse();
    let timeout = Duration::from_secs(args.timeout_secs);
    let weather = OpenWeatherClient::new(&args.weather_api_url, &args.api_key, timeout)?;

    match args.cmd {
        Command::Http { address } => {
            let store = FirestoreStore::from_config(&FirestoreConfig::from_env()?, timeout).await?;
            server::run(address, weather, store).await;
        }
        Command::Weather(place) => {
            let location = Location::new(&place.city, &place.state, &place.country);
            let reading = weather.get_weather(&location).await?;
            println!("{:#?}", reading);
        }
        Command::Sensor => {
            let store = FirestoreStore::from_config(&FirestoreConfig::from_env()?, timeout).await?;
            let reading = sensors::latest_sensor_reading(&store).await?;
            println!("{:#?}", reading);
        }
    }
    Ok(())
}
