use clap::{Parser, Subcommand};

use crate::openweather::DEFAULT_BASE_URL;

#[derive(Debug, Parser)]
#[command(about = "Weatherdesk: current weather next to the local station's readings.")]
pub struct Cli {
    /// OpenWeatherMap API key.
    #[arg(env = "WEATHERDESK_API_KEY", long, hide_env_values = true)]
    pub api_key: String,
    #[arg(env = "WEATHERDESK_WEATHER_API_URL", long, default_value = DEFAULT_BASE_URL)]
    pub weather_api_url: String,
    /// Timeout for every outbound request, in seconds.
    #[arg(env = "WEATHERDESK_TIMEOUT_SECS", long, default_value_t = 10)]
    pub timeout_secs: u64,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the web form.
    Http {
        #[arg(env = "WEATHERDESK_SERVER_ADDRESS", default_value = "127.0.0.1:5000")]
        address: std::net::SocketAddr,
    },
    /// Print current conditions for a place.
    Weather(WeatherArgs),
    /// Print the latest local sensor reading.
    Sensor,
}

#[derive(Debug, Parser)]
pub struct WeatherArgs {
    pub city: String,
    #[arg(default_value = "")]
    pub state: String,
    #[arg(default_value = "")]
    pub country: String,
}
