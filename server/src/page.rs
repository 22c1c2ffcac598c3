use shared::{Location, SensorReading, WeatherReading};

/// Everything the index page can show.
#[derive(Debug, Default)]
pub struct Page {
    pub location: Location,
    pub weather: Option<WeatherReading>,
    pub sensor: Option<SensorReading>,
    pub error: Option<String>,
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl Page {
    pub fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Weather</title>
    <style>
        body {{ font-family: sans-serif; max-width: 640px; margin: 0 auto; padding: 20px; color: #1e293b; }}
        form {{ display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 24px; }}
        .panel {{ background: #f1f5f9; border-radius: 8px; padding: 16px; margin-bottom: 16px; }}
        .error {{ background: #fee2e2; color: #991b1b; border-radius: 8px; padding: 12px; margin-bottom: 16px; }}
    </style>
</head>
<body>
    <h1>Weather</h1>
    <form method="post" action="/">
        <input type="text" name="cityName" placeholder="City" value="{city}">
        <input type="text" name="stateName" placeholder="State" value="{state}">
        <input type="text" name="countryName" placeholder="Country" value="{country}">
        <button type="submit">Search</button>
    </form>
{error}{weather}{sensor}</body>
</html>
"#,
            city = escape(&self.location.city),
            state = escape(&self.location.state),
            country = escape(&self.location.country),
            error = self.error_banner(),
            weather = self.weather_panel(),
            sensor = self.sensor_panel(),
        )
    }

    fn error_banner(&self) -> String {
        match &self.error {
            Some(message) => format!("    <div class=\"error\">{}</div>\n", escape(message)),
            None => String::new(),
        }
    }

    fn weather_panel(&self) -> String {
        let Some(weather) = &self.weather else {
            return String::new();
        };
        format!(
            r#"    <div class="panel weather">
        <h2>{condition}</h2>
        <img src="{icon}" alt="{description}">
        <p>{description}</p>
        <p>{temperature}&deg;C</p>
    </div>
"#,
            condition = escape(&weather.condition),
            icon = escape(&weather.icon_url()),
            description = escape(&weather.description),
            temperature = weather.temperature_celsius,
        )
    }

    fn sensor_panel(&self) -> String {
        let Some(sensor) = &self.sensor else {
            return String::new();
        };
        let updated = sensor
            .updated_at
            .map(|t| format!("        <p>Updated {}</p>\n", t.format("%Y-%m-%d %H:%M UTC")))
            .unwrap_or_default();
        format!(
            r#"    <div class="panel sensor">
        <h2>Local sensor</h2>
        <p>Temperature: {temperature}&deg;C</p>
        <p>Feels like: {feels_like}&deg;C</p>
        <p>Humidity: {humidity}%</p>
        <p>Wind: {wind} m/s</p>
{updated}    </div>
"#,
            temperature = sensor.temperature,
            feels_like = sensor.feels_like,
            humidity = sensor.humidity,
            wind = sensor.wind,
            updated = updated,
        )
    }
}
