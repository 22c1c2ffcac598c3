use derive_more::{Display, From};
use warp::http::StatusCode;

#[derive(Display, From, Debug)]
pub enum Error {
    #[from(ignore)]
    #[display(fmt = "Please enter at least a city or a country")]
    InvalidLocation,
    #[from(ignore)]
    #[display(fmt = "No place found for \"{}\"", _0)]
    LocationNotFound(String),
    #[from(ignore)]
    #[display(fmt = "Weather service returned no conditions")]
    NoConditions,
    #[from(ignore)]
    #[display(fmt = "No sensor readings recorded yet")]
    EmptyCollection,
    #[from(ignore)]
    #[display(fmt = "Sensor document has no numeric \"{}\" field", _0)]
    MissingField(String),
    #[from(ignore)]
    #[display(fmt = "{} returned {}: {}", service, status, body)]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[display(fmt = "HTTP error: {}", _0)]
    Http(reqwest::Error),
    #[display(fmt = "Authentication error: {}", _0)]
    Auth(gcp_auth::Error),
    #[display(fmt = "Decoding error: {}", _0)]
    Decode(serde_json::Error),
}

impl std::error::Error for Error {}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidLocation => StatusCode::BAD_REQUEST,
            Error::LocationNotFound(_) => StatusCode::NOT_FOUND,
            Error::EmptyCollection => StatusCode::SERVICE_UNAVAILABLE,
            Error::NoConditions | Error::Upstream { .. } | Error::Http(_) | Error::Auth(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show on the page; transport details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Error::Http(_) | Error::Auth(_) | Error::Decode(_) => {
                "Could not reach the weather services, please try again later".to_string()
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
