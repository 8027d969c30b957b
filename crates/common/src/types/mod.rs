use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "Promotions REST API Service";
pub const API_VERSION: &str = "1.0";

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub name: String,
    pub status: &'static str,
    pub url: String,
}

impl Health {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: format!("{SERVICE_NAME} - Health"),
            status: "OK",
            url: url.into(),
        }
    }
}

/// Body of `GET /`.
#[derive(Serialize, Deserialize, Debug)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub url: String,
}

impl ServiceInfo {
    /// `base` is the externally visible origin, e.g. `http://localhost:5000`.
    pub fn new(base: &str) -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            version: API_VERSION.to_string(),
            url: format!("{}/health", base.trim_end_matches('/')),
        }
    }
}
