use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::CollaboratorError;

use super::collaborators::{ActionOutcome, CollabResult, WeatherService};

/// Weather lookups against wttr.in's JSON endpoint. No API key needed.
pub struct WttrWeather {
    client: Client,
    default_location: String,
}

#[derive(Deserialize)]
struct WttrReply {
    current_condition: Vec<CurrentCondition>,
}

#[derive(Deserialize)]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "weatherDesc")]
    weather_desc: Vec<WeatherDesc>,
}

#[derive(Deserialize)]
struct WeatherDesc {
    value: String,
}

impl WttrWeather {
    pub fn new(default_location: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(6))
                .build()
                .unwrap_or_default(),
            default_location: default_location.into(),
        }
    }
}

#[async_trait]
impl WeatherService for WttrWeather {
    async fn get_weather(&self, location: Option<&str>) -> CollabResult {
        let place = location.unwrap_or(&self.default_location);
        let url = format!("https://wttr.in/{}?format=j1", place);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CollaboratorError::Backend(format!("weather request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Backend(format!(
                "weather service returned {}",
                response.status()
            )));
        }

        let reply: WttrReply = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Backend(format!("malformed weather reply: {}", e)))?;

        let current = reply
            .current_condition
            .first()
            .ok_or_else(|| CollaboratorError::Backend("empty weather reply".into()))?;
        let description = current
            .weather_desc
            .first()
            .map(|d| d.value.to_lowercase())
            .unwrap_or_else(|| "unknown conditions".to_string());

        let spoken = format!(
            "It's {} degrees and {} in {}.",
            current.temp_c, description, place
        );
        Ok(ActionOutcome::with_data(
            spoken,
            serde_json::json!({
                "location": place,
                "temp_c": current.temp_c,
                "description": description,
            }),
        ))
    }
}
