use crate::{
    Config,
    error::WeatherError,
    model::{ForecastEntry, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of weather data used by the orchestrator.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `city`.
    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError>;

    /// The next four days, in order.
    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let client = OpenWeatherClient::new(config)?;
    Ok(Box::new(client))
}
