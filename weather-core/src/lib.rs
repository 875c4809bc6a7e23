//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration resolved from a config file and the environment
//! - The OpenWeather client and its error classification
//! - Persisted search history and favorite cities
//! - The orchestrator that ties fetching and local state together
//!
//! It renders nothing. Callers get values, classified errors and streams back.

pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod store;

pub use config::{Config, ConfigFile};
pub use error::WeatherError;
pub use model::{CityWeather, ForecastEntry, WeatherSnapshot};
pub use orchestrator::WeatherOrchestrator;
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use store::{FavoritesStore, HistoryStore};
