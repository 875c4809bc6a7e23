//! Coordinates weather fetches with the local history and favorites.
//!
//! The orchestrator never renders anything. Single-city operations return a
//! value or a classified [`WeatherError`]; bulk favorites loading returns a
//! stream of per-city results in completion order.

use anyhow::Result;
use futures::{Stream, StreamExt, stream};

use crate::{
    Config,
    error::WeatherError,
    model::{CityWeather, WeatherSnapshot},
    provider::{WeatherProvider, provider_from_config},
    store::{FavoritesStore, HistoryStore},
};

#[derive(Debug)]
pub struct WeatherOrchestrator {
    provider: Box<dyn WeatherProvider>,
    history: HistoryStore,
    favorites: FavoritesStore,
}

impl WeatherOrchestrator {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        history: HistoryStore,
        favorites: FavoritesStore,
    ) -> Self {
        Self {
            provider,
            history,
            favorites,
        }
    }

    /// OpenWeather client plus both stores opened from the config's data directory.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            provider_from_config(config)?,
            HistoryStore::open(config.history_path()),
            FavoritesStore::open(config.favorites_path()),
        ))
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    pub fn history_suggestions(&self) -> &[String] {
        self.history.suggestions()
    }

    pub fn favorites(&self) -> &[String] {
        self.favorites.entries()
    }

    /// Current weather and the four-day forecast for `city`.
    ///
    /// The city is written to history before anything is fetched, so it is
    /// remembered even when the fetch fails. Both fetches must succeed.
    pub async fn search_city(&mut self, city: &str) -> Result<CityWeather, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::empty_city());
        }

        if let Err(e) = self.history.add(city) {
            tracing::error!(city, error = %e, "failed to save search history");
        }

        let (current, forecast) = tokio::try_join!(
            self.provider.fetch_current(city),
            self.provider.fetch_forecast(city),
        )?;

        Ok(CityWeather { current, forecast })
    }

    /// Fetch current weather for every favorite at once.
    ///
    /// Items arrive as each fetch completes. A failed city is logged and
    /// reported as its own item; it never holds up the rest.
    pub fn load_favorites(
        &self,
    ) -> impl Stream<Item = (String, Result<WeatherSnapshot, WeatherError>)> + '_ {
        let provider = self.provider.as_ref();
        let in_flight = self.favorites.entries().len().max(1);

        stream::iter(self.favorites.entries().iter().cloned())
            .map(move |city| async move {
                let result = provider.fetch_current(&city).await;
                if let Err(e) = &result {
                    tracing::warn!(city = %city, error = %e, "failed to load favorite");
                }
                (city, result)
            })
            .buffer_unordered(in_flight)
    }

    /// Pin `city` after checking that its weather can be fetched.
    ///
    /// Returns the snapshot so it can be shown straight away.
    pub async fn add_favorite(&mut self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::empty_city());
        }

        let snapshot = self.provider.fetch_current(city).await?;

        if let Err(e) = self.favorites.add(city) {
            tracing::error!(city, error = %e, "failed to save favorites");
        }

        Ok(snapshot)
    }

    /// Returns `true` if `city` was pinned.
    pub fn remove_favorite(&mut self, city: &str) -> Result<bool> {
        self.favorites.remove(city.trim())
    }

    /// Returns `true` if `city` was in history.
    pub fn remove_history_entry(&mut self, city: &str) -> Result<bool> {
        self.history.remove(city.trim())
    }
}
