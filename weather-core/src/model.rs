use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions for one city, as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub min_c: f64,
    pub max_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: u32,
    pub cloudiness_pct: u8,
    /// Provider icon code, e.g. "10d". Passed through untouched.
    pub condition_icon_id: String,
    pub condition_description: String,
    pub observed_at: Option<DateTime<Utc>>,
}

/// One day of the short forecast.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Upper-cased weekday name, e.g. "MONDAY".
    pub day_label: String,
    pub condition_icon_id: String,
    pub temperature_c: f64,
    pub min_c: f64,
    pub max_c: f64,
}

impl ForecastEntry {
    /// Entry carrying only a label; used when the provider list is too short.
    pub fn zeroed(day_label: String) -> Self {
        Self {
            day_label,
            ..Self::default()
        }
    }
}

/// Combined result of a single-city search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeather {
    pub current: WeatherSnapshot,
    pub forecast: Vec<ForecastEntry>,
}

impl CityWeather {
    /// Card for the request day, built from the current snapshot.
    pub fn today_entry(&self, today: NaiveDate) -> ForecastEntry {
        ForecastEntry {
            day_label: day_label(today),
            condition_icon_id: self.current.condition_icon_id.clone(),
            temperature_c: self.current.temperature_c,
            min_c: self.current.min_c,
            max_c: self.current.max_c,
        }
    }
}

pub(crate) fn day_label(date: NaiveDate) -> String {
    date.format("%A").to_string().to_uppercase()
}
