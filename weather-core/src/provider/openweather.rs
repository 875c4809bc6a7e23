use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use crate::{
    config::Config,
    error::WeatherError,
    model::{ForecastEntry, WeatherSnapshot, day_label},
};

use super::WeatherProvider;

/// Snapshot and forecast fields are Celsius and m/s, so every request asks for metric.
const UNITS: &str = "metric";

/// Forecast list positions used as "the next four days".
const FORECAST_OFFSETS: std::ops::RangeInclusive<usize> = 1..=4;

/// What a request is looking up; decides the not-found error.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Lookup<'a> {
    City(&'a str),
    Coords { lat: f64, lon: f64 },
}

impl Lookup<'_> {
    fn not_found(&self) -> WeatherError {
        match *self {
            Lookup::City(city) => WeatherError::CityNotFound(city.to_string()),
            Lookup::Coords { lat, lon } => WeatherError::LocationNotFound(format!("{lat}, {lon}")),
        }
    }
}

impl std::fmt::Display for Lookup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::City(city) => f.write_str(city),
            Lookup::Coords { lat, lon } => write!(f, "{lat}, {lon}"),
        }
    }
}

/// Client for the OpenWeather current-weather and 5-day/3-hour forecast endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    /// The request timeout is taken from `config` and applies to every call.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Current conditions at a coordinate pair.
    pub async fn fetch_current_by_coords(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let lookup = Lookup::Coords { lat, lon };
        let params = [("lat", lat.to_string()), ("lon", lon.to_string())];

        let payload: OwCurrentResponse = self.get_json("weather", &params, lookup).await?;
        Ok(snapshot_from_payload(payload, &lookup.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        lookup: Lookup<'_>,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%url, subject = %lookup, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await
            .map_err(WeatherError::from_transport)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::from_transport)?;

        if let Err(err) = classify_status(status, lookup) {
            tracing::debug!(%status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::UnexpectedError(format!("Failed to parse OpenWeather {endpoint} JSON: {e}"))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::empty_city());
        }

        let params = [("q", city.to_string())];
        let payload: OwCurrentResponse =
            self.get_json("weather", &params, Lookup::City(city)).await?;
        Ok(snapshot_from_payload(payload, city))
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::empty_city());
        }

        let params = [("q", city.to_string())];
        let payload: OwForecastResponse =
            self.get_json("forecast", &params, Lookup::City(city)).await?;

        if payload.list.len() <= *FORECAST_OFFSETS.end() {
            tracing::warn!(
                city,
                periods = payload.list.len(),
                "forecast list shorter than expected, missing days are zero-filled"
            );
        }

        Ok(forecast_from_payload(&payload, Local::now().date_naive()))
    }
}

/// Map a non-200 status to its classified error, in priority order.
pub(crate) fn classify_status(status: StatusCode, lookup: Lookup<'_>) -> Result<(), WeatherError> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err(lookup.not_found()),
        StatusCode::UNAUTHORIZED => Err(WeatherError::AuthError),
        s if s.is_server_error() => Err(WeatherError::ServiceUnavailable(s.as_u16())),
        s => Err(WeatherError::UpstreamError(s.as_u16())),
    }
}

// Payload decoding: a field that is absent, null or of an unexpected type
// decodes to its zero/empty default, so a sparse or odd response still
// produces a snapshot. Only a body that isn't JSON at all is an error.

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    #[serde(default, deserialize_with = "lenient")]
    temp: f64,
    #[serde(default, deserialize_with = "lenient")]
    feels_like: f64,
    #[serde(default, deserialize_with = "lenient")]
    temp_min: f64,
    #[serde(default, deserialize_with = "lenient")]
    temp_max: f64,
    #[serde(default, deserialize_with = "lenient")]
    humidity: f64,
    #[serde(default, deserialize_with = "lenient")]
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwWeather {
    #[serde(default, deserialize_with = "lenient")]
    icon: String,
    #[serde(default, deserialize_with = "lenient")]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default, deserialize_with = "lenient")]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default, deserialize_with = "lenient")]
    all: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default, deserialize_with = "lenient")]
    country: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwCurrentResponse {
    #[serde(default, deserialize_with = "lenient")]
    name: String,
    #[serde(default, deserialize_with = "lenient")]
    dt: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    main: OwMain,
    #[serde(default, deserialize_with = "lenient")]
    weather: Vec<OwWeather>,
    #[serde(default, deserialize_with = "lenient")]
    wind: OwWind,
    #[serde(default, deserialize_with = "lenient")]
    clouds: OwClouds,
    #[serde(default, deserialize_with = "lenient")]
    sys: OwSys,
}

#[derive(Debug, Default, Deserialize)]
struct OwForecastItem {
    #[serde(default, deserialize_with = "lenient")]
    main: OwMain,
    #[serde(default, deserialize_with = "lenient")]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Default, Deserialize)]
struct OwForecastResponse {
    // Null periods keep their slot so the day offsets stay aligned.
    #[serde(default, deserialize_with = "lenient")]
    list: Vec<Option<OwForecastItem>>,
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn snapshot_from_payload(payload: OwCurrentResponse, requested: &str) -> WeatherSnapshot {
    let condition = payload.weather.into_iter().next().unwrap_or_default();
    let city_name = if payload.name.is_empty() {
        requested.to_string()
    } else {
        payload.name
    };

    WeatherSnapshot {
        city_name,
        country_code: payload.sys.country,
        temperature_c: payload.main.temp,
        feels_like_c: payload.main.feels_like,
        min_c: payload.main.temp_min,
        max_c: payload.main.temp_max,
        humidity_pct: percent(payload.main.humidity),
        wind_speed_mps: payload.wind.speed,
        pressure_hpa: payload.main.pressure.round().max(0.0) as u32,
        cloudiness_pct: percent(payload.clouds.all),
        condition_icon_id: condition.icon,
        condition_description: condition.description,
        observed_at: payload.dt.and_then(unix_to_utc),
    }
}

fn forecast_from_payload(payload: &OwForecastResponse, today: NaiveDate) -> Vec<ForecastEntry> {
    FORECAST_OFFSETS
        .map(|i| {
            let label = day_label(today + chrono::Days::new(i as u64));
            match payload.list.get(i).and_then(Option::as_ref) {
                Some(item) => ForecastEntry {
                    day_label: label,
                    condition_icon_id: item
                        .weather
                        .first()
                        .map(|w| w.icon.clone())
                        .unwrap_or_default(),
                    temperature_c: item.main.temp,
                    min_c: item.main.temp_min,
                    max_c: item.main.temp_max,
                },
                None => ForecastEntry::zeroed(label),
            }
        })
        .collect()
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date")
    }

    fn forecast_json(periods: usize) -> String {
        let list: Vec<serde_json::Value> = (0..periods)
            .map(|i| {
                serde_json::json!({
                    "main": { "temp": 10.0 + i as f64, "temp_min": 5.0 + i as f64, "temp_max": 15.0 + i as f64 },
                    "weather": [{ "icon": format!("0{i}d"), "description": "clouds" }]
                })
            })
            .collect();
        serde_json::json!({ "list": list }).to_string()
    }

    #[test]
    fn classify_status_priority() {
        let paris = Lookup::City("Paris");
        assert_eq!(classify_status(StatusCode::OK, paris), Ok(()));
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, paris),
            Err(WeatherError::CityNotFound("Paris".into()))
        );
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, paris),
            Err(WeatherError::AuthError)
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY, paris),
            Err(WeatherError::ServiceUnavailable(502))
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, paris),
            Err(WeatherError::UpstreamError(429))
        );
        // Only 200 counts as success.
        assert_eq!(
            classify_status(StatusCode::NO_CONTENT, paris),
            Err(WeatherError::UpstreamError(204))
        );
    }

    #[test]
    fn full_current_payload_decodes() {
        let body = r#"{
            "name": "London",
            "dt": 1717400000,
            "sys": { "country": "GB" },
            "main": { "temp": 15.2, "feels_like": 14.1, "temp_min": 13.0, "temp_max": 17.0,
                      "humidity": 71, "pressure": 1013 },
            "weather": [{ "icon": "04d", "description": "broken clouds" }],
            "wind": { "speed": 3.6 },
            "clouds": { "all": 75 }
        }"#;
        let payload: OwCurrentResponse = serde_json::from_str(body).expect("valid payload");
        let snap = snapshot_from_payload(payload, "london");

        assert_eq!(snap.city_name, "London");
        assert_eq!(snap.country_code, "GB");
        assert_eq!(snap.temperature_c, 15.2);
        assert_eq!(snap.feels_like_c, 14.1);
        assert_eq!(snap.min_c, 13.0);
        assert_eq!(snap.max_c, 17.0);
        assert_eq!(snap.humidity_pct, 71);
        assert_eq!(snap.pressure_hpa, 1013);
        assert_eq!(snap.wind_speed_mps, 3.6);
        assert_eq!(snap.cloudiness_pct, 75);
        assert_eq!(snap.condition_icon_id, "04d");
        assert_eq!(snap.condition_description, "broken clouds");
        assert_eq!(snap.observed_at.map(|t| t.timestamp()), Some(1717400000));
    }

    #[test]
    fn sparse_current_payload_defaults_to_zero() {
        let payload: OwCurrentResponse =
            serde_json::from_str(r#"{ "main": { "temp": 1.5 } }"#).expect("sparse payload");
        let snap = snapshot_from_payload(payload, "Oslo");

        assert_eq!(snap.city_name, "Oslo");
        assert_eq!(snap.temperature_c, 1.5);
        assert_eq!(snap.humidity_pct, 0);
        assert_eq!(snap.wind_speed_mps, 0.0);
        assert!(snap.country_code.is_empty());
        assert!(snap.condition_icon_id.is_empty());
        assert!(snap.observed_at.is_none());
    }

    #[test]
    fn coordinate_not_found_is_not_a_city_error() {
        let here = Lookup::Coords { lat: 51.5, lon: -0.12 };
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, here),
            Err(WeatherError::LocationNotFound("51.5, -0.12".into()))
        );
    }

    #[test]
    fn null_fields_decode_to_defaults() {
        let body = r#"{
            "name": null,
            "dt": null,
            "sys": null,
            "weather": null,
            "clouds": null,
            "main": { "temp": 15.2, "feels_like": null, "humidity": null },
            "wind": { "speed": null }
        }"#;
        let payload: OwCurrentResponse = serde_json::from_str(body).expect("nulls are tolerated");
        let snap = snapshot_from_payload(payload, "London");

        assert_eq!(snap.city_name, "London");
        assert_eq!(snap.temperature_c, 15.2);
        assert_eq!(snap.feels_like_c, 0.0);
        assert_eq!(snap.humidity_pct, 0);
        assert_eq!(snap.wind_speed_mps, 0.0);
        assert!(snap.country_code.is_empty());
        assert!(snap.condition_description.is_empty());
        assert!(snap.observed_at.is_none());
    }

    #[test]
    fn mistyped_fields_decode_to_defaults() {
        let body = r#"{
            "name": 42,
            "sys": "GB",
            "weather": { "icon": "01d" },
            "main": { "temp": "warm", "temp_max": 18.0, "humidity": 71.6, "pressure": 1012.4 },
            "clouds": { "all": 250 }
        }"#;
        let payload: OwCurrentResponse = serde_json::from_str(body).expect("odd types are tolerated");
        let snap = snapshot_from_payload(payload, "Leeds");

        assert_eq!(snap.city_name, "Leeds");
        assert!(snap.country_code.is_empty());
        assert!(snap.condition_icon_id.is_empty());
        assert_eq!(snap.temperature_c, 0.0);
        assert_eq!(snap.max_c, 18.0);
        assert_eq!(snap.humidity_pct, 72);
        assert_eq!(snap.pressure_hpa, 1012);
        assert_eq!(snap.cloudiness_pct, 100);
    }

    #[test]
    fn null_forecast_entries_are_tolerated() {
        let body = r#"{ "list": [ null, { "main": null, "weather": null }, { "main": { "temp": 9.5 } } ] }"#;
        let payload: OwForecastResponse = serde_json::from_str(body).expect("forecast payload");
        let days = forecast_from_payload(&payload, monday());

        assert_eq!(days.len(), 4);
        assert_eq!(days[0].temperature_c, 0.0);
        assert_eq!(days[1].temperature_c, 9.5);
        assert_eq!(days[2], ForecastEntry::zeroed("THURSDAY".into()));
    }

    #[test]
    fn empty_object_is_a_valid_payload() {
        let payload: OwCurrentResponse = serde_json::from_str("{}").expect("empty payload");
        let snap = snapshot_from_payload(payload, "Lima");
        assert_eq!(snap.city_name, "Lima");
        assert_eq!(snap.temperature_c, 0.0);
    }

    #[test]
    fn forecast_takes_offsets_one_to_four() {
        let payload: OwForecastResponse =
            serde_json::from_str(&forecast_json(40)).expect("forecast payload");
        let days = forecast_from_payload(&payload, monday());

        assert_eq!(days.len(), 4);
        let labels: Vec<&str> = days.iter().map(|d| d.day_label.as_str()).collect();
        assert_eq!(labels, ["TUESDAY", "WEDNESDAY", "THURSDAY", "FRIDAY"]);
        assert_eq!(days[0].temperature_c, 11.0);
        assert_eq!(days[0].condition_icon_id, "01d");
        assert_eq!(days[3].temperature_c, 14.0);
        assert_eq!(days[3].min_c, 9.0);
        assert_eq!(days[3].max_c, 19.0);
    }

    #[test]
    fn short_forecast_list_is_zero_filled() {
        let payload: OwForecastResponse =
            serde_json::from_str(&forecast_json(3)).expect("forecast payload");
        let days = forecast_from_payload(&payload, monday());

        assert_eq!(days.len(), 4);
        assert_eq!(days[1].temperature_c, 12.0);
        assert_eq!(days[2], ForecastEntry::zeroed("THURSDAY".into()));
        assert_eq!(days[3], ForecastEntry::zeroed("FRIDAY".into()));
    }

    #[test]
    fn missing_forecast_list_is_all_zero() {
        let payload: OwForecastResponse = serde_json::from_str("{}").expect("forecast payload");
        let days = forecast_from_payload(&payload, monday());
        assert_eq!(days.len(), 4);
        assert!(days.iter().all(|d| d.temperature_c == 0.0));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
