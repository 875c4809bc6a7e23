use chrono::NaiveDate;
use std::fmt::Write;
use weather_core::{CityWeather, ForecastEntry, WeatherSnapshot};

/// Full card for a searched city: current conditions, then today plus the
/// four forecast days.
pub fn city_weather(weather: &CityWeather, today: NaiveDate) -> String {
    let mut out = snapshot(&weather.current);

    out.push('\n');
    out.push_str(&forecast_line(&weather.today_entry(today)));
    for day in &weather.forecast {
        out.push_str(&forecast_line(day));
    }
    out
}

pub fn snapshot(s: &WeatherSnapshot) -> String {
    let mut out = String::new();

    let location = if s.country_code.is_empty() {
        s.city_name.clone()
    } else {
        format!("{}, {}", s.city_name, s.country_code)
    };
    let _ = writeln!(out, "{location}");
    let _ = writeln!(out, "  {}", title_case(&s.condition_description));
    let _ = writeln!(
        out,
        "  {:.1}°C (feels like {:.1}°C)  ↓ {:.1}°C  ↑ {:.1}°C",
        s.temperature_c, s.feels_like_c, s.min_c, s.max_c
    );
    let _ = writeln!(
        out,
        "  Humidity {}%  Wind {} m/s  Pressure {} hPa  Cloudiness {}%",
        s.humidity_pct, s.wind_speed_mps, s.pressure_hpa, s.cloudiness_pct
    );
    out
}

/// One-line card used for favorites.
pub fn favorite(city: &str, s: &WeatherSnapshot) -> String {
    format!(
        "{city}: {:.1}°C • {}",
        s.temperature_c,
        title_case(&s.condition_description)
    )
}

fn forecast_line(day: &ForecastEntry) -> String {
    format!(
        "  {:<10} {:>6.1}°C  ↓ {:.1}°C  ↑ {:.1}°C\n",
        day.day_label, day.temperature_c, day.min_c, day.max_c
    )
}

pub fn list(title: &str, entries: &[String], empty_hint: &str) -> String {
    if entries.is_empty() {
        return format!("{empty_hint}\n");
    }

    let mut out = format!("{title}:\n");
    for entry in entries {
        let _ = writeln!(out, "  {entry}");
    }
    out
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
