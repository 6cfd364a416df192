use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{
    fetch::{Fetcher, FetchError, build_url},
    model::{WeatherQuery, WeatherSnapshot},
};

/// How far past the observation time to look for expected precipitation.
const PRECIP_LOOKAHEAD_SECS: i64 = 600;

/// Source of normalized current conditions.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherSnapshot>;
}

/// OpenWeather One Call 3.0 client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    fetcher: Fetcher,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn one_call_url(&self, query: &WeatherQuery) -> Result<Url, FetchError> {
        let lat = format!("{:.6}", query.lat);
        let lon = format!("{:.6}", query.lon);
        let units = query.units.as_deref().unwrap_or("metric");
        let lang = query.lang.as_deref().unwrap_or("");

        build_url(
            &self.base_url,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", units),
                ("lang", lang),
            ],
        )
    }

    async fn fetch_one_call(&self, query: &WeatherQuery) -> Result<OneCallResponse, FetchError> {
        let url = self.one_call_url(query)?;
        tracing::debug!(lat = query.lat, lon = query.lon, "requesting One Call conditions");

        self.fetcher.get_json(url, &[]).await
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherClient {
    async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherSnapshot> {
        let parsed = self.fetch_one_call(query).await?;

        Ok(snapshot_from(parsed))
    }
}

#[derive(Debug, Deserialize)]
struct OneCallCurrent {
    dt: i64,
    temp: f64,
    humidity: u32,
    #[serde(default)]
    uvi: f64,
}

#[derive(Debug, Deserialize)]
struct MinutelyPoint {
    dt: i64,
    precipitation: f64,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: OneCallCurrent,
    /// Omitted entirely for locations without minutely coverage.
    #[serde(default)]
    minutely: Vec<MinutelyPoint>,
}

fn snapshot_from(parsed: OneCallResponse) -> WeatherSnapshot {
    WeatherSnapshot {
        uv_index: parsed.current.uvi,
        temperature_c: parsed.current.temp,
        humidity_percent: parsed.current.humidity,
        precip_10min: precip_at_lookahead(parsed.current.dt, &parsed.minutely),
    }
}

/// Pick the forecast precipitation ten minutes out.
///
/// Takes the first minutely point at or past the lookahead target. A series
/// that ends earlier falls back to its last point; an empty series reads as
/// no rain.
fn precip_at_lookahead(current_dt: i64, minutely: &[MinutelyPoint]) -> f64 {
    let target = current_dt + PRECIP_LOOKAHEAD_SECS;

    if let Some(point) = minutely.iter().find(|point| point.dt >= target) {
        return point.precipitation;
    }

    minutely.last().map_or(0.0, |point| point.precipitation)
}
