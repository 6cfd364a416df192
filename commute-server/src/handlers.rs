use std::sync::Arc;
use std::time::Duration;

use actix_web::{HttpResponse, web};
use anyhow::anyhow;
use serde::Deserialize;
use serde_json::json;
use tokio::time::timeout;

use commute_core::{
    AppData, BikeGateway, BikeTotals, BusInfo, CycleSummary, Direction, WeatherGateway,
    WeatherQuery, bus, model::APP_TITLE,
};

const DEFAULT_LAT: f64 = 35.813583;
const DEFAULT_LON: f64 = 139.565710;

/// Shared application state, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<dyn WeatherGateway>,
    pub bikes: Arc<dyn BikeGateway>,
    /// Budget for one inbound request; each upstream call runs under it.
    pub request_timeout: Duration,
}

/// Query parameters accepted by the dashboard routes.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    lat: Option<f64>,
    lon: Option<f64>,
    units: Option<String>,
    lang: Option<String>,
}

impl DashboardQuery {
    fn weather_query(&self) -> WeatherQuery {
        WeatherQuery {
            lat: self.lat.unwrap_or(DEFAULT_LAT),
            lon: self.lon.unwrap_or(DEFAULT_LON),
            units: self.units.clone(),
            lang: self.lang.clone(),
        }
    }
}

pub async fn app_to_school(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> HttpResponse {
    dashboard(Direction::ToCampus, &state, &query).await
}

pub async fn app_to_home(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> HttpResponse {
    dashboard(Direction::ToHome, &state, &query).await
}

pub async fn cycle_to_school(state: web::Data<AppState>) -> HttpResponse {
    cycle_only(Direction::ToCampus, &state).await
}

pub async fn cycle_to_home(state: web::Data<AppState>) -> HttpResponse {
    cycle_only(Direction::ToHome, &state).await
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Assemble the full dashboard payload for one direction.
///
/// A weather failure fails the whole request; bike totals degrade to zeroes
/// so the client still renders the rest.
async fn dashboard(direction: Direction, state: &AppState, query: &DashboardQuery) -> HttpResponse {
    let weather_query = query.weather_query();

    let (weather, bikes) = tokio::join!(
        timeout(state.request_timeout, state.weather.current_weather(&weather_query)),
        timeout(state.request_timeout, state.bikes.bike_totals()),
    );

    let weather = weather.unwrap_or_else(|_| Err(anyhow!("weather request timed out")));
    let weather = match weather {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::error!("weather upstream failed: {err:#}");
            return HttpResponse::BadGateway().json(json!({ "error": err.to_string() }));
        }
    };
    let bikes = bike_totals_or_zero(bikes);

    let payload = AppData {
        title: APP_TITLE.to_string(),
        weather,
        bus: next_bus(direction),
        cycle: CycleSummary::for_direction(direction, &bikes),
    };
    tracing::info!(
        ?direction,
        departure = payload.cycle.available_at_departure,
        destination = payload.cycle.available_at_destination,
        "dashboard served"
    );

    HttpResponse::Ok().json(payload)
}

async fn cycle_only(direction: Direction, state: &AppState) -> HttpResponse {
    let bikes = timeout(state.request_timeout, state.bikes.bike_totals()).await;
    let bikes = bike_totals_or_zero(bikes);
    tracing::info!(?direction, "cycle summary served");

    HttpResponse::Ok().json(CycleSummary::for_direction(direction, &bikes))
}

fn bike_totals_or_zero(
    result: Result<anyhow::Result<BikeTotals>, tokio::time::error::Elapsed>,
) -> BikeTotals {
    match result {
        Ok(Ok(totals)) => totals,
        Ok(Err(err)) => {
            tracing::warn!("bike totals unavailable: {err:#}");
            BikeTotals::default()
        }
        Err(_) => {
            tracing::warn!("bike totals request timed out");
            BikeTotals::default()
        }
    }
}

fn next_bus(direction: Direction) -> BusInfo {
    let next_departure = bus::next_departure_now(direction)
        .map(|departure| departure.label())
        .unwrap_or_else(|| bus::NO_SERVICE_LABEL.to_string());

    BusInfo { next_departure, line: bus::LINE_NAME.to_string() }
}
