use serde::{Deserialize, Serialize};

/// Display title of the dashboard payload.
pub const APP_TITLE: &str = "Campus Commute";

/// Display names for the two commute endpoints.
pub const CAMPUS_NAME: &str = "Niiza Campus";
pub const STATION_NAME: &str = "Niiza Station";

/// Normalized current conditions.
///
/// Field names on the wire are fixed by the mobile client's decoder:
/// `uvIndex`, `temperatureC`, `humidityPercent`, `precip10min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub uv_index: f64,
    pub temperature_c: f64,
    pub humidity_percent: u32,
    #[serde(rename = "precip10min")]
    pub precip_10min: f64,
}

/// Parameters for one weather lookup.
#[derive(Debug, Clone)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    /// Upstream unit system; `None` falls back to metric.
    pub units: Option<String>,
    pub lang: Option<String>,
}

/// Availability for one station group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub rentable: u32,
    pub returnable: u32,
}

/// Aggregate bike-share availability for the nearest-station group and the
/// campus group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BikeTotals {
    pub station: GroupTotals,
    pub campus: GroupTotals,
}

/// Which way the commute goes. Decides which group's rentable and
/// returnable figures map to departure and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToCampus,
    ToHome,
}

/// Cycle section of the dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub departure_name: String,
    pub destination_name: String,
    pub available_at_departure: u32,
    pub available_at_destination: u32,
}

impl CycleSummary {
    /// Map group totals onto a departure/destination pair.
    ///
    /// Riders need a bike to rent where they start and a free dock where
    /// they arrive, so the two sides read different figures from `totals`.
    pub fn for_direction(direction: Direction, totals: &BikeTotals) -> Self {
        match direction {
            Direction::ToCampus => Self {
                departure_name: STATION_NAME.to_string(),
                destination_name: CAMPUS_NAME.to_string(),
                available_at_departure: totals.station.rentable,
                available_at_destination: totals.campus.returnable,
            },
            Direction::ToHome => Self {
                departure_name: CAMPUS_NAME.to_string(),
                destination_name: STATION_NAME.to_string(),
                available_at_departure: totals.campus.rentable,
                available_at_destination: totals.station.returnable,
            },
        }
    }
}

/// Bus section of the dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusInfo {
    /// Next shuttle departure as `HH:MM`, or a placeholder when the
    /// timetable has nothing left to offer.
    pub next_departure: String,
    pub line: String,
}

/// Everything the dashboard needs for one commute direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub title: String,
    pub weather: WeatherSnapshot,
    pub bus: BusInfo,
    pub cycle: CycleSummary,
}
