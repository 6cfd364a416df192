//! Core library for the commute dashboard backend.
//!
//! This crate defines:
//! - Configuration handling
//! - Fetch plumbing shared by the upstream HTTP clients
//! - Gateways for weather conditions and bike-share availability
//! - The shuttle timetable and the shared response models
//!
//! It is used by `commute-server`, but can also be reused by other binaries or services.

pub mod bikeshare;
pub mod bus;
pub mod config;
pub mod fetch;
pub mod model;
pub mod weather;

pub use bikeshare::{BikeGateway, GbfsClient};
pub use config::Config;
pub use fetch::{FetchError, Fetcher};
pub use model::{
    AppData, BikeTotals, BusInfo, CycleSummary, Direction, GroupTotals, WeatherQuery,
    WeatherSnapshot,
};
pub use weather::{OpenWeatherClient, WeatherGateway};
