//! Binary crate for the commute dashboard API server.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading configuration
//! - Wiring the upstream gateways into shared application state
//! - Serving the aggregated dashboard routes

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use commute_core::{Config, Fetcher, GbfsClient, OpenWeatherClient};

mod handlers;
mod routes;

use handlers::AppState;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "commute-server", version, about = "Commute dashboard API server")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. "0.0.0.0:8080"; overrides the configured one.
    #[arg(long)]
    bind: Option<String>,
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let bind_addr = cli.bind.unwrap_or_else(|| config.server.bind_addr.clone());

    if config.weather.api_key.is_empty() {
        tracing::warn!("OPENWEATHER_API_KEY not set; weather lookups will fail");
    }

    let fetcher = Fetcher::new(config.upstream_timeout()).context("Failed to build HTTP client")?;
    let weather = OpenWeatherClient::new(
        fetcher.clone(),
        config.weather.base_url.clone(),
        config.weather.api_key.clone(),
    );
    let bikes = GbfsClient::new(fetcher, &config.gbfs.base_url);

    let state = AppState {
        weather: Arc::new(weather),
        bikes: Arc::new(bikes),
        request_timeout: config.request_timeout(),
    };

    tracing::info!(addr = %bind_addr, "server listening");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION]);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {bind_addr}"))?
    .run()
    .await?;

    Ok(())
}
