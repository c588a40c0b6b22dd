mod config;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod upstream;
mod utils;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use service::{dashboard_service::DashboardService, notification_hub::NotificationHub};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;
use upstream::{ApiClient, BrokerApi};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardService>,
    pub notifications: Arc<NotificationHub>,
}

impl AppState {
    pub fn new(config: &Config, api: Arc<dyn BrokerApi>) -> Self {
        AppState {
            dashboard: Arc::new(DashboardService::new(api.clone(), config)),
            notifications: Arc::new(NotificationHub::new(api, config)),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
    .with_max_level(LevelFilter::DEBUG)
    .init();

    dotenv().ok();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            println!("🔥 Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let api = match ApiClient::new(config.api_base_url.clone(), config.request_timeout) {
        Ok(client) => {
            println!("✅Property API client ready for {}", config.api_base_url);
            client
        }
        Err(err) => {
            println!("🔥 Failed to build the property API client: {}", err);
            std::process::exit(1);
        }
    };

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring malformed origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET]);

    let app_state = AppState::new(&config, Arc::new(api));

    let app = create_router(Arc::new(app_state)).layer(cors);

    println!(
        "{}",
        format!("🚀 Server is running on http://localhost:{}", config.port)
    );

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            println!("🔥 Failed to bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(listener, app).await {
        println!("🔥 Server error: {}", err);
        std::process::exit(1);
    }
}
