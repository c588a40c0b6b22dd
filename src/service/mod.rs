pub mod aggregator;
pub mod column_filter;
pub mod dashboard_service;
pub mod date_range;
pub mod error;
pub mod fetch_state;
pub mod normalizer;
pub mod notification_hub;
pub mod paginator;
pub mod trailing_window;
