pub mod api;
pub mod config;
pub mod form;
pub mod http_client;
pub mod plan;
pub mod plan_view;
pub mod position_cache;
pub mod provider;
pub mod reference;
pub mod schema;
pub mod session;
pub mod state;
