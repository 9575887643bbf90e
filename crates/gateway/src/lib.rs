pub mod config;
pub mod logging;
pub mod routes;
pub mod state;
