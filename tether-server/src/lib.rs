// Library exports for tether-server
// This allows integration tests to use tether-server modules

pub mod api;
pub mod config;
pub mod db;
pub mod session;
pub mod state;
