// Library exports for Linkboard
// This allows integration tests and external code to use Linkboard modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod links;
pub mod routes;
pub mod state;
