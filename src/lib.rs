//! parkcast-api — visitor-forecasting API gateway for US National Parks.
//!
//! Fronts the external ML prediction service with a browser-facing API:
//! request validation, translation between the upstream and public JSON
//! schemas, coordinate enrichment from a static table, combined health
//! reporting, and the dashboard's per-park map aggregation controller.

pub mod config;
pub mod coords;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
