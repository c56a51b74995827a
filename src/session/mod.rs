// src/session/mod.rs
//
// One dashboard session per browser: wires the gate, the KYC redirector and
// the dashboard aggregator to a portal token and the browser's local storage.

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod routes;
pub mod service;
pub mod ui;


pub use registry::SessionRegistry;
pub use routes::session_routes;
pub use service::DashboardSession;
