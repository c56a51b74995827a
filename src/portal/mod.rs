// src/portal/mod.rs
//
// Upstream job-portal API: typed client, wire models, collaborator traits

pub mod api;
pub mod client;
pub mod error;
pub mod models;

pub use api::{CompanyDirectory, DashboardApi, ProfileFetcher};
pub use client::PortalClient;
pub use error::ClientError;
