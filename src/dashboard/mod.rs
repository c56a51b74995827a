// src/dashboard/mod.rs

pub mod aggregator;
pub mod models;


pub use aggregator::DashboardDataAggregator;
pub use models::{DashboardFailure, DashboardView, LoadOutcome};
