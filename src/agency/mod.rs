// src/agency/mod.rs

pub mod redirector;

pub use redirector::AgencyVerificationRedirector;
