// src/profile_gate/mod.rs

pub mod controller;
pub mod models;
pub mod scheduler;
pub mod snooze;
pub mod store;
pub mod validators;

#[cfg(test)]
mod tests;

pub use controller::ProfileGateController;
pub use store::{
    CompletionCache, KeyValueStore, MemoryStorage, PersistedCompletionStore, SqliteStorage,
    UserBlobCache,
};
