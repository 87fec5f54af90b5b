//! Greenlight core domain logic.
//!
//! Pure logic with no database or HTTP dependencies: field validation,
//! the list-endpoint pagination planner, the movie model, the storage
//! contract consumed by the API, and the optimistic-concurrency updater.

pub mod error;
pub mod filters;
pub mod memory_store;
pub mod movie;
pub mod store;
pub mod types;
pub mod update;
pub mod validator;
