//! Core types for attendify
//!
//! Domain entities, list query state and shared constants used by the API
//! client, the view services and the CLI.

mod auth;
pub mod constants;
pub mod date_format;
mod entities;
pub mod env_config;
mod error;
mod page;
mod query;

pub use auth::*;
pub use constants::*;
pub use entities::*;
pub use error::*;
pub use page::*;
pub use query::*;
