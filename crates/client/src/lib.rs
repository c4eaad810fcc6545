//! HTTP client for the attendify API
//!
//! Fetches pages of every collection, issues mutations and auth calls, and
//! validates every response body against a strict schema before it reaches
//! the caller.

mod auth;
mod client;
pub mod config;
pub mod credentials;
mod envelope;
pub mod error;
mod source;


pub use auth::{LoginResponse, parse_oauth_callback};
pub use client::{ApiClient, group_members_path};
pub use config::ClientConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{ApiError, CredentialsError, DecodeError};
pub use source::{Collection, PageSource};
