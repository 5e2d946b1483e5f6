//! Credential handling for the upstream scheduling API
//!
//! The OAuth token is modeled as an explicit capability injected into the
//! request path so it can be faked in tests. Token acquisition and refresh
//! happen outside this service.

pub mod provider;

// Re-export commonly used types
pub use provider::{AccessToken, CredentialProvider, StaticCredentialProvider};
