//! Account credentials and the session lifecycle.
//!
//! Submodules, leaf to root: [`tokens`] signs and verifies the access/refresh
//! pair, [`store`] defines the credential-store seam ([`storage`] is the
//! Postgres implementation), [`service`] orchestrates the flows, and
//! [`session`]/[`principal`] expose them to the HTTP layer.

pub mod error;
pub mod principal;
pub mod service;
pub mod session;
pub mod state;
pub mod store;
pub mod storage;
pub mod tokens;
pub mod types;

mod password;
mod utils;

#[cfg(test)]
mod test_support;

pub use error::AuthFlowError;
pub use principal::{Principal, require_auth};
pub use state::{AuthConfig, AuthState};
