//! API handlers for the clipstream accounts service.
//!
//! `auth` carries the session core (tokens, store, service, middleware);
//! `users` exposes account self-service on top of it.

pub mod auth;
pub mod health;
pub mod root;
pub mod users;
