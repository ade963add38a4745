//! # Clipstream (Accounts & Session API)
//!
//! `clipstream` is the account and session authority for the clipstream video
//! platform. It owns user records, password verification, and the dual-token
//! (access + refresh) session lifecycle consumed by every other service.
//!
//! ## Sessions
//!
//! Authentication issues two signed, expiring JWTs carried as `HttpOnly`
//! cookies:
//!
//! - **Access token:** short-lived, verified on every request without a
//!   database lookup.
//! - **Refresh token:** longer-lived, mirrored on the user record, and
//!   **rotated** on every use. Presenting a refresh token that no longer
//!   matches the stored value ends the session.
//!
//! Each user has a single refresh-token slot: logging in again or refreshing
//! invalidates the previous token, and logout clears the slot entirely
//! (single active session per user, not multi-device).
//!
//! ## Scope
//!
//! Video, comment, playlist, like, and subscription resources live in other
//! services; they call back into this one only through the verification
//! gate in [`api::handlers::auth`].

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
