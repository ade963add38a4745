use crate::api::{self, handlers::auth::AuthConfig};
use anyhow::Result;
use secrecy::SecretString;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub frontend_base_url: String,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn)
            .field("access_token_secret", &"***")
            .field("refresh_token_secret", &"***")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field(
                "refresh_token_ttl_seconds",
                &self.refresh_token_ttl_seconds,
            )
            .field("frontend_base_url", &self.frontend_base_url)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database connection or the listener setup fails.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.access_token_secret, args.refresh_token_secret)
        .with_access_token_ttl_seconds(args.access_token_ttl_seconds)
        .with_refresh_token_ttl_seconds(args.refresh_token_ttl_seconds)
        .with_frontend_base_url(args.frontend_base_url);

    api::new(args.port, args.dsn, auth_config).await
}

#[cfg(test)]
mod tests {
    use super::Args;
    use secrecy::SecretString;

    #[test]
    fn debug_redacts_secrets() {
        let args = Args {
            port: 8080,
            dsn: "postgres://localhost/clipstream".to_string(),
            access_token_secret: SecretString::from("access-secret"),
            refresh_token_secret: SecretString::from("refresh-secret"),
            access_token_ttl_seconds: 900,
            refresh_token_ttl_seconds: 864_000,
            frontend_base_url: "https://clipstream.dev".to_string(),
        };
        let debug = format!("{args:?}");
        assert!(!debug.contains("access-secret"));
        assert!(!debug.contains("refresh-secret"));
        assert!(debug.contains("postgres://localhost/clipstream"));
    }
}
