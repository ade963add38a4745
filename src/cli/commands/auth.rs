use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ACCESS_TOKEN_SECRET: &str = "access-token-secret";
pub const ARG_REFRESH_TOKEN_SECRET: &str = "refresh-token-secret";
pub const ARG_ACCESS_TOKEN_TTL: &str = "access-token-ttl-seconds";
pub const ARG_REFRESH_TOKEN_TTL: &str = "refresh-token-ttl-seconds";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_SECRET)
                .long(ARG_ACCESS_TOKEN_SECRET)
                .help("Signing secret for access tokens")
                .env("CLIPSTREAM_ACCESS_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_SECRET)
                .long(ARG_REFRESH_TOKEN_SECRET)
                .help("Signing secret for refresh tokens, must differ from the access secret")
                .env("CLIPSTREAM_REFRESH_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL)
                .long(ARG_ACCESS_TOKEN_TTL)
                .help("Access token TTL in seconds")
                .env("CLIPSTREAM_ACCESS_TOKEN_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_TTL)
                .long(ARG_REFRESH_TOKEN_TTL)
                .help("Refresh token TTL in seconds")
                .env("CLIPSTREAM_REFRESH_TOKEN_TTL_SECONDS")
                .default_value("864000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL allowed by CORS")
                .env("CLIPSTREAM_FRONTEND_BASE_URL")
                .default_value("https://clipstream.dev"),
        )
}

pub struct Options {
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub frontend_base_url: String,
}

impl Options {
    /// Collect token and cookie options from CLI matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing or the two signing
    /// secrets are identical (a shared secret would let a leaked access token
    /// pass as a refresh token).
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let access_token_secret = matches
            .get_one::<String>(ARG_ACCESS_TOKEN_SECRET)
            .cloned()
            .context("missing required argument: --access-token-secret")?;
        let refresh_token_secret = matches
            .get_one::<String>(ARG_REFRESH_TOKEN_SECRET)
            .cloned()
            .context("missing required argument: --refresh-token-secret")?;

        if access_token_secret == refresh_token_secret {
            return Err(anyhow!(
                "--access-token-secret and --refresh-token-secret must differ"
            ));
        }

        let access_token_ttl_seconds = matches
            .get_one::<i64>(ARG_ACCESS_TOKEN_TTL)
            .copied()
            .unwrap_or(900);
        let refresh_token_ttl_seconds = matches
            .get_one::<i64>(ARG_REFRESH_TOKEN_TTL)
            .copied()
            .unwrap_or(864_000);

        if access_token_ttl_seconds <= 0 || refresh_token_ttl_seconds <= 0 {
            return Err(anyhow!("token TTLs must be positive"));
        }

        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .unwrap_or_else(|| "https://clipstream.dev".to_string());

        Ok(Self {
            access_token_secret: SecretString::from(access_token_secret),
            refresh_token_secret: SecretString::from(refresh_token_secret),
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            frontend_base_url,
        })
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("access_token_secret", &"***")
            .field("refresh_token_secret", &"***")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("frontend_base_url", &self.frontend_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn matches_from(args: Vec<&str>) -> ArgMatches {
        crate::cli::commands::new().get_matches_from(args)
    }

    #[test]
    fn parse_defaults() {
        temp_env::with_vars(
            [
                ("CLIPSTREAM_ACCESS_TOKEN_TTL_SECONDS", None::<&str>),
                ("CLIPSTREAM_REFRESH_TOKEN_TTL_SECONDS", None::<&str>),
                ("CLIPSTREAM_FRONTEND_BASE_URL", None::<&str>),
            ],
            || {
                let matches = matches_from(vec![
                    "clipstream",
                    "--dsn",
                    "postgres://localhost/clipstream",
                    "--access-token-secret",
                    "access-secret",
                    "--refresh-token-secret",
                    "refresh-secret",
                ]);
                let options = Options::parse(&matches).expect("options should parse");
                assert_eq!(options.access_token_secret.expose_secret(), "access-secret");
                assert_eq!(
                    options.refresh_token_secret.expose_secret(),
                    "refresh-secret"
                );
                assert_eq!(options.access_token_ttl_seconds, 900);
                assert_eq!(options.refresh_token_ttl_seconds, 864_000);
                assert_eq!(options.frontend_base_url, "https://clipstream.dev");
            },
        );
    }

    #[test]
    fn parse_rejects_identical_secrets() {
        let matches = matches_from(vec![
            "clipstream",
            "--dsn",
            "postgres://localhost/clipstream",
            "--access-token-secret",
            "same-secret",
            "--refresh-token-secret",
            "same-secret",
        ]);
        let result = Options::parse(&matches);
        assert!(result.is_err());
    }

    #[test]
    fn parse_rejects_non_positive_ttl() {
        let matches = matches_from(vec![
            "clipstream",
            "--dsn",
            "postgres://localhost/clipstream",
            "--access-token-secret",
            "access-secret",
            "--refresh-token-secret",
            "refresh-secret",
            "--access-token-ttl-seconds",
            "0",
        ]);
        let result = Options::parse(&matches);
        assert!(result.is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let matches = matches_from(vec![
            "clipstream",
            "--dsn",
            "postgres://localhost/clipstream",
            "--access-token-secret",
            "access-secret",
            "--refresh-token-secret",
            "refresh-secret",
        ]);
        let options = Options::parse(&matches).expect("options should parse");
        let debug = format!("{options:?}");
        assert!(!debug.contains("access-secret"));
        assert!(!debug.contains("refresh-secret"));
    }
}
