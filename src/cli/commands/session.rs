use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

use crate::auth::Environment;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_PUBLIC_URL: &str = "public-url";

fn parse_environment(value: &str) -> std::result::Result<Environment, String> {
    value.parse()
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("HMAC secret used to sign session cookies")
                .long_help(
                    "HMAC secret used to sign session cookies. Required in production; changing it logs every user out.",
                )
                .env("CAREER_BOARD_SESSION_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("CAREER_BOARD_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment: development or production")
                .env("CAREER_BOARD_ENV")
                .default_value("development")
                .value_parser(parse_environment),
        )
        .arg(
            Arg::new(ARG_PUBLIC_URL)
                .long(ARG_PUBLIC_URL)
                .help("Public base URL; https marks session cookies Secure")
                .env("CAREER_BOARD_PUBLIC_URL")
                .default_value("http://localhost:8080"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub secret: Option<SecretString>,
    pub ttl_seconds: u64,
    pub environment: Environment,
    pub public_url: String,
}

impl Options {
    /// # Errors
    /// Returns an error if the public URL is not a valid absolute URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let public_url = matches
            .get_one::<String>(ARG_PUBLIC_URL)
            .cloned()
            .context("missing required argument: --public-url")?;
        Url::parse(&public_url).with_context(|| format!("Invalid public URL: {public_url}"))?;

        Ok(Self {
            secret: matches
                .get_one::<String>(ARG_SESSION_SECRET)
                .map(|secret| SecretString::from(secret.as_str())),
            ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(604_800),
            environment: matches
                .get_one::<Environment>(ARG_ENVIRONMENT)
                .copied()
                .unwrap_or(Environment::Development),
            public_url,
        })
    }
}
