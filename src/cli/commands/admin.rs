use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ADMIN_EMAIL: &str = "admin-email";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_EMAIL)
                .long(ARG_ADMIN_EMAIL)
                .help("Email of the admin account seeded at startup")
                .env("CAREER_BOARD_ADMIN_EMAIL")
                .default_value("admin@example.com"),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Password of the seeded admin account")
                .long_help(
                    "Password of the seeded admin account. Defaults to admin123 in development; in production seeding is skipped without it.",
                )
                .env("CAREER_BOARD_ADMIN_PASSWORD")
                .hide_env_values(true),
        )
}

#[derive(Debug)]
pub struct Options {
    pub email: String,
    pub password: Option<SecretString>,
}

impl Options {
    /// # Errors
    /// Returns an error if the admin email is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            email: matches
                .get_one::<String>(ARG_ADMIN_EMAIL)
                .cloned()
                .context("missing required argument: --admin-email")?,
            password: matches
                .get_one::<String>(ARG_ADMIN_PASSWORD)
                .map(|password| SecretString::from(password.as_str())),
        })
    }
}
