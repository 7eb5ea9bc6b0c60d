//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{admin, session};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches.get_one::<String>("dsn").cloned();

    let session_opts = session::Options::parse(matches)?;
    let admin_opts = admin::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        public_url: session_opts.public_url,
        session_secret: session_opts.secret,
        session_ttl_seconds: session_opts.ttl_seconds,
        environment: session_opts.environment,
        admin_email: admin_opts.email,
        admin_password: admin_opts.password,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Environment;
    use secrecy::ExposeSecret;

    #[test]
    fn maps_arguments_to_server_action() -> Result<()> {
        temp_env::with_vars([("CAREER_BOARD_DSN", None::<&str>)], || -> Result<()> {
            let command = crate::cli::commands::new();
            let matches = command.try_get_matches_from(vec![
                "career-board",
                "--port",
                "3000",
                "--session-secret",
                "0123456789abcdef0123456789abcdef",
                "--environment",
                "production",
                "--public-url",
                "https://jobs.example.com",
                "--admin-password",
                "hunter22",
            ])?;

            let Action::Server(args) = handler(&matches)?;
            assert_eq!(args.port, 3000);
            assert_eq!(args.dsn, None);
            assert_eq!(args.environment, Environment::Production);
            assert_eq!(args.public_url, "https://jobs.example.com");
            assert_eq!(
                args.session_secret
                    .as_ref()
                    .map(|secret| secret.expose_secret().to_string()),
                Some("0123456789abcdef0123456789abcdef".to_string())
            );
            assert_eq!(
                args.admin_password
                    .as_ref()
                    .map(|password| password.expose_secret().to_string()),
                Some("hunter22".to_string())
            );
            Ok(())
        })
    }

    #[test]
    fn invalid_public_url_is_rejected() -> Result<()> {
        let command = crate::cli::commands::new();
        let matches =
            command.try_get_matches_from(vec!["career-board", "--public-url", "not a url"])?;
        let result = handler(&matches);
        assert!(result.is_err_and(|err| err.to_string().contains("Invalid public URL")));
        Ok(())
    }

    #[test]
    fn debug_output_hides_secrets() -> Result<()> {
        let command = crate::cli::commands::new();
        let matches = command.try_get_matches_from(vec![
            "career-board",
            "--session-secret",
            "super-secret-value",
            "--admin-password",
            "admin-secret-value",
        ])?;
        let action = handler(&matches)?;
        let rendered = format!("{action:?}");
        assert!(!rendered.contains("super-secret-value"));
        assert!(!rendered.contains("admin-secret-value"));
        Ok(())
    }
}
