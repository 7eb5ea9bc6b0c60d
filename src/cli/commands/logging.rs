//! `-v` / `CAREER_BOARD_LOG_LEVEL`.
//!
//! Both forms end up as a count: `0` is errors only and each step adds one
//! level, up to `4` for trace. `cli::start` maps the count to a tracing level.

use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name (any case) or a number from 0 to 5.
fn parse_log_level(level: &str) -> Result<u8, String> {
    if let Ok(count) = level.parse::<u8>() {
        return if count <= 5 {
            Ok(count)
        } else {
            Err(format!("log level {count} is out of range (0-5)"))
        };
    }

    let name = level.trim().to_lowercase();
    LEVELS
        .iter()
        .position(|candidate| *candidate == name)
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level: {level}"))
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(parse_log_level)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("CAREER_BOARD_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_counts() {
        assert_eq!(parse_log_level("error"), Ok(0));
        assert_eq!(parse_log_level("WARN"), Ok(1));
        assert_eq!(parse_log_level(" Info "), Ok(2));
        assert_eq!(parse_log_level("debug"), Ok(3));
        assert_eq!(parse_log_level("trace"), Ok(4));
    }

    #[test]
    fn numbers_are_bounded() {
        assert_eq!(parse_log_level("0"), Ok(0));
        assert_eq!(parse_log_level("5"), Ok(5));
        assert!(parse_log_level("6").is_err());
        assert!(parse_log_level("-1").is_err());
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }
}
