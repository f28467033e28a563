#![forbid(unsafe_code)]

//! Command-line argument parsing for the tour demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `GUIDEPOST_DEMO_*` prefix.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

use guidepost_core::skip::SkipMode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Guidepost Demo - guided tours on a headless data explorer

USAGE:
    guidepost-demo [OPTIONS]

OPTIONS:
    --tour=NAME          Tour to play (default: intro)
    --mode=MODE          Playback mode: n, ff or i (default: n)
    --frame-ms=N         Drive the clock in N ms frames; 0 jumps between
                         wake-ups (default: 0)
    --choose=N           Pick prompt item N (0-based) when the tour ends
    --flags-file=PATH    Keep the auto-start preference in a JSON file
    --auto               Respect the auto-start opt-out
    --list               List titled tours and exit
    --inputs             List the page's inputs for script writing and exit
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    GUIDEPOST_DEMO_TOUR        Override --tour
    GUIDEPOST_DEMO_MODE        Override --mode
    GUIDEPOST_DEMO_FRAME_MS    Override --frame-ms
    GUIDEPOST_DEMO_FLAGS_FILE  Override --flags-file
    RUST_LOG                   Log filter (default: warn)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Tour to play.
    pub tour: String,
    /// Playback mode override.
    pub mode: Option<SkipMode>,
    /// Frame length in ms; 0 jumps straight to each wake-up.
    pub frame_ms: u64,
    /// Prompt item to pick at the end.
    pub choose: Option<usize>,
    /// Persistent flag file.
    pub flags_file: Option<PathBuf>,
    /// Honour the auto-start opt-out.
    pub auto: bool,
    /// List tours instead of playing one.
    pub list: bool,
    /// List page inputs instead of playing a tour.
    pub inputs: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            tour: "intro".into(),
            mode: None,
            frame_ms: 0,
            choose: None,
            flags_file: None,
            auto: false,
            list: false,
            inputs: false,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Play (or list) with these options.
    Run(Opts),
    /// Print help.
    Help,
    /// Print the version.
    Version,
}

/// A command line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// A flag value failed to parse.
    InvalidValue {
        /// Flag name, without the leading dashes.
        flag: &'static str,
        /// Offending value.
        value: String,
    },
    /// Not a known flag.
    Unknown(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidValue { flag, value } => {
                write!(f, "Invalid --{flag} value: {value}")
            }
            CliError::Unknown(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment, exiting on `--help`,
    /// `--version` or an error.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("guidepost-demo {VERSION}");
                process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `lookup` standing in for the environment.
    ///
    /// Environment variables take precedence over defaults but are
    /// overridden by explicit command-line flags. Unparseable environment
    /// values are ignored.
    pub fn parse_from(
        args: impl IntoIterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, CliError> {
        let mut opts = Self::default();

        if let Some(val) = lookup("GUIDEPOST_DEMO_TOUR") {
            opts.tour = val;
        }
        if let Some(val) = lookup("GUIDEPOST_DEMO_MODE")
            && let Ok(mode) = val.parse()
        {
            opts.mode = Some(mode);
        }
        if let Some(val) = lookup("GUIDEPOST_DEMO_FRAME_MS")
            && let Ok(n) = val.parse()
        {
            opts.frame_ms = n;
        }
        if let Some(val) = lookup("GUIDEPOST_DEMO_FLAGS_FILE") {
            opts.flags_file = Some(PathBuf::from(val));
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--auto" => opts.auto = true,
                "--list" => opts.list = true,
                "--inputs" => opts.inputs = true,
                other => {
                    if let Some(val) = other.strip_prefix("--tour=") {
                        opts.tour = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--mode=") {
                        opts.mode = Some(val.parse().map_err(|_| CliError::InvalidValue {
                            flag: "mode",
                            value: val.to_string(),
                        })?);
                    } else if let Some(val) = other.strip_prefix("--frame-ms=") {
                        opts.frame_ms = val.parse().map_err(|_| CliError::InvalidValue {
                            flag: "frame-ms",
                            value: val.to_string(),
                        })?;
                    } else if let Some(val) = other.strip_prefix("--choose=") {
                        opts.choose = Some(val.parse().map_err(|_| CliError::InvalidValue {
                            flag: "choose",
                            value: val.to_string(),
                        })?);
                    } else if let Some(val) = other.strip_prefix("--flags-file=") {
                        opts.flags_file = Some(PathBuf::from(val));
                    } else {
                        return Err(CliError::Unknown(other.to_string()));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.tour, "intro");
        assert_eq!(opts.mode, None);
        assert_eq!(opts.frame_ms, 0);
        assert!(!opts.auto);
    }

    #[test]
    fn flags_parse() {
        let parsed = Opts::parse_from(
            args(&[
                "--tour=seasonal",
                "--mode=ff",
                "--frame-ms=16",
                "--choose=1",
                "--auto",
                "--inputs",
            ]),
            no_env,
        );
        let Ok(Parsed::Run(opts)) = parsed else {
            panic!("flag parse failed");
        };
        assert_eq!(opts.tour, "seasonal");
        assert_eq!(opts.mode, Some(SkipMode::FastForward));
        assert_eq!(opts.frame_ms, 16);
        assert_eq!(opts.choose, Some(1));
        assert!(opts.auto);
        assert!(opts.inputs);
    }

    #[test]
    fn flags_override_environment() {
        let env = |key: &str| match key {
            "GUIDEPOST_DEMO_TOUR" => Some("seasonal".to_string()),
            "GUIDEPOST_DEMO_MODE" => Some("i".to_string()),
            "GUIDEPOST_DEMO_FRAME_MS" => Some("oops".to_string()),
            _ => None,
        };
        let Ok(Parsed::Run(from_env)) = Opts::parse_from(Vec::new(), env) else {
            panic!("env-only parse failed");
        };
        assert_eq!(from_env.tour, "seasonal");
        assert_eq!(from_env.mode, Some(SkipMode::Instant));
        assert_eq!(from_env.frame_ms, 0);

        let Ok(Parsed::Run(flagged)) = Opts::parse_from(args(&["--mode=n"]), env) else {
            panic!("flag parse failed");
        };
        assert_eq!(flagged.mode, Some(SkipMode::Normal));
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(
            Opts::parse_from(args(&["--mode=warp"]), no_env),
            Err(CliError::InvalidValue {
                flag: "mode",
                value: "warp".into()
            })
        );
        assert_eq!(
            Opts::parse_from(args(&["--fast"]), no_env),
            Err(CliError::Unknown("--fast".into()))
        );
        assert_eq!(Opts::parse_from(args(&["-h"]), no_env), Ok(Parsed::Help));
    }

    #[test]
    fn help_text_lists_options() {
        assert!(HELP_TEXT.contains("--tour=NAME"));
        assert!(HELP_TEXT.contains("GUIDEPOST_DEMO_MODE"));
        assert!(!VERSION.is_empty());
    }
}
