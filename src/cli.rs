use chrono::NaiveDate;
use std::path::PathBuf;

pub const USAGE: &str = "Requires 3 arguments:
\t path-to-primary-ics path-to-secondary-ics start-date(yyyy-mm-dd)

Options:
\t --config <path>  Read report settings from a TOML file
\t --verbose        Log debug details to stderr
\t --help           Show this message";

/// Flags that take a value
const VALUE_FLAGS: &[&str] = &["--config"];
/// Flags that stand alone
const SWITCH_FLAGS: &[&str] = &["--verbose", "--help", "-h"];

/// Command line arguments structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub primary: PathBuf,
    pub secondary: PathBuf,
    pub start: NaiveDate,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Wrong arguments or `--help`; the usage text should be shown
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    InvalidDate(#[from] chrono::ParseError),
}

impl CliArgs {
    /// Parse the arguments after the program name.
    ///
    /// Arity is checked before the start date is parsed.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, CliError> {
        let mut positional = Vec::new();
        let mut config = None;
        let mut verbose = false;

        let mut iter = args.iter().map(AsRef::as_ref);
        while let Some(arg) = iter.next() {
            if VALUE_FLAGS.contains(&arg) {
                let value = iter
                    .next()
                    .ok_or_else(|| CliError::Usage(format!("{} requires a value", arg)))?;
                config = Some(PathBuf::from(value));
            } else if SWITCH_FLAGS.contains(&arg) {
                match arg {
                    "--verbose" => verbose = true,
                    _ => return Err(CliError::Usage("help requested".to_string())),
                }
            } else if arg.starts_with("--") {
                return Err(CliError::Usage(format!("unknown flag {}", arg)));
            } else {
                positional.push(arg);
            }
        }

        let [primary, secondary, start] = positional[..] else {
            return Err(CliError::Usage(format!(
                "expected 3 arguments, got {}",
                positional.len()
            )));
        };
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")?;

        Ok(CliArgs {
            primary: PathBuf::from(primary),
            secondary: PathBuf::from(secondary),
            start,
            config,
            verbose,
        })
    }
}
