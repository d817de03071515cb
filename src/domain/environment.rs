// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deployment environments.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The closed set of environments a configuration can be resolved for.
///
/// The environment selects the default overlay and the environment-specific source file
/// (`.env.<environment>`).
///
/// # Examples
///
/// ```
/// use miaoda_config::domain::Environment;
///
/// let env: Environment = "Production".parse().unwrap();
/// assert_eq!(env, Environment::Production);
/// assert_eq!(env.to_string(), "production");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development.
    #[default]
    Development,
    /// Automated test runs.
    Test,
    /// Shipped builds.
    Production,
}

impl Environment {
    /// Every environment, in the order reports list them.
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Test,
        Environment::Production,
    ];

    /// The lowercase names of every environment.
    pub const NAMES: &'static [&'static str] = &["development", "test", "production"];

    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    /// Reads the environment from `NODE_ENV`, falling back to development.
    ///
    /// An unrecognized value is logged and ignored.
    pub fn from_process() -> Self {
        match std::env::var("NODE_ENV") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring unrecognized NODE_ENV '{}', using development", value);
                Environment::Development
            }),
            Err(_) => Environment::Development,
        }
    }

    /// Returns the name of the environment-specific source file.
    pub fn file_name(&self) -> String {
        format!(".env.{}", self.as_str())
    }
}

/// Error returned when parsing an unknown environment name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment '{0}', expected one of: development, test, production")]
pub struct UnknownEnvironment(pub String);

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" => Ok(Environment::Production),
            _ => Err(UnknownEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!(
            " development ".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn test_parse_unknown() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert_eq!(err, UnknownEnvironment("staging".to_string()));
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(Environment::Production.file_name(), ".env.production");
    }

    #[test]
    fn test_default() {
        assert_eq!(Environment::default(), Environment::Development);
    }

    #[test]
    fn test_names_match_variants() {
        let names: Vec<&str> = Environment::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(names, Environment::NAMES);
    }
}
