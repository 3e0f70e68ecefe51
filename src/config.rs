//! Translator configuration and database credentials
//!
//! Nothing here is global: a [`TranslatorConfig`] is built by the caller and
//! handed to [`crate::Translator::new`]. Credentials for `EXEC SQL` are
//! resolved by [`CredentialResolver`] from a key=value file, then from the
//! `PLIPY_DB_*` environment variables.

use std::fmt;
use std::path::{Path, PathBuf};

/// Spaces per indentation level in the translated procedure
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Widest indentation accepted by [`TranslatorConfig::with_indent_width`]
pub const MAX_INDENT_WIDTH: usize = 16;

pub const ENV_DB_HOST: &str = "PLIPY_DB_HOST";
pub const ENV_DB_USER: &str = "PLIPY_DB_USER";
pub const ENV_DB_PASSWORD: &str = "PLIPY_DB_PASSWORD";
pub const ENV_DB_NAME: &str = "PLIPY_DB_NAME";

/// Errors raised while building configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read credentials file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials are missing the '{0}' key")]
    MissingKey(&'static str),

    #[error("line {line}: expected 'key = value', found '{text}'")]
    Malformed { line: usize, text: String },

    #[error("line {line}: unknown credentials key '{key}'")]
    UnknownKey { line: usize, key: String },

    #[error("indent width must be between 1 and {max}, found {0}", max = MAX_INDENT_WIDTH)]
    InvalidIndent(usize),
}

/// Connection parameters for the generated query helper
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl Credentials {
    /// Parse `key = value` lines. `#` starts a comment line; blank lines are
    /// ignored; values may be wrapped in single or double quotes.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut host = None;
        let mut user = None;
        let mut password = None;
        let mut database = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Malformed {
                    line: index + 1,
                    text: line.to_string(),
                });
            };
            let value = unquote(value.trim()).to_string();

            let slot = match key.trim().to_ascii_lowercase().as_str() {
                "host" => &mut host,
                "user" => &mut user,
                "password" => &mut password,
                "database" => &mut database,
                other => {
                    return Err(ConfigError::UnknownKey {
                        line: index + 1,
                        key: other.to_string(),
                    })
                }
            };
            *slot = Some(value);
        }

        Ok(Self {
            host: host.ok_or(ConfigError::MissingKey("host"))?,
            user: user.ok_or(ConfigError::MissingKey("user"))?,
            password: password.ok_or(ConfigError::MissingKey("password"))?,
            database: database.ok_or(ConfigError::MissingKey("database"))?,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Where resolved credentials came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    File,
    Environment,
}

/// Resolves credentials: an explicit file first, then the environment
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    file: Option<PathBuf>,
}

impl CredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
        }
    }

    /// Resolve against the process environment
    pub fn resolve(&self) -> Result<Option<(Credentials, CredentialSource)>, ConfigError> {
        self.resolve_from(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    ///
    /// A configured file that cannot be read or parsed is an error; it never
    /// falls through to the environment. The environment only counts when
    /// all four `PLIPY_DB_*` variables are set.
    pub fn resolve_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<(Credentials, CredentialSource)>, ConfigError> {
        if let Some(path) = &self.file {
            let credentials = Credentials::load(path)?;
            tracing::debug!(path = %path.display(), "credentials loaded from file");
            return Ok(Some((credentials, CredentialSource::File)));
        }

        let from_env = (|| {
            Some(Credentials {
                host: lookup(ENV_DB_HOST)?,
                user: lookup(ENV_DB_USER)?,
                password: lookup(ENV_DB_PASSWORD)?,
                database: lookup(ENV_DB_NAME)?,
            })
        })();

        match from_env {
            Some(credentials) => {
                tracing::debug!("credentials loaded from environment");
                Ok(Some((credentials, CredentialSource::Environment)))
            }
            None => Ok(None),
        }
    }
}

/// Per-translation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    pub indent_width: usize,
    /// Embedded into the query helper. When `None` the helper reads the
    /// `PLIPY_DB_*` variables when the generated program runs.
    pub credentials: Option<Credentials>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            credentials: None,
        }
    }
}

impl TranslatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent_width(mut self, width: usize) -> Result<Self, ConfigError> {
        if width == 0 || width > MAX_INDENT_WIDTH {
            return Err(ConfigError::InvalidIndent(width));
        }
        self.indent_width = width;
        Ok(self)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    const SAMPLE: &str = "\
# sakila sample database
host = localhost
user = root
password = \"s3cret\"

database = sakila
";

    fn sample() -> Credentials {
        Credentials {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: "s3cret".to_string(),
            database: "sakila".to_string(),
        }
    }

    #[test]
    fn test_parse_credentials() {
        assert_eq!(Credentials::parse(SAMPLE).unwrap(), sample());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Credentials::parse("host = h\nuser = u\npassword = p"),
            Err(ConfigError::MissingKey("database"))
        ));
        assert!(matches!(
            Credentials::parse("host localhost"),
            Err(ConfigError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            Credentials::parse("# c\nport = 3306"),
            Err(ConfigError::UnknownKey { line: 2, .. })
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_resolve_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.conf");
        fs::write(&path, SAMPLE).unwrap();

        let resolver = CredentialResolver::with_file(&path);
        let (credentials, source) = resolver
            .resolve_from(|_| Some("from-env".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(source, CredentialSource::File);
        assert_eq!(credentials, sample());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CredentialResolver::with_file(dir.path().join("absent.conf"));
        assert!(matches!(
            resolver.resolve_from(|_| None),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_resolve_from_environment() {
        let env: HashMap<&str, &str> = [
            (ENV_DB_HOST, "db.local"),
            (ENV_DB_USER, "app"),
            (ENV_DB_PASSWORD, ""),
            (ENV_DB_NAME, "sales"),
        ]
        .into_iter()
        .collect();

        let (credentials, source) = CredentialResolver::new()
            .resolve_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(source, CredentialSource::Environment);
        assert_eq!(credentials.host, "db.local");
        assert_eq!(credentials.password, "");
    }

    #[test]
    fn test_partial_environment_resolves_nothing() {
        let resolved = CredentialResolver::new()
            .resolve_from(|key| (key == ENV_DB_HOST).then(|| "db.local".to_string()))
            .unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_indent_width_validation() {
        assert_eq!(
            TranslatorConfig::new().with_indent_width(2).unwrap().indent_width,
            2
        );
        assert!(matches!(
            TranslatorConfig::new().with_indent_width(0),
            Err(ConfigError::InvalidIndent(0))
        ));
    }
}
