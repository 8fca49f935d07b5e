//! Connection settings resolution
//!
//! The connection string comes from, in order: the command-line argument,
//! the dotenv file, then the process environment. `DB_URL` is preferred over
//! `MONGO_URL` within each source.

use opo_common::{OpoError, Result};
use opo_mongodb::TOPICS_COLLECTION;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keys holding the connection string, by priority
pub const URL_KEYS: [&str; 2] = ["DB_URL", "MONGO_URL"];

/// Environment variable naming the database
pub const DATABASE_NAME_KEY: &str = "DB_NAME";

pub const DEFAULT_DATABASE_NAME: &str = "opo";

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Where the connection string was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    Argument,
    EnvFile,
    Environment,
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlSource::Argument => write!(f, "argument"),
            UrlSource::EnvFile => write!(f, "env file"),
            UrlSource::Environment => write!(f, "environment"),
        }
    }
}

/// Raw configuration inputs, captured once so resolution never touches global state
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Positional command-line argument
    pub cli_url: Option<String>,
    /// dotenv file searched for the connection string
    pub env_file: PathBuf,
    /// Snapshot of the relevant process environment variables
    pub env: HashMap<String, String>,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            cli_url: None,
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            env: HashMap::new(),
        }
    }
}

impl ConfigSources {
    /// Capture the process environment
    pub fn from_process(cli_url: Option<String>, env_file: impl Into<PathBuf>) -> Self {
        let env = std::env::vars()
            .filter(|(key, _)| URL_KEYS.contains(&key.as_str()) || key == DATABASE_NAME_KEY)
            .collect();

        Self {
            cli_url,
            env_file: env_file.into(),
            env,
        }
    }

    /// Set the command-line connection string.
    pub fn cli_url(mut self, url: impl Into<String>) -> Self {
        self.cli_url = Some(url.into());
        self
    }

    /// Set the dotenv file path.
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Add one environment variable to the snapshot.
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_url: String,
    pub url_source: UrlSource,
    pub database_name: String,
    pub collection_name: String,
}

impl Settings {
    /// Resolve settings, failing with a configuration error when no
    /// connection string is available from any source.
    pub fn resolve(sources: &ConfigSources) -> Result<Self> {
        let (db_url, url_source) = resolve_url(sources).ok_or_else(|| {
            OpoError::Config("No se encontró DB_URL".to_string())
        })?;

        let database_name = non_empty(sources.env.get(DATABASE_NAME_KEY).map(String::as_str))
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());

        Ok(Self {
            db_url,
            url_source,
            database_name,
            collection_name: TOPICS_COLLECTION.to_string(),
        })
    }
}

fn resolve_url(sources: &ConfigSources) -> Option<(String, UrlSource)> {
    if let Some(url) = non_empty(sources.cli_url.as_deref()) {
        return Some((url, UrlSource::Argument));
    }

    if let Some(url) = read_env_file(&sources.env_file) {
        return Some((url, UrlSource::EnvFile));
    }

    URL_KEYS
        .iter()
        .find_map(|key| non_empty(sources.env.get(*key).map(String::as_str)))
        .map(|url| (url, UrlSource::Environment))
}

/// Look up the connection string in a dotenv file without exporting anything.
///
/// Values are taken verbatim: no `$VAR` expansion, since MongoDB passwords
/// may contain a literal `$`. A missing or unreadable file is not an error:
/// resolution just moves on.
fn read_env_file(path: &Path) -> Option<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Env file not loaded");
            return None;
        }
    };

    // First occurrence of each key wins
    let mut found: HashMap<&str, String> = HashMap::new();
    for (key, value) in contents.lines().filter_map(parse_env_line) {
        if let Some(known) = URL_KEYS.iter().find(|k| **k == key) {
            found.entry(*known).or_insert(value);
        }
    }

    URL_KEYS
        .iter()
        .find_map(|key| non_empty(found.get(key).map(String::as_str)))
}

/// Split one `KEY=value` line, skipping blanks and comments.
///
/// Matching surrounding quotes are stripped; an unquoted value ends at a
/// ` #` inline comment.
fn parse_env_line(line: &str) -> Option<(&str, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let value = value.trim();

    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
        .filter(|_| value.len() >= 2);

    let value = match unquoted {
        Some(inner) => inner,
        None => value
            .find(" #")
            .or_else(|| value.find("\t#"))
            .map_or(value, |end| &value[..end])
            .trim_end(),
    };

    Some((key.trim(), value.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
