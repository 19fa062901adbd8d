//! Loading and validation of the agent's `auto_auth` configuration.
//!
//! A configuration looks like this:
//!
//! ```text
//! pid_file = "./pidfile"
//!
//! auto_auth {
//!   method {
//!     type   = "aws-iam"
//!     config = {
//!       role = "foobar"
//!     }
//!   }
//!
//!   sink "file" {
//!     path    = "/tmp/file-foo"
//!     dh_type = "curve25519"
//!     dh_path = "/tmp/file-foo-dhpath"
//!   }
//! }
//! ```

mod auto_auth;
mod duration;
mod error;
mod fields;
mod method;
mod sink;

#[cfg(test)]
mod tests;

pub use auto_auth::{AutoAuth, AutoAuthBuilder};
pub use error::{
    AutoAuthError, ConfigError, CrossFieldViolation, ErrorKind, SchemaViolation, SinkError, SinkErrorKind,
    SinkErrors,
};
pub use method::Method;
pub use sink::{DhSettings, DhType, ParseDhTypeError, Sink};

use crate::{
    document::{self, Body},
    env::{EnvProvider, ProcessEnv},
};
use fields::Fields;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info};

const ROOT_FIELDS: &[&str] = &["pid_file", "auto_auth"];

/// The agent configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Config {
    /// The path to write the agent's pid to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid_file: Option<PathBuf>,

    /// The authentication and credential delivery configuration.
    pub auto_auth: AutoAuth,
}

impl Config {
    /// Load a configuration file, resolving environment variables from the current process.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::new().load(path)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigLoader::new().parse(s)
    }
}

/// Loads configurations.
///
/// Every load produces an independent [`Config`]. Environment variables referenced by the
/// configuration are resolved at load time using the loader's [`EnvProvider`].
pub struct ConfigLoader {
    env: Box<dyn EnvProvider>,
}

impl ConfigLoader {
    /// Construct a loader that resolves environment variables from the current process.
    pub fn new() -> Self {
        Self::with_env_provider(ProcessEnv)
    }

    /// Construct a loader that resolves environment variables using the given provider.
    pub fn with_env_provider<E: EnvProvider>(provider: E) -> Self {
        Self { env: Box::new(provider) }
    }

    /// Load the configuration file at the given path.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading configuration");
        let metadata = fs::metadata(path).map_err(|source| ConfigError::Io { path: path.into(), source })?;
        if metadata.is_dir() {
            return Err(ConfigError::IsDirectory(path.into()));
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.into(), source })?;
        self.parse(&contents)
    }

    /// Parse a configuration.
    pub fn parse(&self, input: &str) -> Result<Config, ConfigError> {
        let root = document::parse(input)?;
        let pid_file = decode_root(&root)?;
        let auto_auth = auto_auth::extract_auto_auth(&root, self.env.as_ref())?;

        let method = auto_auth.method();
        info!(
            method = %method.kind,
            mount_path = %method.mount_path,
            sinks = auto_auth.sinks().len(),
            "configuration loaded"
        );
        Ok(Config { pid_file, auto_auth })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// Decodes the top level fields. `auto_auth` is handled separately.
fn decode_root(root: &Body) -> Result<Option<PathBuf>, SchemaViolation> {
    for item in root.items() {
        if !ROOT_FIELDS.contains(&item.name()) {
            debug!(key = item.name(), position = %item.position(), "ignoring unknown configuration key");
        }
    }
    let pid_file = Fields::new(root).string("pid_file")?.filter(|path| !path.is_empty());
    Ok(pid_file.map(PathBuf::from))
}
