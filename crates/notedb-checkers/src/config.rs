use std::path::Path;

use chrono::{DateTime, Utc};
use notedb_meta::RetryPolicy;
use notedb_types::PersonIdent;
use serde::{Deserialize, Serialize};

use crate::error::{CheckerError, CheckerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckersConfig {
    /// Repository holding all checker refs and the index.
    pub all_projects: String,
    pub server_ident: ServerIdentConfig,
    pub retry: RetryPolicy,
}

impl Default for CheckersConfig {
    fn default() -> Self {
        Self {
            all_projects: "All-Projects".to_string(),
            server_ident: ServerIdentConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CheckersConfig {
    pub fn from_toml_str(text: &str) -> CheckerResult<Self> {
        toml::from_str(text).map_err(|e| CheckerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> CheckerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The server identity stamped at `when`.
    pub fn server_ident(&self, when: DateTime<Utc>) -> PersonIdent {
        PersonIdent::new(&self.server_ident.name, &self.server_ident.email, when)
    }
}

/// Committer identity of every metadata commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerIdentConfig {
    pub name: String,
    pub email: String,
}

impl Default for ServerIdentConfig {
    fn default() -> Self {
        Self {
            name: "Gerrit Server".to_string(),
            email: "noreply@gerritcodereview.com".to_string(),
        }
    }
}
