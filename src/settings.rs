// Copyright 2023 Datafuse Labs.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::backend::is_mariadb_version;
use crate::backend::ConnectionInfo;
use crate::backend::Version;
use crate::Error;

/// Database settings, keyed by connection alias.
///
/// ```rust
/// use jsonfallback::{Backend, Settings};
///
/// let settings = Settings::from_json(
///     r#"{"databases": {"default": {"engine": "django.db.backends.mysql", "version": "5.7.22-log"}}}"#,
/// )
/// .unwrap();
/// let connections = settings.connections().unwrap();
/// assert_eq!(connections[0].backend(), Backend::FunctionJson);
/// assert!(!connections[0].is_mariadb());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    pub engine: String,
    /// Server version string as reported by the server.
    #[serde(default)]
    pub version: Option<String>,
    /// Overrides MariaDB detection from the version string.
    #[serde(default)]
    pub mariadb: Option<bool>,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::InvalidSettings(e.to_string()))
    }

    /// Builds one connection descriptor per configured database, ordered by alias.
    pub fn connections(&self) -> Result<Vec<ConnectionInfo>, Error> {
        self.databases
            .iter()
            .map(|(alias, database)| database.connection(alias))
            .collect()
    }
}

impl DatabaseSettings {
    pub fn connection(&self, alias: &str) -> Result<ConnectionInfo, Error> {
        let mut conn = ConnectionInfo::new(alias, self.engine.as_str());
        let mut mariadb = false;
        if let Some(version) = &self.version {
            conn = conn.with_version(version.parse::<Version>()?);
            mariadb = is_mariadb_version(version);
        }
        Ok(conn.with_mariadb(self.mariadb.unwrap_or(mariadb)))
    }
}
