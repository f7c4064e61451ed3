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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use nom::character::complete::char;
use nom::character::complete::multispace0;
use nom::character::complete::u32;
use nom::multi::separated_list1;
use nom::sequence::preceded;
use nom::IResult;
use nom::Parser;

use crate::Error;

/// MySQL releases with a native `JSON` column type.
pub const MYSQL_MIN_VERSION: [u32; 2] = [5, 7];
/// MariaDB releases with the `JSON` alias and the JSON functions.
pub const MARIADB_MIN_VERSION: [u32; 3] = [10, 2, 7];

/// First MySQL release with the ICU regex engine and `REGEXP_LIKE`.
pub const MYSQL_ICU_REGEX_VERSION: [u32; 3] = [8, 0, 4];

// Prefix MariaDB servers report through the MySQL replication protocol.
const MARIADB_REPLICATION_PREFIX: &str = "5.5.5-";

/// Which native JSON facilities a database engine offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Native `jsonb` type with containment, key-existence and path operators.
    RichJson,
    /// Native `JSON` type, queried through SQL functions and `$` path strings.
    FunctionJson,
    /// No JSON support, values are stored as plain text.
    Generic,
}

impl Backend {
    /// Maps an engine name to a backend by its last dotted component,
    /// so both `postgresql` and `django.db.backends.postgresql` are accepted.
    pub fn from_engine(engine: &str) -> Backend {
        let name = engine.rsplit('.').next().unwrap_or(engine);
        match name.to_ascii_lowercase().as_str() {
            "postgresql" | "postgresql_psycopg2" | "postgres" | "postgis" => Backend::RichJson,
            "mysql" => Backend::FunctionJson,
            _ => Backend::Generic,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::RichJson => "RichJSON",
            Backend::FunctionJson => "FunctionJSON",
            Backend::Generic => "Generic",
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A server version as a dotted sequence of numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(Vec<u32>);

impl Version {
    pub fn new(parts: &[u32]) -> Self {
        Version(parts.to_vec())
    }

    pub fn parts(&self) -> &[u32] {
        &self.0
    }

    pub fn at_least(&self, minimum: &[u32]) -> bool {
        self.0.as_slice() >= minimum
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    /// Parses the leading dotted digits of a server version string,
    /// ignoring any suffix such as `-log` or `-MariaDB-1:10.3.7+maria`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = if is_mariadb_version(s) {
            s.strip_prefix(MARIADB_REPLICATION_PREFIX).unwrap_or(s)
        } else {
            s
        };
        match version_numbers(input) {
            Ok((_, parts)) => Ok(Version(parts)),
            Err(_) => Err(Error::InvalidVersion(s.to_string())),
        }
    }
}

fn version_numbers(input: &str) -> IResult<&str, Vec<u32>> {
    preceded(multispace0, separated_list1(char('.'), u32)).parse(input)
}

/// Returns true if the server version string identifies a MariaDB server.
pub fn is_mariadb_version(version: &str) -> bool {
    version.to_ascii_lowercase().contains("mariadb")
}

/// Describes the connection queries are compiled for.
///
/// The backend identity is derived from the engine when the descriptor is
/// created and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    alias: String,
    engine: String,
    backend: Backend,
    version: Option<Version>,
    mariadb: bool,
}

impl ConnectionInfo {
    pub fn new(alias: impl Into<String>, engine: impl Into<String>) -> Self {
        let engine = engine.into();
        let backend = Backend::from_engine(&engine);
        Self {
            alias: alias.into(),
            engine,
            backend,
            version: None,
            mariadb: false,
        }
    }

    pub fn postgresql() -> Self {
        Self::new("default", "postgresql")
    }

    pub fn mysql(version: &[u32]) -> Self {
        Self::new("default", "mysql").with_version(Version::new(version))
    }

    pub fn mariadb(version: &[u32]) -> Self {
        Self::mysql(version).with_mariadb(true)
    }

    pub fn sqlite() -> Self {
        Self::new("default", "sqlite3")
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_mariadb(mut self, mariadb: bool) -> Self {
        self.mariadb = mariadb;
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    pub fn is_mariadb(&self) -> bool {
        self.mariadb
    }

    /// Whether the engine has a native JSON column type.
    /// An unknown version is assumed to be a current release.
    pub fn supports_native_json(&self) -> bool {
        match self.backend {
            Backend::RichJson => true,
            Backend::FunctionJson => match &self.version {
                Some(version) if self.mariadb => version.at_least(&MARIADB_MIN_VERSION),
                Some(version) => version.at_least(&MYSQL_MIN_VERSION),
                None => true,
            },
            Backend::Generic => false,
        }
    }

    /// MariaDB stores JSON as text and has no `CAST(... AS JSON)`.
    pub fn needs_json_cast(&self) -> bool {
        self.backend == Backend::FunctionJson && !self.mariadb
    }

    /// MySQL 8.0.4 and later reject `REGEXP BINARY` on utf8mb4 text and
    /// match with `REGEXP_LIKE` instead. An unknown version counts as current.
    pub fn has_icu_regex(&self) -> bool {
        if self.backend != Backend::FunctionJson || self.mariadb {
            return false;
        }
        self.version
            .as_ref()
            .map_or(true, |version| version.at_least(&MYSQL_ICU_REGEX_VERSION))
    }

    /// Quotes an identifier. A `%` is doubled so it never reads as a
    /// placeholder.
    pub fn quote_name(&self, name: &str) -> String {
        let name = name.replace('%', "%%");
        match self.backend {
            Backend::FunctionJson => format!("`{}`", name.replace('`', "``")),
            Backend::RichJson | Backend::Generic => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }
}
