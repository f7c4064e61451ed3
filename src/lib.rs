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

//! `jsonfallback` lets one declared JSON field be stored and queried on
//! databases with very different JSON support. Queries are written once, as
//! key paths and lookups, and compiled to SQL text with bound parameters for
//! the backend of the active connection.
//!
//! ## Backends
//!
//! - `RichJSON`: native JSON operators (PostgreSQL `jsonb`, `->`, `->>`,
//!   `@>`, `?`).
//! - `FunctionJSON`: JSON functions (MySQL and MariaDB `JSON_EXTRACT`,
//!   `JSON_CONTAINS`, `JSON_CONTAINS_PATH`).
//! - `Generic`: plain text storage. Only NULL tests are translated, every
//!   other lookup is refused with [`Error::UnsupportedOperator`].
//!
//! A lookup is checked against a fixed capability table before any SQL is
//! produced. Nothing is ever silently turned into a different operator.
//!
//! ## Example
//!
//! ```rust
//! use jsonfallback::ColumnCompiler;
//! use jsonfallback::ConnectionInfo;
//! use jsonfallback::JsonField;
//!
//! let field = JsonField::new("data");
//! let lookup = field.key("title").lookup("startswith", "Harry").unwrap();
//!
//! let mysql = ConnectionInfo::mysql(&[8, 0]);
//! let sql = lookup.as_sql(&mut ColumnCompiler::new(&mysql), &mysql).unwrap();
//! assert_eq!(
//!     sql.sql,
//!     "JSON_UNQUOTE(JSON_EXTRACT(`data`, %s)) LIKE BINARY %s"
//! );
//! ```

#![allow(clippy::uninlined_format_args)]

mod backend;
mod capability;
mod checks;
mod codec;
mod error;
mod expr;
mod field;
mod fragment;
mod functions;
pub mod keypath;
mod lookup;
mod path;
mod query;
mod settings;
mod value;

pub use backend::is_mariadb_version;
pub use backend::Backend;
pub use backend::ConnectionInfo;
pub use backend::Version;
pub use backend::MARIADB_MIN_VERSION;
pub use backend::MYSQL_ICU_REGEX_VERSION;
pub use backend::MYSQL_MIN_VERSION;
pub use capability::check;
pub use capability::supported_lookups;
pub use capability::supports;
pub use checks::Diagnostic;
pub use checks::Level;
pub use checks::E001;
pub use checks::E002;
pub use codec::decode;
pub use codec::decode_for_compare;
pub use codec::dumps;
pub use codec::encode;
pub use codec::loads;
pub use codec::to_json;
pub use codec::Decoder;
pub use codec::DefaultEncoder;
pub use codec::Encoder;
pub use codec::IsoEncoder;
pub use codec::JsonAdapter;
pub use codec::JsonDecoder;
pub use codec::Stored;
pub use error::Error;
pub use expr::Column;
pub use expr::ColumnCompiler;
pub use expr::Compiler;
pub use field::JsonField;
pub use fragment::Fragment;
pub use fragment::SqlParam;
pub use fragment::PLACEHOLDER;
pub use functions::JsonExtract;
pub use keypath::KeyPath;
pub use keypath::PathSegment;
pub use lookup::Lookup;
pub use lookup::Operand;
pub use lookup::Target;
pub use lookup::WHOLE_VALUE_REFUSED;
pub use path::compile_json_path;
pub use path::compile_prefix;
pub use path::navigate;
pub use path::Extract;
pub use path::JSON_PATH_ROOT;
pub use query::JsonRef;
pub use query::LookupExpr;
pub use settings::DatabaseSettings;
pub use settings::Settings;
pub use value::*;
