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

use std::sync::Arc;

use crate::backend::Backend;
use crate::backend::ConnectionInfo;
use crate::checks::Diagnostic;
use crate::checks::E001;
use crate::checks::E002;
use crate::codec::decode;
use crate::codec::encode;
use crate::codec::to_json;
use crate::codec::DefaultEncoder;
use crate::codec::Decoder;
use crate::codec::Encoder;
use crate::codec::JsonDecoder;
use crate::codec::Stored;
use crate::expr::Column;
use crate::fragment::SqlParam;
use crate::keypath::PathSegment;
use crate::query::JsonRef;
use crate::query::LookupExpr;
use crate::Error;
use crate::Value;

/// A JSON field declared once and usable on every backend.
///
/// The field owns its column, its nullability, an optional default and the
/// codec pair used to store and load values.
///
/// ```rust
/// use jsonfallback::ConnectionInfo;
/// use jsonfallback::JsonField;
///
/// let field = JsonField::new("data").with_table("book");
/// assert_eq!(field.db_type(&ConnectionInfo::postgresql()), "jsonb");
/// assert_eq!(field.db_type(&ConnectionInfo::mysql(&[5, 6])), "longtext");
/// ```
#[derive(Debug, Clone)]
pub struct JsonField {
    column: Column,
    null: bool,
    default: Option<Value>,
    encoder: Arc<dyn Encoder>,
    decoder: Arc<dyn Decoder>,
}

impl JsonField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            column: Column::new(name),
            null: false,
            default: None,
            encoder: Arc::new(DefaultEncoder),
            decoder: Arc::new(JsonDecoder),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.column.table = Some(table.into());
        self
    }

    pub fn nullable(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn Decoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn is_nullable(&self) -> bool {
        self.null
    }

    pub fn encoder(&self) -> &Arc<dyn Encoder> {
        &self.encoder
    }

    /// The column type to declare on the connection.
    pub fn db_type(&self, connection: &ConnectionInfo) -> &'static str {
        match connection.backend() {
            Backend::RichJson => "jsonb",
            Backend::FunctionJson if connection.supports_native_json() => "json",
            Backend::FunctionJson => "longtext",
            Backend::Generic => "text",
        }
    }

    pub fn get_default(&self) -> Option<Value> {
        self.default.clone()
    }

    /// Checks the value can be serialized with the field's encoder.
    pub fn validate(&self, value: &Value) -> Result<(), Error> {
        to_json(value, self.encoder.as_ref()).map(|_| ())
    }

    /// The bind parameter storing `value`. A missing value falls back to
    /// the default, then to SQL NULL.
    pub fn to_storage(
        &self,
        value: Option<&Value>,
        connection: &ConnectionInfo,
    ) -> Result<SqlParam, Error> {
        let value = value.or(self.default.as_ref());
        encode(value, connection.backend(), &self.encoder)
    }

    pub fn from_storage(&self, stored: impl Into<Stored>) -> Result<Option<Value>, Error> {
        decode(stored.into(), self.decoder.as_ref())
    }

    /// A reference to the whole value of the field.
    pub fn reference(&self) -> JsonRef<Column> {
        JsonRef::new(self.column.clone(), self.encoder.clone())
    }

    pub fn key(&self, segment: impl Into<PathSegment>) -> JsonRef<Column> {
        self.reference().key(segment)
    }

    pub fn lookup(&self, name: &str, value: impl Into<Value>) -> Result<LookupExpr<Column>, Error> {
        self.reference().lookup(name, value)
    }

    pub fn filter(&self, chain: &str, value: impl Into<Value>) -> Result<LookupExpr<Column>, Error> {
        self.reference().filter(chain, value)
    }

    /// Checks the field against the configured connections.
    pub fn check(&self, connections: &[ConnectionInfo]) -> Vec<Diagnostic> {
        let function_based = connections
            .iter()
            .filter(|c| c.backend() == Backend::FunctionJson)
            .collect::<Vec<_>>();
        let mut diagnostics = Vec::new();
        if function_based.is_empty() {
            return diagnostics;
        }
        let obj = self.label();
        if self.null {
            diagnostics.push(
                Diagnostic::error(
                    E001,
                    "You should not use nullable JSON fields if you have MySQL connections.",
                )
                .with_obj(obj.clone()),
            );
        }
        if !function_based.iter().any(|c| c.supports_native_json()) {
            diagnostics.push(
                Diagnostic::error(E002, "MySQL 5.7+ is required to use JSON fields")
                    .with_hint(
                        "At least one of your DB connections should be to MySQL 5.7+ or MariaDB 10.2.7+",
                    )
                    .with_obj(obj),
            );
        }
        for diagnostic in &diagnostics {
            log::warn!("{diagnostic}");
        }
        diagnostics
    }

    fn label(&self) -> String {
        match &self.column.table {
            Some(table) => format!("{}.{}", table, self.column.name),
            None => self.column.name.clone(),
        }
    }
}
