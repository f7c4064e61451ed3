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

use crate::codec::JsonAdapter;

/// Positional placeholder used in fragment text.
pub const PLACEHOLDER: &str = "%s";

/// A bind parameter of a compiled fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// A text array, bound as `text[]`.
    TextArray(Vec<String>),
    /// A JSON document marshaled by the driver.
    Json(JsonAdapter),
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl Display for SqlParam {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlParam::Null => write!(f, "NULL"),
            SqlParam::Bool(v) => write!(f, "{v}"),
            SqlParam::Int(v) => write!(f, "{v}"),
            SqlParam::UInt(v) => write!(f, "{v}"),
            SqlParam::Float(v) => write!(f, "{v}"),
            SqlParam::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            SqlParam::TextArray(values) => {
                write!(f, "ARRAY[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}'", v.replace('\'', "''"))?;
                }
                write!(f, "]")
            }
            SqlParam::Json(adapter) => match adapter.dumps() {
                Ok(text) => write!(f, "'{}'::json", text.replace('\'', "''")),
                Err(_) => write!(f, "<unserializable json>"),
            },
        }
    }
}

/// Compiled SQL text together with its bind parameters.
///
/// The text uses `%s` positional placeholders and holds exactly one
/// placeholder per parameter, in parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl Fragment {
    /// Builds a fragment from SQL text and its parameters.
    ///
    /// # Panics
    ///
    /// In debug builds, if the number of `%s` placeholders in `sql` differs
    /// from the number of parameters. A literal `%` in the text must be
    /// written as `%%`.
    pub fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        let fragment = Self {
            sql: sql.into(),
            params,
        };
        debug_assert_eq!(fragment.placeholder_count(), fragment.params.len());
        fragment
    }

    /// Text without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, vec![])
    }

    /// A single placeholder bound to `param`.
    pub fn param(param: SqlParam) -> Self {
        Self::new(PLACEHOLDER, vec![param])
    }

    /// Counts `%s` placeholders, skipping escaped `%%`.
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut chars = self.sql.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                continue;
            }
            match chars.next() {
                Some('s') => count += 1,
                Some(_) | None => {}
            }
        }
        count
    }

    /// Substitutes each `{}` in `template` with the next fragment and
    /// concatenates their parameters in the same order.
    pub fn format(template: &str, parts: Vec<Fragment>) -> Fragment {
        let mut sql = String::with_capacity(template.len());
        let mut params = Vec::new();
        let mut parts = parts.into_iter();
        let mut pieces = template.split("{}");
        if let Some(first) = pieces.next() {
            sql.push_str(first);
        }
        for piece in pieces {
            if let Some(part) = parts.next() {
                sql.push_str(&part.sql);
                params.extend(part.params);
            }
            sql.push_str(piece);
        }
        Fragment::new(sql, params)
    }

    /// Joins fragments with a separator, keeping parameter order.
    pub fn join(parts: Vec<Fragment>, sep: &str) -> Fragment {
        let mut sql = String::new();
        let mut params = Vec::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                sql.push_str(sep);
            }
            sql.push_str(&part.sql);
            params.extend(part.params);
        }
        Fragment::new(sql, params)
    }

    /// Wraps the fragment in a function call, `NAME(sql)`.
    pub fn call(self, function: &str) -> Fragment {
        Fragment::format(&format!("{function}({{}})"), vec![self])
    }

    pub fn paren(self) -> Fragment {
        Fragment::format("({})", vec![self])
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql)?;
        if !self.params.is_empty() {
            write!(f, " -- [")?;
            for (i, param) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{param}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Lower-cases an operand.
pub fn lower(fragment: Fragment) -> Fragment {
    fragment.call("LOWER")
}

/// Strips the JSON quoting of an extracted string.
pub fn unquote(fragment: Fragment) -> Fragment {
    fragment.call("JSON_UNQUOTE")
}

/// Casts a text operand to the JSON type.
pub fn cast_json(fragment: Fragment) -> Fragment {
    Fragment::format("CAST({} AS JSON)", vec![fragment])
}

/// Escapes LIKE wildcards so the text matches literally.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
