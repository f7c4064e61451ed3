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

// This file contains the compilation of key paths into backend path syntax.

use crate::backend::Backend;
use crate::fragment::unquote;
use crate::fragment::Fragment;
use crate::fragment::SqlParam;
use crate::keypath::KeyPath;
use crate::keypath::PathSegment;
use crate::Error;

/// Root of a function-based JSON path.
pub const JSON_PATH_ROOT: &str = "$";

/// What path navigation yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// The member as a JSON value.
    Json,
    /// The member as text, strings without their JSON quotes.
    Text,
}

/// Compiles a key path into a function-based JSON path string.
///
/// Indices become `[n]`, keys become `.key`. Keys that are not plain
/// identifiers are written as JSON strings, so `a.b` becomes `."a.b"`.
///
/// ```rust
/// use jsonfallback::keypath::KeyPath;
/// use jsonfallback::compile_json_path;
///
/// let path = KeyPath::from_tokens(["a", "0", "b"]);
/// assert_eq!(compile_json_path(&path), "$.a[0].b");
/// assert_eq!(compile_json_path(&KeyPath::default()), "$");
/// ```
pub fn compile_json_path(path: &KeyPath) -> String {
    let mut buf = String::from(JSON_PATH_ROOT);
    for segment in path.segments() {
        match segment {
            PathSegment::Index(idx) => {
                buf.push('[');
                buf.push_str(&idx.to_string());
                buf.push(']');
            }
            PathSegment::Key(name) => write_key(&mut buf, name),
        }
    }
    buf
}

/// Compiles a key path followed by one more member name.
///
/// The last step is always an object key, even if it looks like a number,
/// which is what key-existence checks need.
pub fn compile_prefix(prefix: &KeyPath, key: &str) -> String {
    let mut buf = compile_json_path(prefix);
    write_key(&mut buf, key);
    buf
}

fn write_key(buf: &mut String, key: &str) {
    buf.push('.');
    if is_identifier(key) {
        buf.push_str(key);
    } else {
        // serializing a str never fails
        buf.push_str(&serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\"")));
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn segment_param(segment: &PathSegment) -> SqlParam {
    match segment {
        PathSegment::Index(idx) => SqlParam::Int(*idx),
        PathSegment::Key(name) => SqlParam::Text(name.clone()),
    }
}

/// Navigates from `lhs` into the member at `path`.
///
/// On the rich backend every step is one operator applied to the previous
/// expression, `(("data" -> %s) -> %s)`, and text extraction uses `->>` on
/// the last step. On the function-based backend the whole path is one
/// `JSON_EXTRACT` call, unquoted for text extraction. An empty path leaves
/// `lhs` untouched.
pub fn navigate(
    backend: Backend,
    lhs: Fragment,
    path: &KeyPath,
    extract: Extract,
) -> Result<Fragment, Error> {
    if path.is_empty() {
        return Ok(lhs);
    }
    match backend {
        Backend::RichJson => {
            let last = path.len() - 1;
            let mut expr = lhs;
            for (i, segment) in path.segments().iter().enumerate() {
                let template = if i == last && extract == Extract::Text {
                    "({} ->> {})"
                } else {
                    "({} -> {})"
                };
                expr = Fragment::format(
                    template,
                    vec![expr, Fragment::param(segment_param(segment))],
                );
            }
            Ok(expr)
        }
        Backend::FunctionJson => {
            let json_path = Fragment::param(SqlParam::Text(compile_json_path(path)));
            let expr = Fragment::format("JSON_EXTRACT({}, {})", vec![lhs, json_path]);
            match extract {
                Extract::Json => Ok(expr),
                Extract::Text => Ok(unquote(expr)),
            }
        }
        Backend::Generic => Err(Error::unsupported("key_transform", backend)),
    }
}
