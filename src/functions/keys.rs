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

use super::Context;
use super::Rhs;
use crate::backend::Backend;
use crate::fragment::Fragment;
use crate::fragment::SqlParam;
use crate::keypath::KeyPath;
use crate::lookup::Lookup;
use crate::path::compile_prefix;
use crate::path::navigate;
use crate::path::Extract;
use crate::Error;

/// Key existence on the object at `path`: `has_key` checks one key,
/// `has_keys` all of them and `has_any_keys` at least one.
pub(crate) fn has_keys(
    ctx: &Context<'_>,
    lookup: Lookup,
    lhs: Fragment,
    path: &KeyPath,
    rhs: Rhs<'_>,
) -> Result<Fragment, Error> {
    let keys: Vec<&str> = match rhs {
        Rhs::Key(key) if lookup == Lookup::HasKey => vec![key],
        Rhs::Keys(keys) if lookup != Lookup::HasKey => keys.iter().map(String::as_str).collect(),
        _ => return Err(Error::operand(lookup.name(), "member names")),
    };
    let backend = ctx.backend();
    match backend {
        Backend::RichJson => {
            let lhs = navigate(backend, lhs, path, Extract::Json)?;
            let (operator, param) = match lookup {
                Lookup::HasKey => ("?", SqlParam::Text(keys[0].to_string())),
                Lookup::HasKeys => ("?&", text_array(&keys)),
                _ => ("?|", text_array(&keys)),
            };
            Ok(Fragment::format(
                &format!("{{}} {operator} {{}}"),
                vec![lhs, Fragment::param(param)],
            ))
        }
        Backend::FunctionJson => {
            // the path is resolved by JSON_CONTAINS_PATH itself
            let mode = if lookup == Lookup::HasKeys { "all" } else { "one" };
            let paths = keys
                .iter()
                .map(|key| Fragment::param(SqlParam::Text(compile_prefix(path, key))))
                .collect::<Vec<_>>();
            Ok(Fragment::format(
                &format!("JSON_CONTAINS_PATH({{}}, '{mode}', {{}})"),
                vec![lhs, Fragment::join(paths, ", ")],
            ))
        }
        Backend::Generic => Err(Error::unsupported(lookup.name(), backend)),
    }
}

fn text_array(keys: &[&str]) -> SqlParam {
    SqlParam::TextArray(keys.iter().map(|k| k.to_string()).collect())
}
