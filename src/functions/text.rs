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

use super::literal;
use super::Context;
use super::Rhs;
use crate::backend::Backend;
use crate::codec::dumps;
use crate::codec::loads;
use crate::codec::text_operand;
use crate::fragment::escape_like;
use crate::fragment::lower;
use crate::fragment::Fragment;
use crate::fragment::SqlParam;
use crate::keypath::KeyPath;
use crate::lookup::Lookup;
use crate::path::navigate;
use crate::path::Extract;
use crate::Error;

/// Pattern and regex matching on the text of the member at `path`.
pub(crate) fn pattern(
    ctx: &Context<'_>,
    lookup: Lookup,
    lhs: Fragment,
    path: &KeyPath,
    rhs: Rhs<'_>,
) -> Result<Fragment, Error> {
    let backend = ctx.backend();
    let value = literal(lookup, rhs)?;
    let text = match backend {
        Backend::RichJson => text_operand(value, ctx.encoder.as_ref())?,
        // the stored member is compared as decoded text, so the operand
        // takes the same trip through the encoder
        Backend::FunctionJson => {
            let decoded = loads(&dumps(value, ctx.encoder.as_ref())?)?;
            text_operand(&decoded, ctx.encoder.as_ref())?
        }
        Backend::Generic => return Err(Error::unsupported(lookup.name(), backend)),
    };
    let lhs = navigate(backend, lhs, path, Extract::Text)?;
    let param = Fragment::param(SqlParam::Text(like_pattern(lookup, &text)));

    if ctx.connection.has_icu_regex() && matches!(lookup, Lookup::Regex | Lookup::IRegex) {
        let flags = if lookup == Lookup::IRegex { "i" } else { "c" };
        return Ok(Fragment::format(
            &format!("REGEXP_LIKE({{}}, {{}}, '{flags}')"),
            vec![lhs, param],
        ));
    }

    // regex patterns are never lowered, that would turn `\D` into `\d`
    let (operator, lower_lhs, lower_rhs) = match (backend, lookup) {
        (_, Lookup::IExact) => ("=", true, true),
        (Backend::RichJson, Lookup::Regex) => ("~", false, false),
        (Backend::RichJson, Lookup::IRegex) => ("~*", false, false),
        (_, Lookup::IRegex) => ("REGEXP", true, false),
        (_, Lookup::Regex) => ("REGEXP BINARY", false, false),
        (Backend::RichJson, _) => {
            let insensitive = lookup.is_case_insensitive();
            ("LIKE", insensitive, insensitive)
        }
        (_, _) if lookup.is_case_insensitive() => ("LIKE", true, true),
        (_, _) => ("LIKE BINARY", false, false),
    };
    let lhs = if lower_lhs { lower(lhs) } else { lhs };
    let param = if lower_rhs { lower(param) } else { param };
    Ok(Fragment::format(
        &format!("{{}} {operator} {{}}"),
        vec![lhs, param],
    ))
}

fn like_pattern(lookup: Lookup, text: &str) -> String {
    match lookup {
        Lookup::Contains | Lookup::IContains => format!("%{}%", escape_like(text)),
        Lookup::StartsWith | Lookup::IStartsWith => format!("{}%", escape_like(text)),
        Lookup::EndsWith | Lookup::IEndsWith => format!("%{}", escape_like(text)),
        _ => text.to_string(),
    }
}
