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

use super::json_param;
use super::Context;
use super::Rhs;
use crate::backend::Backend;
use crate::codec::decode_for_compare;
use crate::codec::dumps;
use crate::fragment::Fragment;
use crate::keypath::KeyPath;
use crate::lookup::Lookup;
use crate::path::navigate;
use crate::path::Extract;
use crate::Error;
use crate::Value;

pub(crate) fn compare(
    ctx: &Context<'_>,
    lookup: Lookup,
    lhs: Fragment,
    path: &KeyPath,
    rhs: Rhs<'_>,
) -> Result<Fragment, Error> {
    let operator = match lookup {
        Lookup::Lt => "<",
        Lookup::Lte => "<=",
        Lookup::Gt => ">",
        Lookup::Gte => ">=",
        _ => return Err(Error::operand(lookup.name(), "ordering lookups")),
    };
    let backend = ctx.backend();
    let rhs = match backend {
        Backend::RichJson => json_param(ctx, lookup, rhs)?,
        Backend::FunctionJson => match rhs {
            Rhs::Value(value) => Fragment::param(decode_for_compare(&dumps(
                value,
                ctx.encoder.as_ref(),
            )?)?),
            Rhs::Sql(fragment) => fragment,
            Rhs::Key(_) | Rhs::Keys(_) => {
                return Err(Error::operand(lookup.name(), "JSON values"))
            }
        },
        Backend::Generic => return Err(Error::unsupported(lookup.name(), backend)),
    };
    let lhs = navigate(backend, lhs, path, Extract::Json)?;
    Ok(Fragment::format(
        &format!("{{}} {operator} {{}}"),
        vec![lhs, rhs],
    ))
}

/// SQL NULL test on the column. Works on every backend.
pub(crate) fn is_null(_ctx: &Context<'_>, lhs: Fragment, rhs: Rhs<'_>) -> Result<Fragment, Error> {
    match rhs {
        Rhs::Value(Value::Bool(true)) => Ok(Fragment::format("{} IS NULL", vec![lhs])),
        Rhs::Value(Value::Bool(false)) => Ok(Fragment::format("{} IS NOT NULL", vec![lhs])),
        _ => Err(Error::operand(Lookup::IsNull.name(), "boolean values")),
    }
}
