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
use crate::codec::dumps;
use crate::fragment::Fragment;
use crate::fragment::SqlParam;
use crate::keypath::KeyPath;
use crate::lookup::Lookup;
use crate::path::navigate;
use crate::path::Extract;
use crate::Error;

/// The value at `path` contains the operand document.
pub(crate) fn contains(
    ctx: &Context<'_>,
    lhs: Fragment,
    path: &KeyPath,
    rhs: Rhs<'_>,
) -> Result<Fragment, Error> {
    let backend = ctx.backend();
    match backend {
        Backend::RichJson => {
            let lhs = navigate(backend, lhs, path, Extract::Json)?;
            let rhs = json_param(ctx, Lookup::Contains, rhs)?;
            Ok(Fragment::format("{} @> {}", vec![lhs, rhs]))
        }
        Backend::FunctionJson => {
            let lhs = navigate(backend, lhs, path, Extract::Json)?;
            let rhs = document(ctx, Lookup::Contains, rhs)?;
            Ok(Fragment::format("JSON_CONTAINS({}, {})", vec![lhs, rhs]))
        }
        Backend::Generic => Err(Error::unsupported(Lookup::Contains.name(), backend)),
    }
}

/// The value at `path` is contained by the operand document.
///
/// `JSON_CONTAINS` takes the haystack first, so the operands and their
/// parameters swap places.
pub(crate) fn contained_by(
    ctx: &Context<'_>,
    lhs: Fragment,
    path: &KeyPath,
    rhs: Rhs<'_>,
) -> Result<Fragment, Error> {
    let backend = ctx.backend();
    match backend {
        Backend::RichJson => {
            let lhs = navigate(backend, lhs, path, Extract::Json)?;
            let rhs = json_param(ctx, Lookup::ContainedBy, rhs)?;
            Ok(Fragment::format("{} <@ {}", vec![lhs, rhs]))
        }
        Backend::FunctionJson => {
            let lhs = navigate(backend, lhs, path, Extract::Json)?;
            let rhs = document(ctx, Lookup::ContainedBy, rhs)?;
            Ok(Fragment::format("JSON_CONTAINS({}, {})", vec![rhs, lhs]))
        }
        Backend::Generic => Err(Error::unsupported(Lookup::ContainedBy.name(), backend)),
    }
}

fn document(ctx: &Context<'_>, lookup: Lookup, rhs: Rhs<'_>) -> Result<Fragment, Error> {
    match rhs {
        Rhs::Value(value) => Ok(Fragment::param(SqlParam::Text(dumps(
            value,
            ctx.encoder.as_ref(),
        )?))),
        Rhs::Sql(fragment) => Ok(fragment),
        Rhs::Key(_) | Rhs::Keys(_) => Err(Error::operand(lookup.name(), "JSON values")),
    }
}
