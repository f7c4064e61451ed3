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
use crate::codec::loads;
use crate::codec::scalar_param;
use crate::fragment::cast_json;
use crate::fragment::Fragment;
use crate::fragment::SqlParam;
use crate::keypath::KeyPath;
use crate::lookup::Lookup;
use crate::path::navigate;
use crate::path::Extract;
use crate::Error;
use crate::Value;

/// Equality of the value, or of the member at `path`, with the operand.
pub(crate) fn exact(
    ctx: &Context<'_>,
    lhs: Fragment,
    path: &KeyPath,
    rhs: Rhs<'_>,
) -> Result<Fragment, Error> {
    let backend = ctx.backend();
    match backend {
        Backend::RichJson => {
            let lhs = navigate(backend, lhs, path, Extract::Json)?;
            let rhs = json_param(ctx, Lookup::Exact, rhs)?;
            Ok(Fragment::format("{} = {}", vec![lhs, rhs]))
        }
        Backend::FunctionJson => {
            let whole = path.is_empty();
            let lhs = navigate(backend, lhs, path, Extract::Json)?;
            let rhs = match rhs {
                Rhs::Value(value) => {
                    let text = dumps(value, ctx.encoder.as_ref())?;
                    if whole {
                        json_text(ctx, text)
                    } else {
                        // extracted members compare against the decoded scalar.
                        // Documents, null and booleans need the JSON type, a
                        // bound boolean reaches the server as 1 or 0
                        let decoded = loads(&text)?;
                        if decoded.is_structured()
                            || decoded.is_null()
                            || matches!(decoded, Value::Bool(_))
                        {
                            json_text(ctx, text)
                        } else {
                            Fragment::param(scalar_param(&decoded)?)
                        }
                    }
                }
                Rhs::Sql(fragment) => fragment,
                Rhs::Key(_) | Rhs::Keys(_) => {
                    return Err(Error::operand(Lookup::Exact.name(), "JSON values"))
                }
            };
            Ok(Fragment::format("{} = {}", vec![lhs, rhs]))
        }
        Backend::Generic => Err(Error::unsupported(Lookup::Exact.name(), backend)),
    }
}

fn json_text(ctx: &Context<'_>, text: String) -> Fragment {
    let param = Fragment::param(SqlParam::Text(text));
    if ctx.connection.needs_json_cast() {
        cast_json(param)
    } else {
        param
    }
}
