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

// Translation of lookups into SQL, one module per operator family.
// Every translator matches exhaustively on the backend.

mod compare;
mod containment;
mod exact;
mod extract;
mod keys;
mod text;

use std::sync::Arc;

use crate::backend::Backend;
use crate::backend::ConnectionInfo;
use crate::codec::Encoder;
use crate::codec::JsonAdapter;
use crate::fragment::Fragment;
use crate::fragment::SqlParam;
use crate::keypath::KeyPath;
use crate::lookup::Lookup;
use crate::Error;
use crate::Value;

pub use extract::JsonExtract;

/// What a translator needs to know besides its operands.
pub(crate) struct Context<'a> {
    pub connection: &'a ConnectionInfo,
    pub encoder: &'a Arc<dyn Encoder>,
}

impl Context<'_> {
    pub fn backend(&self) -> Backend {
        self.connection.backend()
    }
}

/// A right operand ready for translation, nested expressions already compiled.
pub(crate) enum Rhs<'a> {
    Value(&'a Value),
    Key(&'a str),
    Keys(&'a [String]),
    Sql(Fragment),
}

/// Translates a lookup on the member of `lhs` at `path`.
pub(crate) fn translate(
    ctx: &Context<'_>,
    lookup: Lookup,
    lhs: Fragment,
    path: &KeyPath,
    rhs: Rhs<'_>,
) -> Result<Fragment, Error> {
    match lookup {
        Lookup::Exact => exact::exact(ctx, lhs, path, rhs),
        Lookup::Contains if path.is_empty() => containment::contains(ctx, lhs, path, rhs),
        Lookup::ContainedBy => containment::contained_by(ctx, lhs, path, rhs),
        Lookup::HasKey | Lookup::HasKeys | Lookup::HasAnyKeys => {
            keys::has_keys(ctx, lookup, lhs, path, rhs)
        }
        Lookup::Contains
        | Lookup::IContains
        | Lookup::IExact
        | Lookup::StartsWith
        | Lookup::IStartsWith
        | Lookup::EndsWith
        | Lookup::IEndsWith
        | Lookup::Regex
        | Lookup::IRegex => text::pattern(ctx, lookup, lhs, path, rhs),
        Lookup::Lt | Lookup::Lte | Lookup::Gt | Lookup::Gte => {
            compare::compare(ctx, lookup, lhs, path, rhs)
        }
        Lookup::IsNull => compare::is_null(ctx, lhs, rhs),
        Lookup::In | Lookup::Range | Lookup::Search => {
            Err(Error::unsupported(lookup.name(), ctx.backend()))
        }
    }
}

/// Binds a literal as a JSON document for the rich backend's driver.
fn json_param(ctx: &Context<'_>, lookup: Lookup, rhs: Rhs<'_>) -> Result<Fragment, Error> {
    match rhs {
        Rhs::Value(value) => Ok(Fragment::param(SqlParam::Json(JsonAdapter::new(
            value.clone(),
            ctx.encoder.clone(),
        )))),
        Rhs::Sql(fragment) => Ok(fragment),
        Rhs::Key(_) | Rhs::Keys(_) => Err(Error::operand(lookup.name(), "JSON values")),
    }
}

fn literal<'a>(lookup: Lookup, rhs: Rhs<'a>) -> Result<&'a Value, Error> {
    match rhs {
        Rhs::Value(value) => Ok(value),
        Rhs::Key(_) | Rhs::Keys(_) | Rhs::Sql(_) => {
            Err(Error::operand(lookup.name(), "literal values"))
        }
    }
}
