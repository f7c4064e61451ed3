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

use crate::backend::Backend;
use crate::lookup::Lookup;
use crate::lookup::Target;
use crate::Error;

const RICH_FIELD: &[Lookup] = &[
    Lookup::Exact,
    Lookup::Contains,
    Lookup::ContainedBy,
    Lookup::HasKey,
    Lookup::HasKeys,
    Lookup::HasAnyKeys,
    Lookup::Lt,
    Lookup::Lte,
    Lookup::Gt,
    Lookup::Gte,
    Lookup::IsNull,
];

const FUNCTION_FIELD: &[Lookup] = &[
    Lookup::Exact,
    Lookup::Contains,
    Lookup::ContainedBy,
    Lookup::HasKey,
    Lookup::HasKeys,
    Lookup::HasAnyKeys,
    Lookup::IsNull,
];

const GENERIC_FIELD: &[Lookup] = &[Lookup::IsNull];

// Members extracted by a key path, identical for both JSON backends.
const JSON_KEY_PATH: &[Lookup] = &[
    Lookup::Exact,
    Lookup::IExact,
    Lookup::Contains,
    Lookup::IContains,
    Lookup::ContainedBy,
    Lookup::HasKey,
    Lookup::HasKeys,
    Lookup::HasAnyKeys,
    Lookup::StartsWith,
    Lookup::IStartsWith,
    Lookup::EndsWith,
    Lookup::IEndsWith,
    Lookup::Regex,
    Lookup::IRegex,
    Lookup::Lt,
    Lookup::Lte,
    Lookup::Gt,
    Lookup::Gte,
];

const GENERIC_KEY_PATH: &[Lookup] = &[];

/// The lookups a backend supports on the given target.
pub fn supported_lookups(backend: Backend, target: Target) -> &'static [Lookup] {
    match (backend, target) {
        (Backend::RichJson, Target::Field) => RICH_FIELD,
        (Backend::FunctionJson, Target::Field) => FUNCTION_FIELD,
        (Backend::Generic, Target::Field) => GENERIC_FIELD,
        (Backend::RichJson | Backend::FunctionJson, Target::KeyPath) => JSON_KEY_PATH,
        (Backend::Generic, Target::KeyPath) => GENERIC_KEY_PATH,
    }
}

pub fn supports(lookup: Lookup, target: Target, backend: Backend) -> bool {
    supported_lookups(backend, target).contains(&lookup)
}

/// Refuses a lookup the backend cannot translate.
pub fn check(lookup: Lookup, target: Target, backend: Backend) -> Result<(), Error> {
    if supports(lookup, target, backend) {
        Ok(())
    } else {
        Err(Error::unsupported(lookup.name(), backend))
    }
}
