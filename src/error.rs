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

use thiserror::Error;

use crate::backend::Backend;

/// Errors raised while building, translating or decoding JSON lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The operator has no translation on the active backend.
    #[error("'{operator}' is not supported on the {backend} backend")]
    UnsupportedOperator {
        operator: &'static str,
        backend: Backend,
    },
    /// The right-hand operand does not have the shape the operator requires.
    #[error("JSON field's '{operator}' lookup only works with {expected}")]
    UnsupportedOperandType {
        operator: &'static str,
        expected: &'static str,
    },
    /// The lookup has no meaning when applied to a whole JSON value.
    #[error("Lookup '{0}' doesn't work with JSON fields")]
    LookupNotImplemented(&'static str),
    #[error("Unknown lookup '{0}'")]
    UnknownLookup(String),
    /// Stored text could not be parsed as JSON.
    #[error("Malformed JSON value: {0}")]
    MalformedValue(String),
    #[error("Value is not JSON serializable: {0}")]
    Unserializable(String),
    #[error("Invalid key path: {0}")]
    InvalidKeyPath(String),
    #[error("Invalid version string: {0}")]
    InvalidVersion(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl Error {
    pub(crate) fn unsupported(operator: &'static str, backend: Backend) -> Self {
        Error::UnsupportedOperator { operator, backend }
    }

    pub(crate) fn operand(operator: &'static str, expected: &'static str) -> Self {
        Error::UnsupportedOperandType { operator, expected }
    }
}
