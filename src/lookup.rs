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
use std::str::FromStr;

use crate::Error;
use crate::Value;

/// The fixed set of operators a JSON field reference can be queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lookup {
    Exact,
    IExact,
    /// Containment on a whole value, substring match on a key path.
    Contains,
    IContains,
    ContainedBy,
    HasKey,
    HasKeys,
    HasAnyKeys,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Regex,
    IRegex,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Range,
    Search,
    IsNull,
}

/// Lookups that have no meaning on a whole JSON value.
pub const WHOLE_VALUE_REFUSED: &[Lookup] = &[
    Lookup::Range,
    Lookup::In,
    Lookup::IExact,
    Lookup::IContains,
    Lookup::StartsWith,
    Lookup::IStartsWith,
    Lookup::EndsWith,
    Lookup::IEndsWith,
    Lookup::Search,
    Lookup::Regex,
    Lookup::IRegex,
];

impl Lookup {
    pub const ALL: [Lookup; 22] = [
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
        Lookup::In,
        Lookup::Range,
        Lookup::Search,
        Lookup::IsNull,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Lookup::Exact => "exact",
            Lookup::IExact => "iexact",
            Lookup::Contains => "contains",
            Lookup::IContains => "icontains",
            Lookup::ContainedBy => "contained_by",
            Lookup::HasKey => "has_key",
            Lookup::HasKeys => "has_keys",
            Lookup::HasAnyKeys => "has_any_keys",
            Lookup::StartsWith => "startswith",
            Lookup::IStartsWith => "istartswith",
            Lookup::EndsWith => "endswith",
            Lookup::IEndsWith => "iendswith",
            Lookup::Regex => "regex",
            Lookup::IRegex => "iregex",
            Lookup::Lt => "lt",
            Lookup::Lte => "lte",
            Lookup::Gt => "gt",
            Lookup::Gte => "gte",
            Lookup::In => "in",
            Lookup::Range => "range",
            Lookup::Search => "search",
            Lookup::IsNull => "isnull",
        }
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Lookup::IExact
                | Lookup::IContains
                | Lookup::IStartsWith
                | Lookup::IEndsWith
                | Lookup::IRegex
        )
    }

    /// Whether a nested host expression is accepted as right operand.
    pub fn accepts_expression(&self) -> bool {
        matches!(
            self,
            Lookup::Exact
                | Lookup::Contains
                | Lookup::ContainedBy
                | Lookup::Lt
                | Lookup::Lte
                | Lookup::Gt
                | Lookup::Gte
        )
    }

    /// Validates a literal right operand and converts it to the typed
    /// operand the lookup works with.
    pub fn operand<E>(&self, value: Value) -> Result<Operand<E>, Error> {
        let name = self.name();
        match self {
            Lookup::HasKey => match value {
                Value::String(key) => Ok(Operand::Key(key)),
                _ => Err(Error::operand(name, "string values")),
            },
            Lookup::HasKeys | Lookup::HasAnyKeys => match value {
                Value::Array(values) if !values.is_empty() => values
                    .into_iter()
                    .map(|v| match v {
                        Value::String(key) => Ok(key),
                        _ => Err(Error::operand(name, "sequences of strings")),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Operand::Keys),
                _ => Err(Error::operand(name, "non-empty sequences of strings")),
            },
            Lookup::IsNull => match value {
                Value::Bool(_) => Ok(Operand::Value(value)),
                _ => Err(Error::operand(name, "boolean values")),
            },
            Lookup::Regex | Lookup::IRegex => match value {
                Value::String(_) => Ok(Operand::Value(value)),
                _ => Err(Error::operand(name, "string patterns")),
            },
            Lookup::In => match value {
                Value::Array(_) => Ok(Operand::Value(value)),
                _ => Err(Error::operand(name, "sequences")),
            },
            Lookup::Range => match value {
                Value::Array(bounds) if bounds.len() == 2 => {
                    Ok(Operand::Value(Value::Array(bounds)))
                }
                _ => Err(Error::operand(name, "two-element sequences")),
            },
            Lookup::Search => match value {
                Value::String(_) => Ok(Operand::Value(value)),
                _ => Err(Error::operand(name, "string values")),
            },
            Lookup::Exact
            | Lookup::IExact
            | Lookup::Contains
            | Lookup::IContains
            | Lookup::ContainedBy
            | Lookup::StartsWith
            | Lookup::IStartsWith
            | Lookup::EndsWith
            | Lookup::IEndsWith
            | Lookup::Lt
            | Lookup::Lte
            | Lookup::Gt
            | Lookup::Gte => Ok(Operand::Value(value)),
        }
    }

    /// Validates a nested host expression as right operand.
    pub fn expression_operand<E>(&self, expr: E) -> Result<Operand<E>, Error> {
        if self.accepts_expression() {
            Ok(Operand::Expr(expr))
        } else {
            Err(Error::operand(self.name(), "literal values"))
        }
    }
}

impl Display for Lookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Lookup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lookup::ALL
            .iter()
            .find(|lookup| lookup.name() == s)
            .copied()
            .ok_or_else(|| Error::UnknownLookup(s.to_string()))
    }
}

/// Whether a lookup applies to the whole value or to a member inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Field,
    KeyPath,
}

/// A validated right operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<E> {
    /// A literal value.
    Value(Value),
    /// A single member name.
    Key(String),
    /// A non-empty list of member names.
    Keys(Vec<String>),
    /// A nested host expression, compiled through the compiler callback.
    Expr(E),
}
