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

use nom::branch::alt;
use nom::bytes::complete::escaped_transform;
use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::character::complete::multispace0;
use nom::character::complete::none_of;
use nom::character::complete::one_of;
use nom::combinator::map;
use nom::combinator::opt;
use nom::multi::separated_list1;
use nom::sequence::delimited;
use nom::sequence::preceded;
use nom::sequence::terminated;
use nom::IResult;
use nom::Parser;

use crate::Error;

/// Separator between navigation steps in a lookup string, `data__a__0`.
pub const LOOKUP_SEP: &str = "__";

/// Represents a key path inside a JSON value.
/// Displayed in the PostgreSQL text array syntax, `{a,0,b}`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct KeyPath {
    segments: Vec<PathSegment>,
}

/// Represents one navigation step of a key path.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum PathSegment {
    /// represents the index of an Array, allow negative indexing.
    Index(i64),
    /// represents the field name of an Object.
    Key(String),
}

impl PathSegment {
    /// A token is an index if and only if it is an optional `-` followed by
    /// ASCII digits and fits in an `i64`. Anything else is an object key,
    /// including `+5` and integers out of range.
    pub fn from_token(token: &str) -> PathSegment {
        let digits = token.strip_prefix('-').unwrap_or(token);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(idx) = token.parse::<i64>() {
                return PathSegment::Index(idx);
            }
        }
        PathSegment::Key(token.to_string())
    }
}

impl From<&str> for PathSegment {
    fn from(token: &str) -> Self {
        PathSegment::from_token(token)
    }
}

impl From<String> for PathSegment {
    fn from(token: String) -> Self {
        PathSegment::from_token(&token)
    }
}

impl From<i64> for PathSegment {
    fn from(idx: i64) -> Self {
        PathSegment::Index(idx)
    }
}

impl From<i32> for PathSegment {
    fn from(idx: i32) -> Self {
        PathSegment::Index(idx as i64)
    }
}

impl KeyPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(tokens.into_iter().map(PathSegment::from_token).collect())
    }

    /// Parses the navigation part of a lookup string, `a__0__b`.
    pub fn from_lookup(lookup: &str) -> Result<Self, Error> {
        if lookup.is_empty() {
            return Ok(Self::default());
        }
        let tokens = lookup.split(LOOKUP_SEP).collect::<Vec<_>>();
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(Error::InvalidKeyPath(lookup.to_string()));
        }
        Ok(Self::from_tokens(tokens))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns a new path with one more navigation step.
    pub fn child(&self, segment: impl Into<PathSegment>) -> KeyPath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        KeyPath { segments }
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key_paths(s)
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match segment {
                PathSegment::Index(idx) => write!(f, "{idx}")?,
                PathSegment::Key(name) if needs_quotes(name) => {
                    write!(f, "\"")?;
                    for c in name.chars() {
                        if c == '"' || c == '\\' {
                            write!(f, "\\")?;
                        }
                        write!(f, "{c}")?;
                    }
                    write!(f, "\"")?;
                }
                PathSegment::Key(name) => write!(f, "{name}")?,
            }
        }
        write!(f, "}}")?;
        Ok(())
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Index(idx) => write!(f, "{idx}"),
            PathSegment::Key(name) => write!(f, "{name}"),
        }
    }
}

fn needs_quotes(name: &str) -> bool {
    name.is_empty()
        || name.eq_ignore_ascii_case("null")
        || matches!(PathSegment::from_token(name), PathSegment::Index(_))
        || name
            .chars()
            .any(|c| matches!(c, '{' | '}' | ',' | '"' | '\\') || c.is_whitespace())
}

/// Parsing the input string to a key path.
/// Quoted elements are always object keys, bare integers are array indices.
pub fn parse_key_paths(input: &str) -> Result<KeyPath, Error> {
    match key_paths(input) {
        Ok((rest, segments)) => {
            if !rest.is_empty() {
                return Err(Error::InvalidKeyPath(input.to_string()));
            }
            Ok(KeyPath { segments })
        }
        Err(_) => Err(Error::InvalidKeyPath(input.to_string())),
    }
}

fn raw_string(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !matches!(c, '{' | '}' | ',' | '"' | '\\') && !c.is_whitespace())
        .parse(input)
}

fn string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(none_of("\\\""), '\\', one_of("\\\""))),
            Option::unwrap_or_default,
        ),
        char('"'),
    )
    .parse(input)
}

fn key_path(input: &str) -> IResult<&str, PathSegment> {
    alt((
        map(string, PathSegment::Key),
        map(raw_string, PathSegment::from_token),
    ))
    .parse(input)
}

fn key_paths(input: &str) -> IResult<&str, Vec<PathSegment>> {
    alt((
        delimited(
            preceded(multispace0, char('{')),
            separated_list1(char(','), delimited(multispace0, key_path, multispace0)),
            terminated(char('}'), multispace0),
        ),
        map(
            delimited(
                preceded(multispace0, char('{')),
                multispace0,
                terminated(char('}'), multispace0),
            ),
            |_| vec![],
        ),
    ))
    .parse(input)
}
