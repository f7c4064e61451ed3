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

use std::sync::Arc;

use crate::backend::ConnectionInfo;
use crate::capability;
use crate::codec::Encoder;
use crate::expr::Compiler;
use crate::fragment::Fragment;
use crate::functions::translate;
use crate::functions::Context;
use crate::functions::Rhs;
use crate::keypath::KeyPath;
use crate::keypath::PathSegment;
use crate::keypath::LOOKUP_SEP;
use crate::lookup::Lookup;
use crate::lookup::Operand;
use crate::lookup::Target;
use crate::lookup::WHOLE_VALUE_REFUSED;
use crate::path::navigate;
use crate::path::Extract;
use crate::Error;
use crate::Value;

/// A reference to a JSON value, or to a member inside it.
///
/// `source` is the host expression holding the document. Every call to
/// [`JsonRef::key`] appends one navigation step.
#[derive(Debug, Clone)]
pub struct JsonRef<E> {
    source: E,
    path: KeyPath,
    encoder: Arc<dyn Encoder>,
}

impl<E> JsonRef<E> {
    pub fn new(source: E, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            source,
            path: KeyPath::default(),
            encoder,
        }
    }

    pub fn source(&self) -> &E {
        &self.source
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn target(&self) -> Target {
        if self.path.is_empty() {
            Target::Field
        } else {
            Target::KeyPath
        }
    }

    /// Navigates one step further, into an object member or array element.
    pub fn key(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path = self.path.child(segment);
        self
    }

    /// Builds a lookup with a literal right operand.
    pub fn lookup(self, name: &str, value: impl Into<Value>) -> Result<LookupExpr<E>, Error> {
        let lookup = self.resolve(name)?;
        let operand = lookup.operand(value.into())?;
        Ok(self.build(lookup, operand))
    }

    /// Builds a lookup whose right operand is another host expression.
    pub fn lookup_expr(self, name: &str, expr: E) -> Result<LookupExpr<E>, Error> {
        let lookup = self.resolve(name)?;
        let operand = lookup.expression_operand(expr)?;
        Ok(self.build(lookup, operand))
    }

    /// Builds a lookup from a navigation chain such as `"title__icontains"`
    /// or `"tags__0"`. A chain not ending in a lookup name means `exact`.
    pub fn filter(self, chain: &str, value: impl Into<Value>) -> Result<LookupExpr<E>, Error> {
        let (path, lookup) = split_chain(chain)?;
        let mut reference = self;
        for segment in path.segments() {
            reference = reference.key(segment.clone());
        }
        reference.lookup(lookup.name(), value)
    }

    /// Compiles the reference itself, the member at the path as JSON.
    pub fn as_sql<C>(
        &self,
        compiler: &mut C,
        connection: &ConnectionInfo,
    ) -> Result<Fragment, Error>
    where
        C: Compiler<E>,
    {
        let source = compiler.compile(&self.source)?;
        let fragment = navigate(connection.backend(), source, &self.path, Extract::Json)?;
        log::debug!("compiled key path {} on {}: {}", self.path, connection.alias(), fragment);
        Ok(fragment)
    }

    // Whole values refuse the lookups that only make sense on members.
    fn resolve(&self, name: &str) -> Result<Lookup, Error> {
        let lookup = name.parse::<Lookup>()?;
        if self.target() == Target::Field && WHOLE_VALUE_REFUSED.contains(&lookup) {
            return Err(Error::LookupNotImplemented(lookup.name()));
        }
        Ok(lookup)
    }

    fn build(self, lookup: Lookup, operand: Operand<E>) -> LookupExpr<E> {
        LookupExpr {
            lookup,
            target: self.target(),
            source: self.source,
            path: self.path,
            operand,
            encoder: self.encoder,
        }
    }
}

fn split_chain(chain: &str) -> Result<(KeyPath, Lookup), Error> {
    if chain.is_empty() {
        return Ok((KeyPath::default(), Lookup::Exact));
    }
    let (head, tail) = match chain.rsplit_once(LOOKUP_SEP) {
        Some((head, tail)) => (Some(head), tail),
        None => (None, chain),
    };
    match tail.parse::<Lookup>() {
        Ok(lookup) => {
            let path = match head {
                Some(head) => KeyPath::from_lookup(head)?,
                None => KeyPath::default(),
            };
            Ok((path, lookup))
        }
        Err(_) => Ok((KeyPath::from_lookup(chain)?, Lookup::Exact)),
    }
}

/// A resolved lookup, ready to be compiled against a connection.
#[derive(Debug, Clone)]
pub struct LookupExpr<E> {
    lookup: Lookup,
    target: Target,
    source: E,
    path: KeyPath,
    operand: Operand<E>,
    encoder: Arc<dyn Encoder>,
}

impl<E> LookupExpr<E> {
    pub fn lookup(&self) -> Lookup {
        self.lookup
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn operand(&self) -> &Operand<E> {
        &self.operand
    }

    /// Compiles the lookup to SQL for the connection's backend.
    ///
    /// The capability gate runs first, so an unsupported lookup never
    /// reaches the compiler.
    pub fn as_sql<C>(
        &self,
        compiler: &mut C,
        connection: &ConnectionInfo,
    ) -> Result<Fragment, Error>
    where
        C: Compiler<E>,
    {
        capability::check(self.lookup, self.target, connection.backend())?;
        let lhs = compiler.compile(&self.source)?;
        let rhs = match &self.operand {
            Operand::Value(value) => Rhs::Value(value),
            Operand::Key(key) => Rhs::Key(key),
            Operand::Keys(keys) => Rhs::Keys(keys),
            Operand::Expr(expr) => Rhs::Sql(compiler.compile(expr)?),
        };
        let ctx = Context {
            connection,
            encoder: &self.encoder,
        };
        let fragment = translate(&ctx, self.lookup, lhs, &self.path, rhs)?;
        log::debug!(
            "compiled lookup {} on {} ({}): {}",
            self.lookup,
            connection.alias(),
            connection.backend(),
            fragment
        );
        Ok(fragment)
    }
}
