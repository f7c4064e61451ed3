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

use crate::backend::ConnectionInfo;
use crate::fragment::Fragment;
use crate::Error;

/// Compiles a host query expression into SQL text and parameters.
///
/// This is the seam to the surrounding query compiler: lookups call it for
/// the expression a JSON field reference starts from and for nested
/// right-hand expressions. Closures implement it.
pub trait Compiler<E: ?Sized> {
    fn compile(&mut self, expr: &E) -> Result<Fragment, Error>;
}

impl<E: ?Sized, F> Compiler<E> for F
where
    F: FnMut(&E) -> Result<Fragment, Error>,
{
    fn compile(&mut self, expr: &E) -> Result<Fragment, Error> {
        self(expr)
    }
}

/// A column reference, optionally qualified by its table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub table: Option<String>,
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

/// Compiles [`Column`] references with the quoting of the connection.
#[derive(Debug, Clone, Copy)]
pub struct ColumnCompiler<'a> {
    connection: &'a ConnectionInfo,
}

impl<'a> ColumnCompiler<'a> {
    pub fn new(connection: &'a ConnectionInfo) -> Self {
        Self { connection }
    }
}

impl Compiler<Column> for ColumnCompiler<'_> {
    fn compile(&mut self, column: &Column) -> Result<Fragment, Error> {
        let name = self.connection.quote_name(&column.name);
        let sql = match &column.table {
            Some(table) => format!("{}.{}", self.connection.quote_name(table), name),
            None => name,
        };
        Ok(Fragment::raw(sql))
    }
}
