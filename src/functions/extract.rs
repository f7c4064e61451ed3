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
use crate::backend::ConnectionInfo;
use crate::expr::Compiler;
use crate::fragment::Fragment;
use crate::fragment::SqlParam;
use crate::keypath::KeyPath;
use crate::path::compile_json_path;
use crate::Error;

/// A select-list expression returning the JSON member at `path`, the
/// `#>` operator on the rich backend and `JSON_EXTRACT` on the
/// function-based one.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonExtract<E> {
    pub source: E,
    pub path: KeyPath,
}

impl<E> JsonExtract<E> {
    pub fn new(source: E, path: KeyPath) -> Self {
        Self { source, path }
    }

    pub fn as_sql<C>(
        &self,
        compiler: &mut C,
        connection: &ConnectionInfo,
    ) -> Result<Fragment, Error>
    where
        C: Compiler<E>,
    {
        let source = compiler.compile(&self.source)?;
        match connection.backend() {
            _ if self.path.is_empty() => Ok(source),
            Backend::RichJson => {
                let path = Fragment::param(SqlParam::Text(self.path.to_string()));
                Ok(Fragment::format("({} #> {})", vec![source, path]))
            }
            Backend::FunctionJson => {
                let path = Fragment::param(SqlParam::Text(compile_json_path(&self.path)));
                Ok(Fragment::format("JSON_EXTRACT({}, {})", vec![source, path]))
            }
            backend @ Backend::Generic => Err(Error::unsupported("json_extract", backend)),
        }
    }
}
