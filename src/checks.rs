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

/// Nullable JSON field on a function-based connection.
pub const E001: &str = "jsonfallback.E001";
/// No function-based connection meets the minimum server version.
pub const E002: &str = "jsonfallback.E002";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn is_serious(&self) -> bool {
        *self >= Level::Error
    }
}

/// A configuration problem found by a field check.
///
/// Diagnostics are collected and returned to the caller, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: &'static str,
    pub level: Level,
    pub msg: String,
    pub hint: Option<String>,
    pub obj: Option<String>,
}

impl Diagnostic {
    pub fn error(id: &'static str, msg: impl Into<String>) -> Self {
        Self {
            id,
            level: Level::Error,
            msg: msg.into(),
            hint: None,
            obj: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_obj(mut self, obj: impl Into<String>) -> Self {
        self.obj = Some(obj.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let obj = self.obj.as_deref().unwrap_or("?");
        write!(f, "{}: ({}) {}", obj, self.id, self.msg)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n\tHINT: {hint}")?;
        }
        Ok(())
    }
}
