// error.rs: Errors raised while compiling a layout.
// Copyright (C) 2015  Kenny Chan
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <http://www.gnu.org/licenses/>.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// A position in the original input file, both 1-based.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{position}: {message}")]
    Syntax { position: Position, message: String },

    #[error("{position}: duplicate definition of key {key} (first defined at {first})")]
    DuplicateKey { position: Position, first: Position, key: String },

    #[error("{position}: row {row}, column {column} is outside the {layout} layout")]
    KeyOutOfRange { position: Position, layout: &'static str, row: usize, column: usize },

    #[error("{position}: key {key} has no name without a physical layout")]
    Unnamed { position: Position, key: String },

    #[error("unknown layout '{0}' (expected one of: {1})")]
    UnknownLayout(String, String),

    #[error("cannot read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn syntax<S: Into<String>>(position: Position, message: S) -> Error {
        Error::Syntax { position, message: message.into() }
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
