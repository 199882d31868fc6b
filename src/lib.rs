// lib.rs: Compile keyboard layout descriptions into XKB symbols.
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

//! The compiler behind the `xkbgen` command.
//!
//! A layout description goes through `parser::parse` (which strips comments
//! first) and is rendered by `emitter::emit`, naming grid positions after one
//! of the `descriptor` keyboards and symbols after a `keysym::KeysymLookup`.

pub mod comments;
pub mod descriptor;
pub mod dump;
pub mod emitter;
pub mod error;
pub mod keysym;
pub mod parser;

pub use crate::descriptor::PhysicalLayout;
pub use crate::emitter::{emit, EmitOptions, Naming};
pub use crate::error::{Error, Result};
pub use crate::keysym::{KeysymLookup, KeysymTable};
pub use crate::parser::{parse, KeyId, KeyRecord, ParsedLayout};
