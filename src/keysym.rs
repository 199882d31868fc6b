// keysym.rs: Map symbols to XKB keysym names.
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

use std::collections::HashMap;

use lazy_static::lazy_static;
use xkeysym::Keysym;

/// Name of the empty keysym.
pub const NO_SYMBOL: &str = "NoSymbol";

/// A registry of keysym names, as provided by the windowing system.
pub trait KeysymLookup {
    /// The registered keysym name for a code point, if any.
    fn name_for(&self, c: char) -> Option<&str>;

    /// The code point a registered keysym name stands for.
    fn char_for(&self, name: &str) -> Option<char>;
}

lazy_static! {
    // xkeysym only maps keysym to name, so build the other direction once.
    static ref BY_NAME: HashMap<&'static str, char> = {
        let mut names = HashMap::new();
        for c in '\0'..=char::MAX {
            if let Some(name) = x11_name(c) {
                names.entry(name).or_insert(c);
            }
        }
        names
    };
}

fn x11_name(c: char) -> Option<&'static str> {
    Keysym::from_char(c).name().map(|name| name.strip_prefix("XK_").unwrap_or(name))
}

/// The X11 keysym registry, as shipped in `keysymdef.h`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct KeysymTable;

impl KeysymLookup for KeysymTable {
    fn name_for(&self, c: char) -> Option<&str> {
        x11_name(c)
    }

    fn char_for(&self, name: &str) -> Option<char> {
        BY_NAME.get(name).copied()
    }
}

/// Turn one parsed symbol into the keysym name used in the symbols file.
///
/// A symbol of several code points is taken to be a keysym name already
/// (`dead_acute`, `VoidSymbol`, ...) and is returned as is. A single code
/// point without a registered name becomes `U` followed by at least four
/// hex digits.
pub fn resolve<L: KeysymLookup + ?Sized>(lookup: &L, symbol: &str) -> String {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (None, _) => NO_SYMBOL.to_owned(),
        (Some(c), None) => match lookup.name_for(c) {
            Some(name) => name.to_owned(),
            None => format!("U{:04X}", c as u32),
        },
        _ => symbol.to_owned(),
    }
}

/// Inverse of `resolve`: the symbol that a keysym name stands for.
pub fn symbol_for<L: KeysymLookup + ?Sized>(lookup: &L, name: &str) -> String {
    if name == NO_SYMBOL {
        return String::new();
    }
    if let Some(c) = lookup.char_for(name) {
        return c.to_string();
    }
    let unicode = name.strip_prefix('U').filter(|hex| {
        hex.len() >= 4 && hex.bytes().all(|b| b.is_ascii_digit() || (b'A' ..= b'F').contains(&b))
    });
    match unicode.and_then(|hex| u32::from_str_radix(hex, 16).ok()).and_then(char::from_u32) {
        Some(c) => c.to_string(),
        None => name.to_owned(),
    }
}

#[cfg(test)]
struct EmptyLookup;

#[cfg(test)]
impl KeysymLookup for EmptyLookup {
    fn name_for(&self, _: char) -> Option<&str> {
        None
    }

    fn char_for(&self, _: &str) -> Option<char> {
        None
    }
}

#[test]
fn test_resolve() {
    let table = KeysymTable;
    assert_eq!(resolve(&table, ""), "NoSymbol");
    assert_eq!(resolve(&table, "a"), "a");
    assert_eq!(resolve(&table, "7"), "7");
    assert_eq!(resolve(&table, " "), "space");
    assert_eq!(resolve(&table, "ä"), "adiaeresis");
    assert_eq!(resolve(&table, "€"), "EuroSign");
    assert_eq!(resolve(&table, "ω"), "Greek_omega");
    assert_eq!(resolve(&table, "ə"), "schwa");
    assert_eq!(resolve(&table, "ʒ"), "ezh");
    assert_eq!(resolve(&table, "₂"), "twosubscript");
    assert_eq!(resolve(&table, "dead_acute"), "dead_acute");
    // Two code points, even if it is a single grapheme.
    assert_eq!(resolve(&table, "e\u{301}"), "e\u{301}");
}

#[test]
fn test_resolve_fallback() {
    let table = KeysymTable;
    assert_eq!(resolve(&table, "\u{e000}"), "UE000");
    assert_eq!(resolve(&table, "\u{f8ff}"), "UF8FF");
    assert_eq!(resolve(&table, "\u{ffff}"), "UFFFF");
    assert_eq!(resolve(&table, "😀"), "U1F600");
    assert_eq!(resolve(&table, "\u{10ffff}"), "U10FFFF");
    assert_eq!(resolve(&EmptyLookup, "a"), "U0061");
}

#[test]
fn test_symbol_for() {
    let table = KeysymTable;
    assert_eq!(symbol_for(&table, "NoSymbol"), "");
    assert_eq!(symbol_for(&table, "adiaeresis"), "ä");
    assert_eq!(symbol_for(&table, "schwa"), "ə");
    assert_eq!(symbol_for(&table, "U0259"), "ə");
    assert_eq!(symbol_for(&table, "UE000"), "\u{e000}");
    assert_eq!(symbol_for(&table, "U1F600"), "😀");
    assert_eq!(symbol_for(&table, "dead_grave"), "dead_grave");
    assert_eq!(symbol_for(&table, "Ufoo"), "Ufoo");
    assert_eq!(symbol_for(&table, "U"), "U");

    for c in (' '..='\u{17f}').chain('\u{370}'..='\u{3ff}').chain('\u{2070}'..='\u{20bf}') {
        if let Some(name) = table.name_for(c) {
            assert_eq!(resolve(&table, &c.to_string()), name);
            assert_eq!(symbol_for(&table, name), c.to_string());
        }
    }
}
