// dump.rs: Describe a layout key by key for display tools.
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

use log::warn;
use serde::Serialize;
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::descriptor::PhysicalLayout;
use crate::emitter::LEVELS;
use crate::error::{Error, Position, Result};
use crate::keysym::{resolve, KeysymLookup};
use crate::parser::{KeyId, ParsedLayout};

/// Modifiers that select each of the eight levels.
pub const LEVEL_MODIFIERS: [&[&str]; LEVELS] = [
    &[],
    &["Shift"],
    &["Mod5"],
    &["Shift", "Mod5"],
    &["Mod3"],
    &["Shift", "Mod3"],
    &["Mod3", "Mod5"],
    &["Shift", "Mod3", "Mod5"],
];

/// Placeholder drawn under combining marks.
const DOTTED_CIRCLE: char = '◌';

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct LevelDump {
    pub modifiers: &'static [&'static str],
    pub symbol: String,
    pub keysym: String,
    pub display: String,
    pub diacritic: bool,
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct KeyDump {
    pub label: String,
    pub code: u8,
    pub name: String,
    pub levels: Vec<LevelDump>,
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct LayoutDump {
    pub layout: &'static str,
    pub rows: Vec<Vec<KeyDump>>,
}

/// Combining marks and connector punctuation, which render on top of or
/// between other glyphs.
fn is_diacritic(c: char) -> bool {
    matches!(get_general_category(c),
             GeneralCategory::NonspacingMark | GeneralCategory::SpacingMark |
             GeneralCategory::EnclosingMark | GeneralCategory::ConnectorPunctuation)
}

fn level<L: KeysymLookup + ?Sized>(lookup: &L, index: usize, symbol: &str) -> LevelDump {
    let keysym = resolve(lookup, symbol);
    let diacritic = keysym.starts_with("dead_") || symbol.chars().next().map_or(false, is_diacritic);
    let display = if diacritic {
        format!("{}{}", DOTTED_CIRCLE, symbol)
    } else {
        symbol.to_owned()
    };
    LevelDump { modifiers: LEVEL_MODIFIERS[index], symbol: symbol.to_owned(), keysym, display, diacritic }
}

/// Lay the parsed keys out on `physical`, one entry per physical key.
///
/// Keys that are not part of `physical` are skipped with a warning. Keys
/// without a definition get eight empty levels. A grid record and a name
/// record that land on the same physical key are a `DuplicateKey` error.
pub fn dump<L: KeysymLookup + ?Sized>(layout: &ParsedLayout,
                                      physical: &'static PhysicalLayout,
                                      lookup: &L) -> Result<LayoutDump> {
    let mut placed: Vec<Option<(Position, &[String])>> = vec![None; physical.key_count()];
    let offsets: Vec<usize> = physical.row_sizes.iter().scan(0, |start, &size| {
        let offset = *start;
        *start += size;
        Some(offset)
    }).collect();

    for record in &layout.keys {
        let position = match record.id {
            KeyId::Grid { row, column } => physical.key_name(row, column).map(|_| (row, column)),
            KeyId::Name(ref name) => physical.position_of(name),
        };
        let (row, column) = match position {
            Some(position) => position,
            None => {
                warn!("{}: key {} is not on the {} keyboard, skipping",
                      record.position, record.id, physical.name);
                continue;
            }
        };
        let slot = &mut placed[offsets[row] + column];
        if let Some((first, _)) = *slot {
            return Err(Error::DuplicateKey {
                position: record.position,
                first,
                key: format!("<{}>", physical.key_name(row, column).unwrap_or_default()),
            });
        }
        *slot = Some((record.position, record.symbols.as_slice()));
    }

    let rows: Vec<Vec<KeyDump>> = physical.rows().map(|row| {
        row.labels.chars().zip(row.codes).enumerate().map(|(column, (label, &code))| {
            let symbols = placed[offsets[row.index] + column].map_or(&[][..], |(_, symbols)| symbols);
            let levels = (0 .. LEVELS).map(|i| {
                level(lookup, i, symbols.get(i).map_or("", |s| &**s))
            }).collect();
            KeyDump {
                label: label.to_string(),
                code,
                name: physical.key_name(row.index, column).unwrap_or_default(),
                levels,
            }
        }).collect()
    }).collect();

    Ok(LayoutDump { layout: physical.name, rows })
}

#[cfg(test)]
use crate::descriptor::{ANSI_104, ISO_105};
#[cfg(test)]
use crate::keysym::KeysymTable;
#[cfg(test)]
use crate::parser::parse;

#[test]
fn test_dump_shape() {
    let result = dump(&parse("").unwrap(), &ISO_105, &KeysymTable).unwrap();
    assert_eq!(result.layout, "iso-105");
    let sizes: Vec<_> = result.rows.iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![13, 12, 12, 11]);
    for key in result.rows.iter().flatten() {
        assert_eq!(key.levels.len(), LEVELS);
        assert!(key.levels.iter().all(|l| l.symbol.is_empty() && l.keysym == "NoSymbol"));
    }

    let first = &result.rows[0][0];
    assert_eq!((&*first.label, first.code, &*first.name), ("¬", 49, "TLDE"));
    let last = &result.rows[3][10];
    assert_eq!((&*last.label, last.code, &*last.name), ("/", 61, "AB11"));
}

#[test]
fn test_dump_places_keys() {
    let layout = parse("11=[w W ω Ω]\n<AC01>=[a A]\n<LSGT>=[x]\n<FK01>=[y]").unwrap();
    let result = dump(&layout, &ANSI_104, &KeysymTable).unwrap();

    let w = &result.rows[1][1];
    assert_eq!(w.label, "W");
    assert_eq!(w.code, 25);
    let keysyms: Vec<_> = w.levels.iter().map(|l| &*l.keysym).collect();
    assert_eq!(keysyms, vec!["w", "W", "Greek_omega", "Greek_OMEGA",
                             "NoSymbol", "NoSymbol", "NoSymbol", "NoSymbol"]);
    assert_eq!(w.levels[3].modifiers, &["Shift", "Mod5"]);
    assert_eq!(result.rows[2][0].levels[1].symbol, "A");

    // Neither LSGT nor FK01 exist on an ANSI keyboard.
    assert!(result.rows.iter().flatten().all(|k| k.levels[0].symbol != "x" && k.levels[0].symbol != "y"));
}

#[test]
fn test_dump_diacritics() {
    let layout = parse("00=[\u{302} dead_grave _ a]").unwrap();
    let levels = &dump(&layout, &ISO_105, &KeysymTable).unwrap().rows[0][0].levels;
    assert!(levels[0].diacritic);
    assert_eq!(levels[0].display, "◌\u{302}");
    assert_eq!(levels[0].keysym, "U0302");
    assert!(levels[1].diacritic);
    assert!(levels[2].diacritic);
    assert_eq!(levels[2].keysym, "underscore");
    assert!(!levels[3].diacritic);
    assert_eq!(levels[3].display, "a");
}

#[test]
fn test_dump_json() {
    let layout = parse("00=[a]").unwrap();
    let json = serde_json::to_value(dump(&layout, &ISO_105, &KeysymTable).unwrap()).unwrap();
    assert_eq!(json["layout"], "iso-105");
    assert_eq!(json["rows"][0][0]["levels"][0]["keysym"], "a");
    assert_eq!(json["rows"][0][0]["levels"][1]["modifiers"], serde_json::json!(["Shift"]));
}

#[test]
fn test_is_diacritic() {
    // Spacing, nonspacing and enclosing marks outside the Latin combining block.
    for &c in &['\u{903}', '\u{93c}', '\u{610}', '\u{20dd}', '\u{302}', '‿', '_'] {
        assert!(is_diacritic(c), "{:?}", c);
    }
    for &c in &['a', '-', '◌', '\u{2c8}', ' '] {
        assert!(!is_diacritic(c), "{:?}", c);
    }
}

#[test]
fn test_dump_rejects_shared_key() {
    let layout = parse("20=[a]\n<AC01>=[b]").unwrap();
    match dump(&layout, &ISO_105, &KeysymTable) {
        Err(Error::DuplicateKey { position, first, key }) => {
            assert_eq!(position, Position { line: 2, column: 1 });
            assert_eq!(first, Position { line: 1, column: 1 });
            assert_eq!(key, "<AC01>");
        }
        other => panic!("expected a duplicate key error, got {:?}", other),
    }
}
