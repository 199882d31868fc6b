// emitter.rs: Render parsed layouts as XKB symbols.
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

use handlebars::{handlebars_helper, no_escape, Handlebars};
use log::{debug, warn};
use serde::Serialize;

use crate::descriptor::PhysicalLayout;
use crate::error::{Error, Position, Result};
use crate::keysym::{resolve, KeysymLookup, NO_SYMBOL};
use crate::parser::{KeyId, KeyRecord, ParsedLayout};

/// Number of shift levels of an `EIGHT_LEVEL` key.
pub const LEVELS: usize = 8;

pub const DEFAULT_GROUP_NAME: &str = "English with IPA";

const BUILTIN_TEMPLATE: &str = include_str!("../templates/xkb_symbols.hbs");

/// Where key names come from.
#[derive(Clone, Copy, Debug)]
pub enum Naming<'a> {
    /// Grid positions are named by the physical layout.
    Descriptor(&'a PhysicalLayout),
    /// Only `<NAME>` records can be named.
    Names,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EmitOptions {
    pub group_name: String,
    /// Handlebars source replacing the built-in template.
    pub template: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions { group_name: DEFAULT_GROUP_NAME.to_owned(), template: None }
    }
}

#[derive(Serialize)]
struct SymbolsData<'a> {
    name: &'a str,
    keys: Vec<KeyData>,
}

#[derive(Serialize)]
struct KeyData {
    name: String,
    symbols: String,
}

//{{{ Escape

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                result.push('\\');
                result.push(c);
            }
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

handlebars_helper!(xkb_string: |s: str| escape_string(s));

#[test]
fn test_escape_string() {
    assert_eq!(escape_string(r#"Say "hi" \o/"#), r#"Say \"hi\" \\o/"#);
    assert_eq!(escape_string("a\nb"), "a\\nb");
}

//}}}

impl<'a> Naming<'a> {
    fn key_name(&self, record: &KeyRecord) -> Result<String> {
        match (&record.id, *self) {
            (KeyId::Name(name), _) => Ok(name.clone()),
            (&KeyId::Grid { row, column }, Naming::Descriptor(layout)) => {
                layout.key_name(row, column).ok_or(Error::KeyOutOfRange {
                    position: record.position,
                    layout: layout.name,
                    row,
                    column,
                })
            }
            (id, Naming::Names) => Err(Error::Unnamed {
                position: record.position,
                key: id.to_string(),
            }),
        }
    }
}

fn key_symbols<L: KeysymLookup + ?Sized>(lookup: &L, name: &str, record: &KeyRecord) -> String {
    let mut symbols: Vec<String> = record.symbols.iter().map(|s| resolve(lookup, s)).collect();
    if symbols.len() > LEVELS {
        warn!("{}: key <{}> has {} levels, more than the {} of EIGHT_LEVEL",
              record.position, name, symbols.len(), LEVELS);
    }
    symbols.resize(symbols.len().max(LEVELS), NO_SYMBOL.to_owned());
    symbols.join(", ")
}

/// Render `layout` as an `xkb_symbols` block.
///
/// Two records that resolve to the same key name, such as `20` and
/// `<AC01>` on `iso-105`, are a `DuplicateKey` error.
pub fn emit<L: KeysymLookup + ?Sized>(layout: &ParsedLayout,
                                      naming: Naming,
                                      lookup: &L,
                                      options: &EmitOptions) -> Result<String> {
    let mut keys = Vec::with_capacity(layout.keys.len());
    let mut seen: HashMap<String, Position> = HashMap::new();
    for record in &layout.keys {
        let name = naming.key_name(record)?;
        if let Some(&first) = seen.get(&name) {
            return Err(Error::DuplicateKey { position: record.position, first, key: format!("<{}>", name) });
        }
        seen.insert(name.clone(), record.position);
        let symbols = key_symbols(lookup, &name, record);
        keys.push(KeyData { name, symbols });
    }

    let mut template = Handlebars::new();
    template.set_strict_mode(true);
    template.register_escape_fn(no_escape);
    template.register_helper("xkb_string", Box::new(xkb_string));
    let source = options.template.as_deref().unwrap_or(BUILTIN_TEMPLATE);
    template.register_template_string("symbols", source)?;

    let data = SymbolsData { name: &options.group_name, keys };
    let result = template.render("symbols", &data)?;
    debug!("rendered {} keys into {} bytes", layout.keys.len(), result.len());
    Ok(result)
}

//{{{ Tests

#[cfg(test)]
use crate::descriptor::ISO_105;
#[cfg(test)]
use crate::keysym::KeysymTable;
#[cfg(test)]
use crate::parser::parse;

#[cfg(test)]
fn emit_default(input: &str) -> Result<String> {
    let layout = parse(input)?;
    emit(&layout, Naming::Descriptor(&ISO_105), &KeysymTable, &EmitOptions::default())
}

#[cfg(test)]
fn key_lines(output: &str) -> Vec<&str> {
    output.lines().filter(|l| l.starts_with("    key <") && !l.contains("ISO_Level")).collect()
}

#[test]
fn test_emit_full() {
    let output = emit_default("00=[a A]\n<AB01>=[z Z]").unwrap();
    assert_eq!(output, "\
default xkb_symbols \"basic\" {
    name[Group1]=\"English with IPA\";

    key.type[Group1] = \"EIGHT_LEVEL\";
    key <TLDE> { [ a, A, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol ] };
    key <AB01> { [ z, Z, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol ] };

    key.type[Group1] = \"ONE_LEVEL\";
    key <RALT> { [ ISO_Level3_Shift ] };
    key <MENU> { [ ISO_Level5_Shift ] };

    include \"level3(ralt_switch)\"
    include \"level5(menu_switch)\"
};
");
}

#[test]
fn test_emit_empty() {
    let output = emit_default("# nothing").unwrap();
    assert!(output.contains("\"EIGHT_LEVEL\";\n\n    key.type[Group1] = \"ONE_LEVEL\";\n"));
}

#[test]
fn test_emit_order_and_names() {
    let output = emit_default("2B=[x]\n00=[a]\n3A=[y]\n30=[z]").unwrap();
    let names: Vec<_> = key_lines(&output).iter().map(|l| &l[9..13]).collect();
    assert_eq!(names, vec!["BKSL", "TLDE", "AB11", "LSGT"]);
}

#[test]
fn test_emit_padding() {
    for n in 0 ..= LEVELS {
        let symbols: Vec<String> = (0 .. n).map(|i| ((b'a' + i as u8) as char).to_string()).collect();
        let output = emit_default(&format!("10=[{}]", symbols.join(" "))).unwrap();
        let line = key_lines(&output)[0];
        let list = &line[line.find("[ ").unwrap() + 2 .. line.rfind(" ]").unwrap()];
        let entries: Vec<_> = list.split(", ").collect();
        assert_eq!(entries.len(), LEVELS);
        assert_eq!(&entries[..n], &symbols.iter().map(|s| &**s).collect::<Vec<_>>()[..]);
        assert!(entries[n..].iter().all(|&e| e == "NoSymbol"));
    }
}

#[test]
fn test_emit_too_many_levels() {
    let output = emit_default("10=[1 2 3 4 5 6 7 8 9]").unwrap();
    assert_eq!(key_lines(&output), vec![
        "    key <AD01> { [ 1, 2, 3, 4, 5, 6, 7, 8, 9 ] };",
    ]);
}

#[test]
fn test_emit_resolves_symbols() {
    let output = emit_default("01=[ä ə '' dead_acute ' ']").unwrap();
    assert_eq!(key_lines(&output), vec![
        "    key <AE01> { [ adiaeresis, schwa, NoSymbol, dead_acute, space, NoSymbol, NoSymbol, NoSymbol ] };",
    ]);
}

#[test]
fn test_emit_out_of_range() {
    match emit_default("00=[a]\n0D=[b]") {
        Err(Error::KeyOutOfRange { position, layout, row, column }) => {
            assert_eq!(position, Position { line: 2, column: 1 });
            assert_eq!(layout, "iso-105");
            assert_eq!((row, column), (0, 13));
        }
        other => panic!("expected an out of range error, got {:?}", other),
    }
    assert!(emit_default("40=[a]").is_err());
}

#[test]
fn test_emit_same_key_by_grid_and_name() {
    match emit_default("20=[a]\n<AC01>=[b]") {
        Err(Error::DuplicateKey { position, first, key }) => {
            assert_eq!(position, Position { line: 2, column: 1 });
            assert_eq!(first, Position { line: 1, column: 1 });
            assert_eq!(key, "<AC01>");
        }
        other => panic!("expected a duplicate key error, got {:?}", other),
    }

    // Different keys on the same row stay apart.
    let output = emit_default("20=[a]\n<AC02>=[b]").unwrap();
    assert_eq!(key_lines(&output).len(), 2);
}

#[test]
fn test_emit_names_only() {
    let layout = parse("<AC01>=[a]").unwrap();
    let output = emit(&layout, Naming::Names, &KeysymTable, &EmitOptions::default()).unwrap();
    assert_eq!(key_lines(&output).len(), 1);

    let layout = parse("<AC01>=[a] 20=[b]").unwrap();
    match emit(&layout, Naming::Names, &KeysymTable, &EmitOptions::default()) {
        Err(Error::Unnamed { key, .. }) => assert_eq!(key, "at row 2, column 0"),
        other => panic!("expected an unnamed key error, got {:?}", other),
    }
}

#[test]
fn test_emit_injected_lookup() {
    struct Shouting;
    impl KeysymLookup for Shouting {
        fn name_for(&self, c: char) -> Option<&str> {
            if c == 'a' { Some("LOUD_A") } else { None }
        }
        fn char_for(&self, _: &str) -> Option<char> {
            None
        }
    }

    let layout = parse("00=[a b]").unwrap();
    let output = emit(&layout, Naming::Descriptor(&ISO_105), &Shouting, &EmitOptions::default()).unwrap();
    assert!(output.contains("key <TLDE> { [ LOUD_A, U0062, NoSymbol,"));
}

#[test]
fn test_emit_options() {
    let layout = parse("00=[a]").unwrap();
    let options = EmitOptions {
        group_name: "My \"own\" layout".to_owned(),
        template: None,
    };
    let output = emit(&layout, Naming::Descriptor(&ISO_105), &KeysymTable, &options).unwrap();
    assert!(output.contains("    name[Group1]=\"My \\\"own\\\" layout\";\n"));

    let options = EmitOptions {
        group_name: "Custom".to_owned(),
        template: Some("{{name}}:{{#each keys}} {{name}}={{symbols}}{{/each}}".to_owned()),
    };
    let output = emit(&layout, Naming::Descriptor(&ISO_105), &KeysymTable, &options).unwrap();
    assert_eq!(output, "Custom: TLDE=a, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol");

    let options = EmitOptions { template: Some("{{#each keys}}".to_owned()), ..EmitOptions::default() };
    match emit(&layout, Naming::Descriptor(&ISO_105), &KeysymTable, &options) {
        Err(Error::Template(_)) => {}
        other => panic!("expected a template error, got {:?}", other),
    }
}

//}}}
