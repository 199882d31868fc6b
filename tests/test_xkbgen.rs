// test_xkbgen.rs: Run the xkbgen binary end to end.
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

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use regex::Regex;
use tempfile::TempDir;

use xkbgen::keysym::{resolve, symbol_for};
use xkbgen::{emit, parse, EmitOptions, KeysymTable, Naming};

const IPA_LAYOUT: &str = include_str!("../layouts/english-ipa.txt");

fn xkbgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xkbgen"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run xkbgen")
}

fn write_layout(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("layout.txt");
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_owned()
}

#[test]
fn test_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, IPA_LAYOUT);

    let result = xkbgen(&[input.as_str()]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(result.stderr.is_empty());

    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.starts_with("default xkb_symbols \"basic\" {\n    name[Group1]=\"English with IPA\";\n"));
    assert!(stdout.ends_with("    include \"level5(menu_switch)\"\n};\n"));
    for line in &[
        "    key <TLDE> { [ grave, notsign, U02C8, U02CC, NoSymbol, NoSymbol, NoSymbol, NoSymbol ] };",
        "    key <AE04> { [ 4, dollar, EuroSign, U0294, NoSymbol, NoSymbol, NoSymbol, NoSymbol ] };",
        "    key <AD03> { [ e, E, schwa, U025B, U0258, U025C, NoSymbol, NoSymbol ] };",
        "    key <BKSL> { [ numbersign, asciitilde, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol ] };",
        "    key <LSGT> { [ backslash, bar, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol ] };",
        "    key <AB02> { [ z, Z, ezh, U0290, NoSymbol, NoSymbol, NoSymbol, NoSymbol ] };",
    ] {
        assert!(stdout.lines().any(|l| l == *line), "missing line: {}", line);
    }

    let key_line = Regex::new(r"^    key <([A-Z0-9]{4})> \{ \[ ((?:[A-Za-z0-9_]+, ){7,}[A-Za-z0-9_]+) \] \};$").unwrap();
    let keys = stdout.lines().filter(|l| key_line.is_match(l)).count();
    assert_eq!(keys, 48);
}

#[test]
fn test_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, "<AB01> = [ z Z ]\n");
    let output = dir.path().join("symbols");

    let result = xkbgen(&["-o", output.to_str().unwrap(), "-n", "Test", input.as_str(), "ansi-104"]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(result.stdout.is_empty());

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("    name[Group1]=\"Test\";\n"));
    assert!(content.contains(
        "    key <AB01> { [ z, Z, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol, NoSymbol ] };\n"));
}

#[test]
fn test_output_file_replaced() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, "00=[a]\n");
    let output = dir.path().join("symbols");
    fs::write(&output, "@".repeat(4096)).unwrap();

    let result = xkbgen(&["-o", output.to_str().unwrap(), input.as_str()]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let content = fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("default xkb_symbols \"basic\" {\n"));
    assert!(!content.contains('@'));

    let mut names: Vec<_> = fs::read_dir(dir.path()).unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["layout.txt", "symbols"]);
}

#[test]
fn test_same_key_by_grid_and_name() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, "20=[a]\n<AC01>=[b]\n");
    let expected = "xkbgen: 2:1: duplicate definition of key <AC01> (first defined at 1:1)\n";

    let result = xkbgen(&[input.as_str()]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stdout.is_empty());
    assert_eq!(String::from_utf8(result.stderr).unwrap(), expected);

    let result = xkbgen(&["--dump", input.as_str()]);
    assert_eq!(result.status.code(), Some(1));
    assert_eq!(String::from_utf8(result.stderr).unwrap(), expected);
}

#[test]
fn test_syntax_error() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, "# missing bracket\n00=[a\n");
    let output = dir.path().join("symbols");

    let result = xkbgen(&["--output", output.to_str().unwrap(), input.as_str()]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stdout.is_empty());
    assert_eq!(String::from_utf8(result.stderr).unwrap(),
               "xkbgen: 2:6: expected ']' after key symbols, found end of input\n");
    assert!(!output.exists());

    let input = write_layout(&dir, "00[a]");
    let result = xkbgen(&[input.as_str()]);
    assert_eq!(result.status.code(), Some(1));
    assert_eq!(String::from_utf8(result.stderr).unwrap(),
               "xkbgen: 1:3: expected '=' after key position, found '['\n");
}

#[test]
fn test_bad_arguments() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, "00=[a]");

    let result = xkbgen(&[input.as_str(), "dvorak"]);
    assert_eq!(result.status.code(), Some(1));
    assert_eq!(String::from_utf8(result.stderr).unwrap(),
               "xkbgen: unknown layout 'dvorak' (expected one of: iso-105, ansi-104)\n");

    let missing = dir.path().join("missing.txt");
    let result = xkbgen(&[missing.to_str().unwrap()]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8(result.stderr).unwrap().starts_with("xkbgen: cannot read '"));

    let result = xkbgen(&["-o", dir.path().join("no/such/dir").to_str().unwrap(), input.as_str()]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8(result.stderr).unwrap().starts_with("xkbgen: cannot write '"));
}

#[test]
fn test_out_of_range() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, "1C=[x]");

    // Row 1 has 13 keys on ANSI keyboards but only 12 on ISO ones.
    assert!(xkbgen(&[input.as_str(), "ansi-104"]).status.success());
    let result = xkbgen(&[input.as_str(), "iso-105"]);
    assert_eq!(String::from_utf8(result.stderr).unwrap(),
               "xkbgen: 1:1: row 1, column 12 is outside the iso-105 layout\n");
}

#[test]
fn test_stdin() {
    let mut process = Command::new(env!("CARGO_BIN_EXE_xkbgen"))
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    process.stdin.as_mut().unwrap().write_all(b"00=[a]\n").unwrap();
    let result = process.wait_with_output().unwrap();
    assert!(result.status.success());
    assert!(String::from_utf8(result.stdout).unwrap().contains("    key <TLDE> { [ a, NoSymbol,"));
}

#[test]
fn test_template() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, "00=[a]\n01=[b]");
    let template = dir.path().join("template.hbs");
    fs::write(&template, "{{#each keys}}{{name}} {{/each}}\n").unwrap();

    let result = xkbgen(&["-t", template.to_str().unwrap(), input.as_str()]);
    assert!(result.status.success());
    assert_eq!(result.stdout, b"TLDE AE01 \n");
}

#[test]
fn test_dump() {
    let dir = TempDir::new().unwrap();
    let input = write_layout(&dir, IPA_LAYOUT);

    let result = xkbgen(&["--dump", input.as_str()]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let json: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(json["layout"], "iso-105");
    let e = &json["rows"][1][2];
    assert_eq!(e["label"], "E");
    assert_eq!(e["code"], 26);
    assert_eq!(e["name"], "AD03");
    assert_eq!(e["levels"][2]["symbol"], "ə");
    assert_eq!(e["levels"][2]["modifiers"], serde_json::json!(["Mod5"]));

    let circumflex = &json["rows"][0][6]["levels"][2];
    assert_eq!(circumflex["diacritic"], true);
    assert_eq!(circumflex["display"], "◌\u{302}");
}

#[test]
fn test_round_trip() {
    let table = KeysymTable;
    let layout = parse(IPA_LAYOUT).unwrap();
    let symbols = emit(&layout, Naming::Descriptor(&xkbgen::descriptor::ISO_105), &table, &EmitOptions::default())
        .unwrap();

    // Rebuild a name-addressed description from the emitted keysyms.
    let key_line = Regex::new(r"^    key <(\w+)> \{ \[ (.*) \] \};$").unwrap();
    let mut description = String::new();
    for captures in symbols.lines().filter_map(|l| key_line.captures(l)) {
        if captures[2].starts_with("ISO_Level") {
            continue;
        }
        let levels: Vec<String> = captures[2].split(", ").map(|name| {
            let symbol = symbol_for(&table, name);
            let quote = if symbol.contains('"') { '\'' } else { '"' };
            format!("{}{}{}", quote, symbol, quote)
        }).collect();
        description.push_str(&format!("<{}> = [ {} ]\n", &captures[1], levels.join(" ")));
    }

    let reparsed = parse(&description).unwrap();
    assert_eq!(reparsed.keys.len(), layout.keys.len());
    for (before, after) in layout.keys.iter().zip(&reparsed.keys) {
        let (kept, padding) = after.symbols.split_at(before.symbols.len());
        assert_eq!(kept, &before.symbols[..]);
        assert!(padding.iter().all(|s| s.is_empty()));
    }
}

#[test]
fn test_fallback_shape() {
    let shape = Regex::new(r"^U[0-9A-F]{4,6}$").unwrap();
    // Private use, noncharacters and emoji have no X11 keysym name.
    for c in "\u{e000}\u{f8ff}\u{fdd0}\u{ffff}😀\u{f0000}\u{10ffff}".chars() {
        let name = resolve(&KeysymTable, &c.to_string());
        assert!(shape.is_match(&name), "{:?} -> {}", c, name);
        assert_eq!(u32::from_str_radix(&name[1..], 16).unwrap(), c as u32);
        if (c as u32) <= 0xffff {
            assert_eq!(name.len(), 5);
        }
    }
}
