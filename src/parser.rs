// parser.rs: Parse layout descriptions into key records.
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
use std::fmt;

use log::debug;

use crate::comments::{strip_comments, StrippedText};
use crate::error::{Error, Position, Result};

/// How a record addresses its key.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum KeyId {
    Grid { row: usize, column: usize },
    Name(String),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            KeyId::Grid { row, column } => write!(f, "at row {}, column {}", row, column),
            KeyId::Name(ref name) => write!(f, "<{}>", name),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct KeyRecord {
    pub id: KeyId,
    /// One entry per shift level.
    pub symbols: Vec<String>,
    pub position: Position,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ParsedLayout {
    pub keys: Vec<KeyRecord>,
}

//{{{ Cursor

fn describe(c: Option<char>) -> String {
    match c {
        Some('\n') => "end of line".to_owned(),
        Some(c) => format!("'{}'", c.escape_debug()),
        None => "end of input".to_owned(),
    }
}

/// Decode one base-62 digit: `0-9`, then `A-Z`, then `a-z`.
fn digit(c: char) -> Option<usize> {
    match c {
        '0' ..= '9' => Some(c as usize - '0' as usize),
        'A' ..= 'Z' => Some(c as usize - 'A' as usize + 10),
        'a' ..= 'z' => Some(c as usize - 'a' as usize + 36),
        _ => None,
    }
}

struct Cursor<'a> {
    stripped: &'a StrippedText,
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(stripped: &'a StrippedText) -> Self {
        Cursor { stripped, src: stripped.as_str(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.bump();
        }
    }

    /// Advance past the longest prefix whose characters satisfy `pred`.
    fn take_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &'a str {
        let src = self.src;
        let rest = &src[self.pos..];
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn position(&self) -> Position {
        self.stripped.position(self.pos)
    }

    fn error_at(&self, pos: usize, message: String) -> Error {
        Error::syntax(self.stripped.position(pos), message)
    }

    fn expected(&self, what: &str) -> Error {
        self.error_at(self.pos, format!("expected {}, found {}", what, describe(self.peek())))
    }
}

//}}}

//{{{ Records

impl<'a> Cursor<'a> {
    fn key_id(&mut self) -> Result<KeyId> {
        if self.eat('<') {
            let name = self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '+' || c == '-');
            if name.is_empty() {
                return Err(self.expected("key name"));
            }
            if !self.eat('>') {
                return Err(self.expected("'>' after key name"));
            }
            return Ok(KeyId::Name(name.to_owned()));
        }

        let mut coordinates = [0; 2];
        for (coordinate, what) in coordinates.iter_mut().zip(&["key row", "key column"]) {
            let start = self.pos;
            let c = match self.peek() {
                Some(c) if !c.is_whitespace() => c,
                _ => return Err(self.expected(what)),
            };
            self.bump();
            *coordinate = match digit(c) {
                Some(d) => d,
                None => return Err(self.error_at(start, format!(
                    "expected {} digit (0-9, A-Z or a-z), found {}", what, describe(Some(c))))),
            };
        }
        Ok(KeyId::Grid { row: coordinates[0], column: coordinates[1] })
    }

    fn symbol(&mut self) -> Result<String> {
        let start = self.pos;
        match self.peek() {
            Some(quote @ '\'') | Some(quote @ '"') => {
                self.bump();
                let src = self.src;
                let rest = &src[self.pos..];
                match rest.find(quote) {
                    Some(end) => {
                        self.pos += end + quote.len_utf8();
                        Ok(rest[..end].to_owned())
                    }
                    None => Err(self.error_at(start, format!(
                        "expected closing {} for quoted symbol", describe(Some(quote))))),
                }
            }
            _ => Ok(self.take_while(|c| !c.is_whitespace() && c != ']').to_owned()),
        }
    }

    fn symbols(&mut self) -> Result<Vec<String>> {
        let mut symbols = Vec::new();
        self.skip_whitespace();
        loop {
            match self.peek() {
                None => return Err(self.expected("']' after key symbols")),
                Some(']') => {
                    self.bump();
                    return Ok(symbols);
                }
                Some(_) => symbols.push(self.symbol()?),
            }
            self.skip_whitespace();
        }
    }

    fn record(&mut self) -> Result<KeyRecord> {
        let position = self.position();
        let id = self.key_id()?;

        self.skip_whitespace();
        if !self.eat('=') {
            return Err(self.expected("'=' after key position"));
        }
        self.skip_whitespace();
        if !self.eat('[') {
            return Err(self.expected("'[' before key symbols"));
        }
        let symbols = self.symbols()?;

        Ok(KeyRecord { id, symbols, position })
    }
}

//}}}

/// Parse a whole layout description. The first error aborts the parse.
pub fn parse(input: &str) -> Result<ParsedLayout> {
    let stripped = strip_comments(input);
    let mut cursor = Cursor::new(&stripped);
    let mut layout = ParsedLayout::default();
    let mut seen: HashMap<KeyId, Position> = HashMap::new();

    cursor.skip_whitespace();
    while cursor.peek().is_some() {
        let record = cursor.record()?;
        if let Some(&first) = seen.get(&record.id) {
            return Err(Error::DuplicateKey {
                position: record.position,
                first,
                key: record.id.to_string(),
            });
        }
        seen.insert(record.id.clone(), record.position);
        layout.keys.push(record);
        cursor.skip_whitespace();
    }

    debug!("parsed {} key records", layout.keys.len());
    Ok(layout)
}

//{{{ Tests

#[cfg(test)]
fn syntax_error(input: &str) -> (Position, String) {
    match parse(input) {
        Err(Error::Syntax { position, message }) => (position, message),
        other => panic!("expected a syntax error for {:?}, got {:?}", input, other),
    }
}

#[cfg(test)]
fn strings(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|&s| s.to_owned()).collect()
}

#[test]
fn test_parse_grid() {
    let layout = parse("00=[a]").unwrap();
    assert_eq!(layout.keys, vec![KeyRecord {
        id: KeyId::Grid { row: 0, column: 0 },
        symbols: strings(&["a"]),
        position: Position { line: 1, column: 1 },
    }]);
}

#[test]
fn test_parse_name() {
    let layout = parse("<AB01>=[z Z]").unwrap();
    assert_eq!(layout.keys.len(), 1);
    assert_eq!(layout.keys[0].id, KeyId::Name("AB01".to_owned()));
    assert_eq!(layout.keys[0].symbols, strings(&["z", "Z"]));
}

#[test]
fn test_parse_base62() {
    let layout = parse("9A = [x]\nBz=[y]").unwrap();
    assert_eq!(layout.keys[0].id, KeyId::Grid { row: 9, column: 10 });
    assert_eq!(layout.keys[1].id, KeyId::Grid { row: 11, column: 61 });
    assert_eq!(digit('a'), Some(36));
    assert_eq!(digit('Z'), Some(35));
    assert_eq!(digit('-'), None);
}

#[test]
fn test_parse_free_form() {
    let layout = parse("
        # Top row
        00 = [ ə  Ə ]   01=[1 ! ¹]
        02
          =
          [
            2 '\"' ''
            \"a b\" ẽ̃
          ]
        10=[]
    ").unwrap();

    assert_eq!(layout.keys.len(), 4);
    assert_eq!(layout.keys[0].symbols, strings(&["ə", "Ə"]));
    assert_eq!(layout.keys[1].symbols, strings(&["1", "!", "¹"]));
    assert_eq!(layout.keys[2].symbols, strings(&["2", "\"", "", "a b", "ẽ̃"]));
    assert_eq!(layout.keys[2].position, Position { line: 4, column: 9 });
    assert_eq!(layout.keys[3].symbols, Vec::<String>::new());
}

#[test]
fn test_parse_comments() {
    let layout = parse("00=[a] # comment\n01=[b]").unwrap();
    assert_eq!(layout.keys.len(), 2);
    assert_eq!(layout.keys[0].symbols, strings(&["a"]));
    assert_eq!(layout.keys[1].symbols, strings(&["b"]));

    let layout = parse("0b=['#' \"it'#s\"] # comment").unwrap();
    assert_eq!(layout.keys[0].symbols, strings(&["#", "it'#s"]));
}

#[test]
fn test_parse_empty() {
    assert_eq!(parse("").unwrap(), ParsedLayout::default());
    assert_eq!(parse("\n  # nothing here\n\n").unwrap(), ParsedLayout::default());
}

#[test]
fn test_parse_unterminated_list() {
    let (position, message) = syntax_error("00=[a");
    assert_eq!(position, Position { line: 1, column: 6 });
    assert_eq!(message, "expected ']' after key symbols, found end of input");
}

#[test]
fn test_parse_missing_equals() {
    let (position, message) = syntax_error("00[a]");
    assert_eq!(position, Position { line: 1, column: 3 });
    assert_eq!(message, "expected '=' after key position, found '['");
}

#[test]
fn test_parse_missing_bracket() {
    let (_, message) = syntax_error("00=a]");
    assert_eq!(message, "expected '[' before key symbols, found 'a'");
}

#[test]
fn test_parse_missing_digits() {
    let (_, message) = syntax_error("0");
    assert_eq!(message, "expected key column, found end of line");
}

#[test]
fn test_parse_invalid_digit() {
    let (position, message) = syntax_error("00=[a]\n\n  0!=[b]");
    assert_eq!(position, Position { line: 3, column: 4 });
    assert_eq!(message, "expected key column digit (0-9, A-Z or a-z), found '!'");
}

#[test]
fn test_parse_unterminated_name() {
    let (_, message) = syntax_error("<AB01=[a]");
    assert_eq!(message, "expected '>' after key name, found '='");

    let (_, message) = syntax_error("<>=[a]");
    assert_eq!(message, "expected key name, found '>'");
}

#[test]
fn test_parse_name_stops_at_line_end() {
    let (position, message) = syntax_error("<AB01=[a]\n<AC01>=[b]");
    assert_eq!(position, Position { line: 1, column: 6 });
    assert_eq!(message, "expected '>' after key name, found '='");

    let (position, message) = syntax_error("<AB01\n>=[a]");
    assert_eq!(position, Position { line: 1, column: 6 });
    assert_eq!(message, "expected '>' after key name, found end of line");
}

#[test]
fn test_parse_unterminated_quote() {
    let (position, message) = syntax_error("00=[a 'b]");
    assert_eq!(position, Position { line: 1, column: 7 });
    assert_eq!(message, "expected closing '\\'' for quoted symbol");
}

#[test]
fn test_parse_duplicate() {
    match parse("00=[a]\n01=[b]\n00=[c]") {
        Err(Error::DuplicateKey { position, first, key }) => {
            assert_eq!(position, Position { line: 3, column: 1 });
            assert_eq!(first, Position { line: 1, column: 1 });
            assert_eq!(key, "at row 0, column 0");
        }
        other => panic!("expected a duplicate key error, got {:?}", other),
    }

    assert!(parse("<AC01>=[a] <AC01>=[b]").is_err());
    // Grid and name addressing are never compared with each other.
    assert!(parse("20=[a] <AC01>=[b]").is_ok());
}

//}}}
