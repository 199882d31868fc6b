// comments.rs: Strip end-of-line comments from layout descriptions.
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

use crate::error::Position;

/// Layout text with comments and blank lines removed.
///
/// Every kept line ends with `\n`. Since blank lines are dropped, the text
/// alone cannot tell where a byte came from, so the original line number and
/// the number of trimmed leading characters are remembered per line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StrippedText {
    text: String,
    origins: Vec<LineOrigin>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct LineOrigin {
    start: usize,
    line: usize,
    indent: usize,
}

impl StrippedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Map a byte offset into the stripped text back to the input file.
    pub fn position(&self, offset: usize) -> Position {
        let index = match self.origins.binary_search_by(|o| o.start.cmp(&offset)) {
            Ok(i) => i,
            Err(0) => return Position { line: 1, column: 1 },
            Err(i) => i - 1,
        };
        let origin = self.origins[index];
        let end = offset.min(self.text.len());
        let column = self.text[origin.start..end].trim_end_matches('\n').chars().count();
        Position { line: origin.line, column: origin.indent + column + 1 }
    }
}

/// Cut a line at the first `#` that does not directly follow a quote.
///
/// Only one character of lookback is used, so `'#'` keeps its hash while
/// `"a #"` still loses it.
fn strip_line(line: &str) -> &str {
    let mut prev = None;
    for (i, c) in line.char_indices() {
        if c == '#' && prev != Some('\'') && prev != Some('"') {
            return &line[..i];
        }
        prev = Some(c);
    }
    line
}

pub fn strip_comments(input: &str) -> StrippedText {
    let mut text = String::with_capacity(input.len());
    let mut origins = Vec::new();

    for (i, line) in input.lines().enumerate() {
        let content = strip_line(line);
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }

        let indent = content.len() - content.trim_start().len();
        origins.push(LineOrigin {
            start: text.len(),
            line: i + 1,
            indent: content[..indent].chars().count(),
        });
        text.push_str(trimmed);
        text.push('\n');
    }

    StrippedText { text, origins }
}

#[test]
fn test_strip_comments() {
    let stripped = strip_comments("00=[a] # comment\n\n   # only a comment\n01=[b]\n");
    assert_eq!(stripped.as_str(), "00=[a]\n01=[b]\n");
}

#[test]
fn test_strip_comments_after_quote() {
    let stripped = strip_comments("00=[\"it'#s\" '#'] # but this goes\n");
    assert_eq!(stripped.as_str(), "00=[\"it'#s\" '#']\n");
}

#[test]
fn test_strip_comments_single_lookback() {
    // The hash is preceded by a space, so it starts a comment even inside quotes.
    let stripped = strip_comments("00=[\"it's # not\"]");
    assert_eq!(stripped.as_str(), "00=[\"it's\n");
}

#[test]
fn test_strip_comments_crlf_and_empty() {
    assert_eq!(strip_comments("").as_str(), "");
    assert_eq!(strip_comments("  \r\n#\r\n\t00=[x]\t\r\n").as_str(), "00=[x]\n");
}

#[test]
fn test_stripped_position() {
    let stripped = strip_comments("# header\n\n   00=[a]\n  01=[b]\n");
    assert_eq!(stripped.position(0), Position { line: 3, column: 4 });
    assert_eq!(stripped.position(3), Position { line: 3, column: 7 });
    assert_eq!(stripped.position(7), Position { line: 4, column: 3 });
    assert_eq!(stripped.position(14), Position { line: 4, column: 9 });
}
