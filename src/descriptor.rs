// descriptor.rs: Physical keyboard shapes.
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

use crate::error::{Error, Result};

/// One physical keyboard shape: its rows, key labels, X11 key codes and the
/// rule that turns a grid position into an XKB key name.
#[derive(Debug)]
pub struct PhysicalLayout {
    pub name: &'static str,
    pub row_sizes: &'static [usize],
    /// One label per key, row after row.
    pub labels: &'static str,
    pub codes: &'static [u8],
    naming: fn(usize, usize, usize) -> String,
}

/// The keys of a single physical row.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Row<'a> {
    pub index: usize,
    pub labels: &'a str,
    pub codes: &'a [u8],
}

pub struct Rows<'a> {
    layout: &'a PhysicalLayout,
    row: usize,
    key: usize,
    byte: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Row<'a>> {
        let size = *self.layout.row_sizes.get(self.row)?;
        let rest = &self.layout.labels[self.byte..];
        let len = rest.char_indices().nth(size).map_or(rest.len(), |(i, _)| i);

        let row = Row {
            index: self.row,
            labels: &rest[..len],
            codes: &self.layout.codes[self.key..self.key + size],
        };
        self.row += 1;
        self.key += size;
        self.byte += len;
        Some(row)
    }
}

impl PhysicalLayout {
    pub fn key_count(&self) -> usize {
        self.row_sizes.iter().sum()
    }

    pub fn rows(&self) -> Rows<'_> {
        Rows { layout: self, row: 0, key: 0, byte: 0 }
    }

    /// The XKB name of the key at `(row, column)`, or `None` if the position
    /// is not on this keyboard.
    pub fn key_name(&self, row: usize, column: usize) -> Option<String> {
        let size = *self.row_sizes.get(row)?;
        if column >= size {
            return None;
        }
        Some((self.naming)(row, column, size))
    }

    /// Reverse of `key_name`.
    pub fn position_of(&self, name: &str) -> Option<(usize, usize)> {
        self.row_sizes.iter().enumerate().flat_map(|(row, &size)| {
            (0 .. size).map(move |column| (row, column))
        }).find(|&(row, column)| {
            self.key_name(row, column).map_or(false, |n| n == name)
        })
    }
}

fn iso_105_key_name(row: usize, column: usize, row_size: usize) -> String {
    match (row, column) {
        (0, 0) => "TLDE".to_owned(),
        (0, _) => format!("AE{:02}", column),
        (1, _) => format!("AD{:02}", column + 1),
        (2, _) if column + 1 == row_size => "BKSL".to_owned(),
        (2, _) => format!("AC{:02}", column + 1),
        (3, 0) => "LSGT".to_owned(),
        _ => format!("AB{:02}", column + 1),
    }
}

fn ansi_104_key_name(row: usize, column: usize, row_size: usize) -> String {
    match (row, column) {
        (0, 0) => "TLDE".to_owned(),
        (0, _) => format!("AE{:02}", column),
        (1, _) if column + 1 == row_size => "BKSL".to_owned(),
        (1, _) => format!("AD{:02}", column + 1),
        (2, _) => format!("AC{:02}", column + 1),
        _ => format!("AB{:02}", column + 1),
    }
}

pub static ISO_105: PhysicalLayout = PhysicalLayout {
    name: "iso-105",
    row_sizes: &[13, 12, 12, 11],
    labels: concat!(
        "¬1234567890-=",
        "QWERTYUIOP[]",
        "ASDFGHJKL;'^",
        "´ZXCVBNM,./"
    ),
    codes: &[
        49, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21,
        24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35,
        38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 51,
        94, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    ],
    naming: iso_105_key_name,
};

pub static ANSI_104: PhysicalLayout = PhysicalLayout {
    name: "ansi-104",
    row_sizes: &[13, 13, 11, 10],
    labels: concat!(
        "¬1234567890-=",
        "QWERTYUIOP[]\\",
        "ASDFGHJKL;'",
        "ZXCVBNM,./"
    ),
    codes: &[
        49, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21,
        24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 51,
        38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48,
        52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    ],
    naming: ansi_104_key_name,
};

pub static LAYOUTS: [&PhysicalLayout; 2] = [&ISO_105, &ANSI_104];

pub fn find(name: &str) -> Result<&'static PhysicalLayout> {
    LAYOUTS.iter().copied().find(|l| l.name == name).ok_or_else(|| {
        let known: Vec<_> = LAYOUTS.iter().map(|l| l.name).collect();
        Error::UnknownLayout(name.to_owned(), known.join(", "))
    })
}

#[test]
fn test_tables_consistent() {
    for layout in LAYOUTS.iter() {
        assert_eq!(layout.labels.chars().count(), layout.key_count(), "{}", layout.name);
        assert_eq!(layout.codes.len(), layout.key_count(), "{}", layout.name);
    }
}

#[test]
fn test_rows() {
    let rows: Vec<_> = ISO_105.rows().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].labels, "¬1234567890-=");
    assert_eq!(rows[2].labels, "ASDFGHJKL;'^");
    assert_eq!(rows[3].labels, "´ZXCVBNM,./");
    assert_eq!(rows[3].codes, &[94, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61]);

    // Restartable.
    assert_eq!(ISO_105.rows().count(), 4);
    assert_eq!(ANSI_104.rows().nth(1).map(|r| r.labels), Some("QWERTYUIOP[]\\"));
}

#[test]
fn test_iso_105_key_names() {
    assert_eq!(ISO_105.key_name(0, 0).as_deref(), Some("TLDE"));
    assert_eq!(ISO_105.key_name(0, 1).as_deref(), Some("AE01"));
    assert_eq!(ISO_105.key_name(0, 12).as_deref(), Some("AE12"));
    assert_eq!(ISO_105.key_name(1, 0).as_deref(), Some("AD01"));
    assert_eq!(ISO_105.key_name(1, 11).as_deref(), Some("AD12"));
    assert_eq!(ISO_105.key_name(2, 0).as_deref(), Some("AC01"));
    assert_eq!(ISO_105.key_name(2, 10).as_deref(), Some("AC11"));
    assert_eq!(ISO_105.key_name(2, 11).as_deref(), Some("BKSL"));
    assert_eq!(ISO_105.key_name(3, 0).as_deref(), Some("LSGT"));
    assert_eq!(ISO_105.key_name(3, 1).as_deref(), Some("AB02"));
    assert_eq!(ISO_105.key_name(3, 10).as_deref(), Some("AB11"));
    assert_eq!(ISO_105.key_name(0, 13), None);
    assert_eq!(ISO_105.key_name(4, 0), None);
}

#[test]
fn test_ansi_104_key_names() {
    assert_eq!(ANSI_104.key_name(1, 12).as_deref(), Some("BKSL"));
    assert_eq!(ANSI_104.key_name(2, 10).as_deref(), Some("AC11"));
    assert_eq!(ANSI_104.key_name(3, 0).as_deref(), Some("AB01"));
    assert_eq!(ANSI_104.key_name(3, 9).as_deref(), Some("AB10"));
    assert_eq!(ANSI_104.key_name(3, 10), None);
}

#[test]
fn test_position_of() {
    assert_eq!(ISO_105.position_of("TLDE"), Some((0, 0)));
    assert_eq!(ISO_105.position_of("BKSL"), Some((2, 11)));
    assert_eq!(ISO_105.position_of("AB02"), Some((3, 1)));
    assert_eq!(ISO_105.position_of("AB01"), None);
    assert_eq!(ANSI_104.position_of("LSGT"), None);
}

#[test]
fn test_find() {
    assert_eq!(find("ansi-104").map(|l| l.name).ok(), Some("ansi-104"));
    match find("dvorak") {
        Err(Error::UnknownLayout(name, known)) => {
            assert_eq!(name, "dvorak");
            assert_eq!(known, "iso-105, ansi-104");
        }
        other => panic!("unexpected result: {:?}", other.map(|l| l.name)),
    }
}
