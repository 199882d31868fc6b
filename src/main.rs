// main.rs: Generate XKB symbols from a keyboard layout description.
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
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use docopt::Docopt;
use log::debug;
use serde::Deserialize;
use tempfile::NamedTempFile;

use xkbgen::descriptor::{self, ISO_105};
use xkbgen::dump::dump;
use xkbgen::{emit, parse, EmitOptions, Error, KeysymTable, Naming, Result};

const USAGE: &str = "
Usage: xkbgen [options] <file> [<layout>]
       xkbgen --help

Compile a keyboard layout description into an XKB symbols file. Use - as the
file to read the description from stdin.

Each key is given by its grid position (row and column, one base-62 digit
each) or by its XKB name, followed by up to eight symbols, one per level:

00 = [ ¬ ¦ ]              # row 0, column 0
<AD01> = [ q Q '[' \"'\" ]  # quote symbols that contain spaces or brackets
1A = [ dead_acute ]       # longer words are keysym names

Layouts: iso-105 (default), ansi-104.

Options:
    -o FILE, --output FILE      Output file, - for stdout [default: -].
    -n NAME, --name NAME        Name of the symbol group [default: English with IPA].
    -t FILE, --template FILE    Handlebars template to use instead of the built-in one.
    --dump                      Write the layout key by key as JSON instead.
    -h, --help                  Show this message.
";

#[derive(Debug, Deserialize)]
struct Args {
    arg_file: String,
    arg_layout: Option<String>,
    flag_output: String,
    flag_name: String,
    flag_template: Option<String>,
    flag_dump: bool,
}

fn read_file(path: &str) -> Result<String> {
    let mut result = String::new();
    let read = if path == "-" {
        io::stdin().lock().read_to_string(&mut result)
    } else {
        fs::File::open(path).and_then(|mut f| f.read_to_string(&mut result))
    };
    read.map_err(|source| Error::Read { path: PathBuf::from(path), source })?;
    Ok(result)
}

/// Write `content` to `path`, or to stdout for `-`.
///
/// Files are written next to the target and renamed over it once complete,
/// so the target holds either the old or the new content.
fn write_file(path: &str, content: &str) -> Result<()> {
    let to_error = |source: io::Error| Error::Write { path: PathBuf::from(path), source };
    if path == "-" {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        return lock.write_all(content.as_bytes()).and_then(|()| lock.flush()).map_err(to_error);
    }

    let target = Path::new(path);
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(to_error)?;
    file.write_all(content.as_bytes()).map_err(to_error)?;
    file.persist(target).map_err(|e| to_error(e.error))?;
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let physical = descriptor::find(args.arg_layout.as_deref().unwrap_or(ISO_105.name))?;
    let layout = parse(&read_file(&args.arg_file)?)?;
    debug!("{}: {} keys on {}", args.arg_file, layout.keys.len(), physical.name);

    // Render everything before touching the output file.
    let output = if args.flag_dump {
        let mut json = serde_json::to_string_pretty(&dump(&layout, physical, &KeysymTable)?)?;
        json.push('\n');
        json
    } else {
        let template = match args.flag_template {
            Some(ref path) => Some(read_file(path)?),
            None => None,
        };
        let options = EmitOptions { group_name: args.flag_name, template };
        emit(&layout, Naming::Descriptor(physical), &KeysymTable, &options)?
    };

    write_file(&args.flag_output, &output)
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if let Err(e) = run(args) {
        eprintln!("xkbgen: {}", e);
        process::exit(1);
    }
}
