//! Parser for DBC network descriptions.
//!
//! DBC is a line-oriented format. Each record starts with a keyword; records
//! are read strictly in file order and applied to a [`Bus`] as they are seen.
//!
//! # Records
//!
//! | Keyword | Record | Syntax |
//! |---------|--------|--------|
//! | VERSION | Format version | `VERSION "<text>"` |
//! | BU_ | Node list | `BU_: <node>*` |
//! | BO_ | Message | `BO_ <id> <name>: <length> <sender>` |
//! | SG_ | Signal | `SG_ <name> [M\|m<n>] : <start>\|<len>@<0\|1><+\|-> (<factor>,<offset>) [<min>\|<max>] "<unit>" <receivers>` |
//! | BS_ | Bus configuration | `BS_: [<speed>]` |
//! | BA_DEF_ | Attribute definition | `BA_DEF_ [BU_\|BO_\|SG_] "<name>" <FLOAT\|INT\|STRING\|ENUM> <clause>;` |
//! | CM_ | Description | `CM_ [BU_ <node>\|BO_ <id>\|SG_ <id> <signal>] "<text>";` |
//!
//! Lines whose leading token is not one of these keywords are skipped.
//!
//! # Parse Modes
//!
//! - A `BO_` record opens a message; following `SG_` records attach to it
//!   until the next `BO_`. A `SG_` with no open message is an error.
//! - A `CM_` whose text does not end with `";` on its own line captures every
//!   following line verbatim until one contains `";`. Afterwards no message is
//!   open.
//!
//! # Example
//!
//! ```text
//! VERSION "1.0"
//! BS_: 500
//! BU_: ECU1 ECU2
//!
//! BO_ 100 EngineData: 8 ECU1
//!  SG_ RPM : 0|16@1+ (0.25,0) [0|16000] "rpm" ECU2
//!
//! CM_ SG_ 100 RPM "Engine speed";
//! BA_DEF_ BO_ "GenMsgCycleTime" INT 0 65535;
//! ```

mod continuation;
mod parser;
mod records;
mod scanner;

pub use continuation::{Continuation, TERMINATOR};
pub use parser::{Parser, ParserConfig};
pub use records::*;
pub use scanner::Scanner;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{DbcError, Result};
use crate::network::Bus;

/// Parse a DBC string into a bus.
pub fn parse(input: &str) -> Result<Bus> {
    parse_with_config(input, ParserConfig::default())
}

/// Parse a DBC string with custom configuration.
pub fn parse_with_config(input: &str, config: ParserConfig) -> Result<Bus> {
    parse_lines(input.lines(), config)
}

/// Parse a sequence of lines.
pub fn parse_lines<I, S>(lines: I, config: ParserConfig) -> Result<Bus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = Parser::with_config(config);
    for line in lines {
        parser.feed_line(line.as_ref())?;
    }
    parser.finish()
}

/// Parse DBC text from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R, config: ParserConfig) -> Result<Bus> {
    read_lines(reader, "<input>", config)
}

/// Parse a DBC file.
pub fn parse_file(path: &Path, config: ParserConfig) -> Result<Bus> {
    let label = path.display().to_string();
    let file = File::open(path).map_err(|e| DbcError::FileRead {
        path: label.clone(),
        source: e,
    })?;
    read_lines(BufReader::new(file), &label, config)
}

fn read_lines<R: BufRead>(reader: R, label: &str, config: ParserConfig) -> Result<Bus> {
    let mut parser = Parser::with_config(config);
    for line in reader.lines() {
        let line = line.map_err(|e| DbcError::FileRead {
            path: label.to_string(),
            source: e,
        })?;
        parser.feed_line(&line)?;
    }
    parser.finish()
}
