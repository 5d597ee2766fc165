//! Memory reference trace files.
//!
//! A trace has one reference per line: an access letter followed by a hexadecimal virtual
//! address, for example `S 0x7ff000a8` or ` L 04222cac,4`. The letters are `I` (instruction
//! fetch, treated as a load), `L`, `S` and `M`. An optional `,size` suffix on the address is
//! ignored. Blank lines and lines starting with `#` or `=` are skipped.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use vmm::{AccessKind, VirtualAddress};

/// One reference read from a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub kind: AccessKind,
    pub address: VirtualAddress,
}

#[derive(Debug)]
pub enum TraceError {
    Io(io::Error),
    Parse { line: usize, reason: String },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(err) => write!(f, "failed to read trace: {}", err),
            TraceError::Parse { line, reason } => {
                write!(f, "trace line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Io(err) => Some(err),
            TraceError::Parse { .. } => None,
        }
    }
}

impl From<io::Error> for TraceError {
    fn from(err: io::Error) -> Self {
        TraceError::Io(err)
    }
}

/// Parses a single trace line, returning `None` for lines that carry no reference.
pub fn parse_line(line: &str) -> Result<Option<TraceRecord>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('=') {
        return Ok(None);
    }

    let mut fields = line.split_whitespace();
    let (Some(kind), Some(address)) = (fields.next(), fields.next()) else {
        return Err(format!("expected '<access> <address>', found '{}'", line));
    };
    if let Some(extra) = fields.next() {
        return Err(format!("unexpected trailing field '{}'", extra));
    }

    let kind = kind
        .parse::<AccessKind>()
        .map_err(|err| err.to_string())?;

    let address = address.split(',').next().unwrap_or(address);
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let address = usize::from_str_radix(digits, 16)
        .map_err(|err| format!("invalid address '{}': {}", address, err))?;

    Ok(Some(TraceRecord {
        kind,
        address: VirtualAddress::new(address),
    }))
}

/// Streams the references out of a trace.
pub struct TraceReader<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(err) => return Some(Err(err.into())),
            };
            self.line += 1;

            match parse_line(&text) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(reason) => {
                    return Some(Err(TraceError::Parse {
                        line: self.line,
                        reason,
                    }));
                }
            }
        }
    }
}

/// Reads a whole trace file into memory.
///
/// The trace is materialised up front so that OPT can see every future reference and so that
/// several policies can replay the same references.
pub fn load(path: &Path) -> Result<Vec<TraceRecord>, TraceError> {
    let file = File::open(path)?;
    TraceReader::new(BufReader::new(file)).collect()
}
