//! Line-oriented text formats for [`Mappings`].
//!
//! Two formats are supported:
//!
//! * **SRG** (`.srg`): tagged records, one per line.
//!
//!   ```text
//!   CL: ab Cow
//!   FD: ab/b Cow/age
//!   MD: ab/a (Lab;)V Cow/love (LCow;)V
//!   ```
//!
//!   `PK:` records are accepted and ignored.
//!
//! * **Compact SRG** (`.csrg`): untagged records told apart by column count.
//!
//!   ```text
//!   ab Cow
//!   ab b age
//!   ab a (Lab;)V love
//!   ```
//!
//! In both formats surrounding whitespace is trimmed and blank lines and `#`
//! comments are skipped. Writers emit explicit entries only: classes, then
//! fields, then methods, each in registration order.
#![forbid(unsafe_code)]

mod compact;
mod error;
mod srg;

use std::fmt;
use std::io::{self, BufRead};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use srg_mappings::{ImmutableMappings, Mappings};

pub use crate::error::{FormatError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingsFormat {
    #[default]
    #[serde(rename = "srg")]
    Srg,
    #[serde(rename = "csrg", alias = "compact-srg")]
    CompactSrg,
}

impl MappingsFormat {
    pub const ALL: [MappingsFormat; 2] = [MappingsFormat::Srg, MappingsFormat::CompactSrg];

    /// Short name, also used as the file extension.
    pub fn name(self) -> &'static str {
        match self {
            MappingsFormat::Srg => "srg",
            MappingsFormat::CompactSrg => "csrg",
        }
    }

    /// Guess the format from a file extension (`.srg` or `.csrg`).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(ext))
    }

    pub fn parse_reader(self, reader: impl BufRead) -> Result<ImmutableMappings> {
        let mut reader_state = LineReader::new(self);
        for (index, line) in reader.lines().enumerate() {
            reader_state.process_line(index + 1, &line?)?;
        }
        Ok(reader_state.finish())
    }

    pub fn parse_lines<I, S>(self, lines: I) -> Result<ImmutableMappings>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reader_state = LineReader::new(self);
        for (index, line) in lines.into_iter().enumerate() {
            reader_state.process_line(index + 1, line.as_ref())?;
        }
        Ok(reader_state.finish())
    }

    pub fn parse_str(self, text: &str) -> Result<ImmutableMappings> {
        self.parse_lines(text.lines())
    }

    /// Serialize the explicit entries of `mappings`, one record per line.
    pub fn write(self, mappings: &dyn Mappings, out: &mut dyn fmt::Write) -> fmt::Result {
        match self {
            MappingsFormat::Srg => srg::write(mappings, out),
            MappingsFormat::CompactSrg => compact::write(mappings, out),
        }
    }

    pub fn write_io(self, mappings: &dyn Mappings, mut out: impl io::Write) -> Result<()> {
        out.write_all(self.render(mappings).as_bytes())?;
        out.flush()?;
        Ok(())
    }

    pub fn to_lines(self, mappings: &dyn Mappings) -> Vec<String> {
        self.render(mappings).lines().map(str::to_owned).collect()
    }

    fn render(self, mappings: &dyn Mappings) -> String {
        let mut text = String::new();
        // Writing into a `String` can't fail.
        let _ = self.write(mappings, &mut text);
        text
    }
}

impl fmt::Display for MappingsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MappingsFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srg" => Ok(MappingsFormat::Srg),
            "csrg" | "compact-srg" => Ok(MappingsFormat::CompactSrg),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

enum LineReader {
    Srg(srg::SrgReader),
    Compact(compact::CompactReader),
}

impl LineReader {
    fn new(format: MappingsFormat) -> Self {
        match format {
            MappingsFormat::Srg => LineReader::Srg(Default::default()),
            MappingsFormat::CompactSrg => LineReader::Compact(Default::default()),
        }
    }

    fn process_line(&mut self, line_number: usize, line: &str) -> Result<()> {
        match self {
            LineReader::Srg(reader) => reader.process_line(line_number, line),
            LineReader::Compact(reader) => reader.process_line(line_number, line),
        }
    }

    fn finish(self) -> ImmutableMappings {
        match self {
            LineReader::Srg(reader) => reader.finish().freeze(),
            LineReader::Compact(reader) => reader.finish(),
        }
    }
}

/// Feed every `(original, renamed)` pair visited by `for_each` to `write`,
/// stopping at the first error.
pub(crate) fn write_entries<T: ?Sized>(
    for_each: impl FnOnce(&mut dyn FnMut(&T, &T)),
    mut write: impl FnMut(&T, &T) -> fmt::Result,
) -> fmt::Result {
    let mut result = Ok(());
    for_each(&mut |original, renamed| {
        if result.is_ok() {
            result = write(original, renamed);
        }
    });
    result
}
