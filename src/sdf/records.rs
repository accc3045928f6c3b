//! Splitting input files into per-molecule text records.
//!
//! SDF records run up to and including a `$$$$` line; a trailing block with
//! no terminator is dropped. SMILES files yield one record per line.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Input file format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Sdf,
    Smi,
}

impl FromStr for FileFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sdf" => Ok(FileFormat::Sdf),
            "smi" => Ok(FileFormat::Smi),
            other => Err(ConvertError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileFormat::Sdf => "sdf",
            FileFormat::Smi => "smi",
        })
    }
}

/// Whether `line` terminates an SDF record.
pub fn is_terminator(line: &str) -> bool {
    line.trim() == "$$$$"
}

/// Lazy iterator over the raw text records of a file.
///
/// Lines are kept verbatim, newlines included.
pub struct RecordReader<R> {
    reader: R,
    format: FileFormat,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R, format: FileFormat) -> Self {
        RecordReader {
            reader,
            format,
            line_number: 0,
            done: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(line))
    }

    fn next_sdf_record(&mut self) -> io::Result<Option<String>> {
        let mut block = String::new();
        while let Some(line) = self.read_line()? {
            let end = is_terminator(&line);
            block.push_str(&line);
            if end {
                return Ok(Some(block));
            }
        }
        if !block.trim().is_empty() {
            log::debug!(
                "dropping unterminated SDF block at end of input ({} bytes)",
                block.len()
            );
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let record = match self.format {
            FileFormat::Sdf => self.next_sdf_record(),
            FileFormat::Smi => self.read_line(),
        };
        match record {
            Ok(Some(text)) => Some(Ok(text)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Open `path` and iterate over its records.
pub fn read_records(
    path: impl AsRef<Path>,
    format: FileFormat,
) -> io::Result<RecordReader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(RecordReader::new(BufReader::new(file), format))
}

/// Records of an in-memory string.
pub fn records_from_str(text: &str, format: FileFormat) -> RecordReader<&[u8]> {
    RecordReader::new(text.as_bytes(), format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, format: FileFormat) -> Vec<String> {
        records_from_str(text, format)
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn sdf_blocks_keep_terminator() {
        let text = "a\nb\n$$$$\nc\n$$$$\n";
        assert_eq!(collect(text, FileFormat::Sdf), vec!["a\nb\n$$$$\n", "c\n$$$$\n"]);
    }

    #[test]
    fn terminator_tolerates_whitespace() {
        let text = "a\n  $$$$  \r\nb\n$$$$";
        assert_eq!(
            collect(text, FileFormat::Sdf),
            vec!["a\n  $$$$  \r\n", "b\n$$$$"]
        );
    }

    #[test]
    fn unterminated_trailing_block_is_dropped() {
        let text = "a\n$$$$\ntrailing\nlines\n";
        assert_eq!(collect(text, FileFormat::Sdf), vec!["a\n$$$$\n"]);
        assert!(collect("no terminator\n", FileFormat::Sdf).is_empty());
    }

    #[test]
    fn terminator_must_be_whole_line() {
        let text = "$$$$x\n$$$$\n";
        assert_eq!(collect(text, FileFormat::Sdf), vec!["$$$$x\n$$$$\n"]);
    }

    #[test]
    fn smiles_lines_are_verbatim() {
        let text = "CCO ethanol\n\nc1ccccc1";
        assert_eq!(
            collect(text, FileFormat::Smi),
            vec!["CCO ethanol\n", "\n", "c1ccccc1"]
        );
    }

    #[test]
    fn line_numbers_advance() {
        let mut reader = records_from_str("a\n$$$$\nb\n$$$$\n", FileFormat::Sdf);
        reader.next();
        assert_eq!(reader.line_number(), 2);
        reader.next();
        assert_eq!(reader.line_number(), 4);
    }

    #[test]
    fn format_tags() {
        assert_eq!("sdf".parse::<FileFormat>().unwrap(), FileFormat::Sdf);
        assert_eq!("smi".parse::<FileFormat>().unwrap(), FileFormat::Smi);
        assert!(matches!(
            "mol2".parse::<FileFormat>(),
            Err(ConvertError::UnknownFormat(tag)) if tag == "mol2"
        ));
        assert_eq!(FileFormat::Smi.to_string(), "smi");
    }

    #[test]
    fn format_serde() {
        let f: FileFormat = serde_json::from_str("\"smi\"").unwrap();
        assert_eq!(f, FileFormat::Smi);
        assert_eq!(serde_json::to_string(&FileFormat::Sdf).unwrap(), "\"sdf\"");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_records(dir.path().join("absent.sdf"), FileFormat::Sdf).is_err());
    }
}
