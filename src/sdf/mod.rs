//! SD files: record splitting, molfile parsing and writing.

pub mod error;
mod parser;
mod records;
mod writer;

pub use error::SdfError;
pub use parser::{parse_molfile, Molfile};
pub use records::{is_terminator, read_records, records_from_str, FileFormat, RecordReader};
pub use writer::{write_molfile, write_molfile_to, HEADER};
