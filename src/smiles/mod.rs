//! SMILES reading.
//!
//! Covers the subset found in screening libraries: organic-subset and
//! bracket atoms, branches, ring closures and dot-separated fragments.
//! Stereo annotations are accepted and dropped.

pub mod error;
mod parser;
mod scanner;

use crate::atom::Atom;
use crate::bond::{Bond, SmilesBond};
use crate::kekulize;
use crate::mol::Mol;
pub use error::SmilesError;

/// Parse a SMILES string without resolving aromatic bonds.
pub fn parse_smiles(s: &str) -> Result<Mol<Atom, SmilesBond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = scanner::tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    parser::build_mol(&tokens)
}

/// Parse and kekulize a SMILES string.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mol = parse_smiles(s)?;
    Ok(kekulize::kekulize(mol)?)
}

/// Whether the `(`/`)` or `[`/`]` counts of `smi` differ.
///
/// The converters run this on the whole trimmed line, title included, and
/// skip lines that fail without parsing them.
pub fn has_unbalanced_brackets(smi: &str) -> bool {
    let count = |c: char| smi.chars().filter(|&x| x == c).count();
    count('(') != count(')') || count('[') != count(']')
}

/// The part of a SMILES line that is parsed: its first whitespace-separated
/// token. Anything after it is a title.
pub fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}
