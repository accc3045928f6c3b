use std::path::Path;
use std::str::FromStr;

use crate::error::Result;
use crate::graph::MolGraph;
use crate::hydrogen::remove_hs;
use crate::sdf::{parse_molfile, FileFormat};
use crate::smiles::{first_token, from_smiles, has_unbalanced_brackets};

use super::{file_records, per_record, UntilError, UntilErrorExt};

/// Molecules to 2D graphs labelled with atom types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoleculeToGraph {
    pub format: FileFormat,
}

impl MoleculeToGraph {
    pub fn new(format: FileFormat) -> Self {
        MoleculeToGraph { format }
    }

    /// Build from a format tag, `"sdf"` or `"smi"`.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(Self::new(FileFormat::from_str(tag)?))
    }

    /// Graph for one record, `None` when the record is skipped or has no
    /// heavy atoms.
    pub fn record_to_graph(&self, text: &str) -> Result<Option<MolGraph>> {
        let graph = match self.format {
            FileFormat::Sdf => {
                let molfile = parse_molfile(text)?;
                let mol = remove_hs(&molfile.mol);
                let graph = MolGraph::from_mol(&mol);
                if molfile.title.is_empty() {
                    graph
                } else {
                    graph.with_info(molfile.title)
                }
            }
            FileFormat::Smi => {
                let line = text.trim();
                let Some(token) = first_token(line) else {
                    return Ok(None);
                };
                if has_unbalanced_brackets(line) {
                    log::debug!("skipping SMILES with unbalanced brackets: {line}");
                    return Ok(None);
                }
                let mol = remove_hs(&from_smiles(token)?);
                MolGraph::from_mol(&mol).with_info(line)
            }
        };
        if graph.is_empty() {
            return Ok(None);
        }
        log::trace!(
            "graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Some(graph))
    }

    /// One result per non-empty record. Errors carry the record index.
    pub fn graphs<'a, I>(&'a self, records: I) -> impl Iterator<Item = Result<MolGraph>> + 'a
    where
        I: IntoIterator<Item = std::io::Result<String>> + 'a,
    {
        per_record(records, move |text| self.record_to_graph(text))
    }

    /// [`graphs`](Self::graphs) over the records of the file at `path`.
    pub fn results<'a>(
        &'a self,
        path: impl AsRef<Path>,
    ) -> impl Iterator<Item = Result<MolGraph>> + 'a {
        self.graphs(file_records(path.as_ref(), self.format))
    }

    /// Graphs of the file at `path`, ending at the first failure.
    pub fn transform<'a>(
        &'a self,
        path: impl AsRef<Path>,
    ) -> UntilError<impl Iterator<Item = Result<MolGraph>> + 'a> {
        self.results(path).until_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::sdf::records_from_str;

    const METHANOL: &str = "methanol
  test

  6  5  0  0  0  0  0  0  0  0999 V2000
   -0.3650    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.0350    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
   -0.7250    1.0200    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
   -0.7250   -0.5100    0.8800 H   0  0  0  0  0  0  0  0  0  0  0  0
   -0.7250   -0.5100   -0.8800 H   0  0  0  0  0  0  0  0  0  0  0  0
    1.3550    0.9000    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  1  3  1  0  0  0  0
  1  4  1  0  0  0  0
  1  5  1  0  0  0  0
  2  6  1  0  0  0  0
M  END
$$$$
";

    const EMPTY: &str = "empty
  test

  0  0  0  0  0  0  0  0  0  0999 V2000
M  END
$$$$
";

    #[test]
    fn format_tags() {
        assert_eq!(MoleculeToGraph::from_tag("smi").unwrap().format, FileFormat::Smi);
        assert!(matches!(
            MoleculeToGraph::from_tag("mol2"),
            Err(ConvertError::UnknownFormat(tag)) if tag == "mol2"
        ));
    }

    #[test]
    fn sdf_drops_hydrogens_and_empty_records() {
        let text = format!("{METHANOL}{EMPTY}");
        let converter = MoleculeToGraph::new(FileFormat::Sdf);
        let graphs: Vec<MolGraph> = converter
            .graphs(records_from_str(&text, FileFormat::Sdf))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].node_count(), 2);
        assert_eq!(graphs[0].edge_count(), 1);
        assert_eq!(graphs[0].info.as_deref(), Some("methanol"));
        let labels: Vec<_> = graphs[0].nodes().filter_map(|(_, d)| d.label.as_str()).collect();
        assert_eq!(labels, vec!["C3", "O3"]);
    }

    #[test]
    fn smiles_lines() {
        let text = "CCO ethanol\n\nCC(\nc1ccccc1\n";
        let converter = MoleculeToGraph::new(FileFormat::Smi);
        let graphs: Vec<MolGraph> = converter
            .graphs(records_from_str(text, FileFormat::Smi))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].info.as_deref(), Some("CCO ethanol"));
        assert_eq!(graphs[1].node_count(), 6);
        assert_eq!(graphs[1].edge_count(), 6);
    }

    #[test]
    fn unbalanced_title_skips_line() {
        let text = "CCO ethanol (abs\nCC ethane\n";
        let converter = MoleculeToGraph::new(FileFormat::Smi);
        let graphs: Vec<MolGraph> = converter
            .graphs(records_from_str(text, FileFormat::Smi))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].info.as_deref(), Some("CC ethane"));
    }

    #[test]
    fn bad_record_is_reported_with_index() {
        let text = "CC\nC1CC\nCCC\n";
        let converter = MoleculeToGraph::new(FileFormat::Smi);
        let results: Vec<_> = converter
            .graphs(records_from_str(text, FileFormat::Smi))
            .collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].as_ref().unwrap_err().record(), Some(1));
        assert!(results[2].is_ok());
    }

    #[test]
    fn transform_stops_at_first_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.smi");
        std::fs::write(&path, "CC\nC1CC\nCCC\n").unwrap();
        let graphs: Vec<_> = MoleculeToGraph::new(FileFormat::Smi).transform(&path).collect();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].node_count(), 2);
    }
}
