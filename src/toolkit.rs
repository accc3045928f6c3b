//! External 3D embedding and conformer search.
//!
//! Coordinates for SMILES input and conformer ensembles come from the
//! OpenBabel command-line tool. The [`Toolkit`] trait is the seam; tests
//! substitute their own implementation.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Banner OpenBabel writes on the program line of every molfile it emits.
pub const BANNER: &str = "OpenBabel";

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("no 'OpenBabel' banner in conformer output")]
    NoConformers,
}

/// Source of 3D structures.
pub trait Toolkit {
    /// 3D molfile for a SMILES string.
    fn embed_smiles(&self, smiles: &str) -> Result<String, ToolkitError>;

    /// Up to `n_conf` conformers of the molecule in `sdf`, one molfile each.
    fn conformers(&self, sdf: &str, n_conf: usize) -> Result<Vec<String>, ToolkitError>;
}

/// Drop every line mentioning `WARNING`.
pub fn strip_warnings(output: &str) -> String {
    output
        .split('\n')
        .filter(|line| !line.contains("WARNING"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut multi-record output at each [`BANNER`].
///
/// Text before the first banner is discarded. Each piece starts at its
/// banner, the program line, so a newline is prepended to stand in for the
/// title line.
pub fn split_conformers(output: &str) -> Result<Vec<String>, ToolkitError> {
    let starts: Vec<usize> = output.match_indices(BANNER).map(|(i, _)| i).collect();
    if starts.is_empty() {
        return Err(ToolkitError::NoConformers);
    }
    let ends = starts.iter().skip(1).copied().chain(std::iter::once(output.len()));
    Ok(starts
        .iter()
        .zip(ends)
        .map(|(&start, end)| format!("\n{}", &output[start..end]))
        .collect())
}

/// The `obabel` binary.
#[derive(Debug, Clone)]
pub struct Obabel {
    binary: PathBuf,
}

impl Default for Obabel {
    fn default() -> Self {
        Obabel::new("obabel")
    }
}

impl Obabel {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Obabel {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    fn program(&self) -> String {
        self.binary.display().to_string()
    }

    fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<String, ToolkitError> {
        let program = self.program();
        log::debug!("running {program} {}", args.join(" "));

        let spawn_err = |source: std::io::Error| ToolkitError::Spawn {
            program: program.clone(),
            source,
        };
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes()).map_err(spawn_err)?;
        }

        let output = child.wait_with_output().map_err(spawn_err)?;
        if !output.status.success() {
            return Err(ToolkitError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Toolkit for Obabel {
    fn embed_smiles(&self, smiles: &str) -> Result<String, ToolkitError> {
        let input = format!("-:{smiles}");
        let output = self.run(&[&input, "-osdf", "--gen3d"], None)?;
        Ok(strip_warnings(&output))
    }

    fn conformers(&self, sdf: &str, n_conf: usize) -> Result<Vec<String>, ToolkitError> {
        let n = n_conf.to_string();
        let output = self.run(
            &[
                "-isdf",
                "-osdf",
                "--conformer",
                "--nconf",
                &n,
                "--score",
                "rmsd",
                "--writeconformers",
            ],
            Some(sdf),
        )?;
        split_conformers(&output)
    }
}
