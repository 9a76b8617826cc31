//! Sources of simulated alignments.

use crate::config::Config;
use crate::errors::SimError;
use crate::xmfa::{read_xmfa_path, GeneGroup};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Produces the gene alignments of one simulation replicate.
///
/// Implementations are shared by all pipeline workers, so they must be
/// `Sync`. Every call is an independent replicate.
pub trait AlignmentSource: Sync {
    fn alignments(&self, config: &Config) -> Result<Vec<GeneGroup>, SimError>;
}

impl<F> AlignmentSource for F
where
    F: Fn(&Config) -> Result<Vec<GeneGroup>, SimError> + Sync,
{
    fn alignments(&self, config: &Config) -> Result<Vec<GeneGroup>, SimError> {
        self(config)
    }
}

/// Runs the external `simmlst` simulator and reads its XMFA output.
///
/// The output goes to a temporary file that is removed once it has been
/// parsed, whether or not the run succeeded.
#[derive(Debug, Clone)]
pub struct SimMlst {
    program: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl Default for SimMlst {
    fn default() -> Self {
        Self::new("simmlst")
    }
}

impl SimMlst {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            temp_dir: None,
        }
    }

    /// Put temporary output files in `dir` instead of the system default.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, config: &Config, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(config.simulator_args()).arg("-o").arg(output);
        cmd
    }
}

impl AlignmentSource for SimMlst {
    fn alignments(&self, config: &Config) -> Result<Vec<GeneGroup>, SimError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("simmlst").suffix(".xmfa");
        let tmp = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        let output = self
            .command(config, tmp.path())
            .output()
            .map_err(|source| SimError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(SimError::Simulator {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let groups = read_xmfa_path(tmp.path())?;
        debug!(
            config = %config,
            groups = groups.len(),
            "read simulated alignment"
        );
        Ok(groups)
    }
}
