//! The render tool's positional command-line contract.

use crate::config::TexturingConfig;
use crate::core::Job;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// A fully resolved render tool invocation.
///
/// ```text
/// <executable> --background --python <script> -- \
///     <model> <top_texture> <side_texture> <output> <log>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    /// The render tool executable.
    pub executable: PathBuf,
    /// The script passed to `--python`.
    pub script: PathBuf,
    /// Model geometry input.
    pub model_path: PathBuf,
    /// Top-surface texture input.
    pub top_texture_path: PathBuf,
    /// Side-surface texture input.
    pub side_texture_path: PathBuf,
    /// Output artifact.
    pub output_path: PathBuf,
    /// Merged stdout/stderr destination.
    pub log_path: PathBuf,
    /// Working directory, inherited when `None`.
    pub working_dir: Option<PathBuf>,
}

impl RenderCommand {
    /// Builds the command for a prepared job.
    #[must_use]
    pub fn for_job(config: &TexturingConfig, job: &Job) -> Self {
        Self {
            executable: config.render_executable.clone(),
            script: config.render_script.clone(),
            model_path: job.model_path.clone(),
            top_texture_path: job.top_texture_path.clone(),
            side_texture_path: job.side_texture_path.clone(),
            output_path: job.output_path.clone(),
            log_path: job.log_path.clone(),
            working_dir: config.working_dir.clone(),
        }
    }

    /// Returns the argument vector, excluding the executable.
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        vec![
            OsString::from("--background"),
            OsString::from("--python"),
            self.script.clone().into_os_string(),
            OsString::from("--"),
            self.model_path.clone().into_os_string(),
            self.top_texture_path.clone().into_os_string(),
            self.side_texture_path.clone().into_os_string(),
            self.output_path.clone().into_os_string(),
            self.log_path.clone().into_os_string(),
        ]
    }
}

impl fmt::Display for RenderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable.display())?;
        for arg in self.args() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
