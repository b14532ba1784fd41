//! Configuration for the texturing orchestrator.
//!
//! The configuration is an immutable value handed to
//! [`JobOrchestrator::new`](crate::orchestrator::JobOrchestrator::new). It can
//! be built in code, deserialized from JSON, or overlaid from `TEXTURING_*`
//! environment variables.

use crate::errors::{TexturingError, TexturingResult};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix used by [`TexturingConfig::from_env`].
///
/// Variables are the upper-case field names behind it, such as
/// `TEXTURING_TIMEOUT_SECONDS`.
pub const ENV_PREFIX: &str = "TEXTURING";

/// Configuration for render jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TexturingConfig {
    /// Path to the render tool executable.
    #[serde(default = "default_render_executable")]
    pub render_executable: PathBuf,
    /// Path to the script the render tool runs.
    #[serde(default = "default_render_script")]
    pub render_script: PathBuf,
    /// Root under which per-job workspaces are created.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Root under which per-job output directories are created.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Public base URL the output root is served from.
    #[serde(default = "default_output_base_url")]
    pub output_base_url: String,
    /// Hard execution timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Working directory for the render tool. Inherited when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Maximum number of render tool processes running at once.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    /// How long finished jobs stay in the registry, in seconds.
    #[serde(default = "default_registry_ttl")]
    pub registry_ttl_seconds: f64,
}

fn json_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Json).required(true)
}

/// Converts float seconds without panicking on values `Duration` cannot hold.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(if value > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}

fn default_render_executable() -> PathBuf {
    PathBuf::from("blender")
}

fn default_render_script() -> PathBuf {
    PathBuf::from("scripts/texturing.py")
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("texturing").join("work")
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("texturing").join("output")
}

fn default_output_base_url() -> String {
    "http://localhost:8080/models".to_string()
}

fn default_timeout() -> f64 {
    600.0 // 10 minutes
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_registry_ttl() -> f64 {
    3600.0
}

impl Default for TexturingConfig {
    fn default() -> Self {
        Self {
            render_executable: default_render_executable(),
            render_script: default_render_script(),
            temp_dir: default_temp_dir(),
            output_dir: default_output_dir(),
            output_base_url: default_output_base_url(),
            timeout_seconds: default_timeout(),
            working_dir: None,
            max_concurrent_jobs: default_max_concurrent_jobs(),
            registry_ttl_seconds: default_registry_ttl(),
        }
    }
}

impl TexturingConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a JSON string. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> TexturingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> TexturingResult<Self> {
        Self::build(Config::builder().add_source(json_file(path.as_ref())))
    }

    /// Reads `TEXTURING_*` environment variables over the defaults.
    pub fn from_env() -> TexturingResult<Self> {
        Self::load(None)
    }

    /// Layers defaults, then an optional JSON file, then the environment.
    pub fn load(file: Option<&Path>) -> TexturingResult<Self> {
        Self::from_sources(file, Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(file: Option<&Path>, env: Environment) -> TexturingResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(json_file(path));
        }
        Self::build(builder.add_source(env))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> TexturingResult<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Sets the render executable.
    #[must_use]
    pub fn with_render_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.render_executable = path.into();
        self
    }

    /// Sets the render script.
    #[must_use]
    pub fn with_render_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.render_script = path.into();
        self
    }

    /// Sets the workspace root.
    #[must_use]
    pub fn with_temp_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_dir = path.into();
        self
    }

    /// Sets the output root.
    #[must_use]
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Sets the public output base URL.
    #[must_use]
    pub fn with_output_base_url(mut self, url: impl Into<String>) -> Self {
        self.output_base_url = url.into();
        self
    }

    /// Sets the execution timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the render tool working directory.
    #[must_use]
    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    /// Sets the concurrency limit.
    #[must_use]
    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max;
        self
    }

    /// Sets the registry retention.
    #[must_use]
    pub fn with_registry_ttl(mut self, seconds: f64) -> Self {
        self.registry_ttl_seconds = seconds;
        self
    }

    /// Gets the execution timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        seconds(self.timeout_seconds)
    }

    /// Gets the registry retention as a Duration.
    #[must_use]
    pub fn registry_ttl(&self) -> Duration {
        seconds(self.registry_ttl_seconds)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TexturingResult<()> {
        if self.render_executable.as_os_str().is_empty() {
            return Err(TexturingError::configuration("render_executable must not be empty"));
        }
        if self.render_script.as_os_str().is_empty() {
            return Err(TexturingError::configuration("render_script must not be empty"));
        }
        if self.output_base_url.trim().is_empty() {
            return Err(TexturingError::configuration("output_base_url must not be empty"));
        }
        if self.timeout_seconds <= 0.0 || Duration::try_from_secs_f64(self.timeout_seconds).is_err() {
            return Err(TexturingError::configuration(format!(
                "timeout_seconds must be a positive number of seconds, got {}",
                self.timeout_seconds
            )));
        }
        if self.max_concurrent_jobs == 0 {
            return Err(TexturingError::configuration("max_concurrent_jobs must be at least 1"));
        }
        if Duration::try_from_secs_f64(self.registry_ttl_seconds).is_err() {
            return Err(TexturingError::configuration(
                "registry_ttl_seconds must be a non-negative number",
            ));
        }
        Ok(())
    }
}
