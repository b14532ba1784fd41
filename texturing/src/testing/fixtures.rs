//! Fixtures shared by the crate's tests.

use crate::config::TexturingConfig;
use crate::repository::{InMemoryRepository, TextureBytes};
use crate::workspace::JobInputs;
use std::path::Path;

/// Ship id present in [`seeded_repository`].
pub const KNOWN_SHIP_ID: i64 = 1;

/// Date id present in [`seeded_repository`].
pub const KNOWN_DATE_ID: i64 = 2;

/// Base URL used by [`test_config`].
pub const TEST_BASE_URL: &str = "http://models.test/ships";

/// Returns a configuration rooted under `root`.
#[must_use]
pub fn test_config(root: &Path) -> TexturingConfig {
    TexturingConfig::new()
        .with_temp_dir(root.join("work"))
        .with_output_dir(root.join("output"))
        .with_output_base_url(TEST_BASE_URL)
        .with_timeout(5.0)
}

/// Returns small, distinguishable input blobs.
#[must_use]
pub fn sample_inputs(tag: &str) -> JobInputs {
    JobInputs::from_lookup(
        format!("ply {tag}").into_bytes(),
        TextureBytes::new(format!("top {tag}").into_bytes(), format!("side {tag}").into_bytes()),
    )
}

/// Returns a repository holding [`KNOWN_SHIP_ID`] and [`KNOWN_DATE_ID`].
#[must_use]
pub fn seeded_repository() -> InMemoryRepository {
    InMemoryRepository::new()
        .with_model(KNOWN_SHIP_ID, b"ply ship".to_vec())
        .with_textures(KNOWN_DATE_ID, b"top date".to_vec(), b"side date".to_vec())
}

/// Writes an executable shell script and returns its path.
///
/// The file is fully written and closed before its mode changes, so it can
/// be exec'd straight away.
///
/// # Panics
///
/// Panics if the script cannot be written.
#[cfg(unix)]
#[must_use]
pub fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap_or_else(|e| panic!("write {name}: {e}"));
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .unwrap_or_else(|e| panic!("chmod {name}: {e}"));
    path
}
