//! Locating the runtime data directory.
//!
//! Data (the intro text and the `packages/` tree) ships next to the binary
//! or in the source checkout. The `WAYFARER_DATA` environment variable
//! overrides discovery entirely; otherwise each candidate base directory is
//! checked for a `data/` folder, nested under the crate directory or flat.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::warn;

const CRATE_DIR: &str = "wayfarer_engine";

static DATA_ROOT: LazyLock<PathBuf> =
    LazyLock::new(|| resolve_root(env::var_os("WAYFARER_DATA").map(PathBuf::from)));

/// Construct a data path relative to the resolved data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

/// The directory resource packages are loaded from.
pub fn packages_root() -> PathBuf {
    data_path("packages")
}

/// An explicit override is trusted as-is; otherwise the first existing
/// candidate wins, and a missing data directory falls back to `data/` under
/// the working directory so later errors name a sensible path.
fn resolve_root(override_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir {
        if !dir.is_dir() {
            warn!("WAYFARER_DATA points at '{}', which is not a directory", dir.display());
        }
        return dir;
    }
    for base in search_bases() {
        for candidate in [base.join(CRATE_DIR).join("data"), base.join("data")] {
            if candidate.is_dir() {
                return candidate;
            }
        }
    }
    PathBuf::from("data")
}

/// Directories worth checking: the working directory, then the executable's
/// directory and its parent (covers `target/debug` during development).
fn search_bases() -> Vec<PathBuf> {
    let mut bases = vec![PathBuf::new()];
    if let Ok(exe) = env::current_exe()
        && let Some(dir) = exe.parent() {
            bases.push(dir.to_path_buf());
            if let Some(parent) = dir.parent() {
                bases.push(parent.to_path_buf());
            }
        }
    bases
}
