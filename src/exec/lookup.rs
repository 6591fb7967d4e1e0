// src/exec/lookup.rs

//! Executable resolution against `PATH`.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Resolve `command` to an absolute executable path.
///
/// A command containing a path separator is checked relative to `base_dir`.
/// Otherwise every directory on `PATH` is searched in order, relative
/// entries also taken against `base_dir`. Returns `None` when nothing
/// executable matches.
pub fn resolve_executable(command: &str, base_dir: &Path) -> Option<PathBuf> {
    resolve_in(command, base_dir, env::var_os("PATH"))
}

/// Same as [`resolve_executable`] with an explicit search path.
pub fn resolve_in(
    command: &str,
    base_dir: &Path,
    search_path: Option<OsString>,
) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }

    let candidate = Path::new(command);
    let found = if candidate.components().count() > 1 || candidate.is_absolute() {
        with_extensions(&base_dir.join(candidate))
            .into_iter()
            .find(|p| is_executable(p))
    } else {
        let search_path = search_path?;
        env::split_paths(&search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .flat_map(|dir| with_extensions(&base_dir.join(dir).join(command)))
            .find(|p| is_executable(p))
    };

    found.map(|path| std::path::absolute(&path).unwrap_or(path))
}

#[cfg(windows)]
fn with_extensions(base: &Path) -> Vec<PathBuf> {
    let mut out = vec![base.to_path_buf()];
    if base.extension().is_none() {
        let exts = env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
        for ext in exts.split(';').filter(|e| !e.is_empty()) {
            let mut name = base.as_os_str().to_owned();
            name.push(ext.to_lowercase());
            out.push(PathBuf::from(name));
        }
    }
    out
}

#[cfg(not(windows))]
fn with_extensions(base: &Path) -> Vec<PathBuf> {
    vec![base.to_path_buf()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
