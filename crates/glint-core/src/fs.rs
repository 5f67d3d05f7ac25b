//! Path-string manipulation and binary discovery.
//!
//! The helpers here operate on path *strings* because completion backends
//! report paths as text, and because the host needs to split on whichever
//! separator conventions the platform recognizes, not just the primary one.

use std::env;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use thiserror::Error;

#[cfg(windows)]
const PRIMARY_SEPARATOR: char = '\\';
#[cfg(windows)]
const SECONDARY_SEPARATOR: Option<char> = Some('/');

#[cfg(not(windows))]
const PRIMARY_SEPARATOR: char = '/';
#[cfg(not(windows))]
const SECONDARY_SEPARATOR: Option<char> = None;

/// Executable suffixes probed on Windows, in priority order.
const WINDOWS_EXE_SUFFIXES: &[&str] = &[".exe", ".cmd", ".bat"];

/// Errors from path computations that reject their input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("no paths were supplied")]
    Empty,

    #[error("paths do not have a common ancestor")]
    NoCommonAncestor,
}

/// Returns true if `path` refers to an existing directory.
///
/// Nonexistent paths are not an error, just `false`.
pub fn is_directory(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_dir()
}

/// Returns true if `path` refers to an existing plain file.
///
/// Nonexistent paths are not an error, just `false`.
pub fn is_file(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

fn is_separator(c: char) -> bool {
    c == PRIMARY_SEPARATOR || SECONDARY_SEPARATOR == Some(c)
}

/// Split `path` at its last separator into `(head, tail)`.
///
/// The head keeps a root separator run but loses any other trailing
/// separators, matching conventional path-splitting semantics.
fn split_last(path: &str) -> (&str, &str) {
    match path.rfind(is_separator) {
        Some(idx) => {
            let head = &path[..=idx];
            let trimmed = head.trim_end_matches(is_separator);
            let head = if trimmed.is_empty() { head } else { trimmed };
            (head, &path[idx + 1..])
        }
        None => ("", path),
    }
}

/// Returns the directory name for the file at `path`. If `path` itself refers
/// to a directory, the parent directory is returned.
pub fn directory_name(path: &str) -> &str {
    let (head, tail) = split_last(path);
    if tail.is_empty() && head != path {
        // stripped a trailing directory separator, so redo it
        let (head, _) = split_last(head);
        return head;
    }
    head
}

/// Returns the base name for the file at `path`. If `path` refers to a
/// directory, the directory name is returned. A mount point has no base name.
pub fn base_name(path: &str) -> Option<&str> {
    let (head, tail) = split_last(path);
    if !tail.is_empty() {
        return Some(tail);
    }
    if head == path {
        return None;
    }
    // stripped a trailing directory separator, so redo it
    let (_, tail) = split_last(head);
    if tail.is_empty() {
        None
    } else {
        Some(tail)
    }
}

/// Splits `path` into its components, starting with directory names and
/// leading up to the base name.
///
/// e.g. `/usr/lib` -> `["", "usr", "lib"]` and `C:\Users` -> `["C:", "Users"]`.
pub fn split_path_components(path: &str) -> Vec<String> {
    split_components_with(path, PRIMARY_SEPARATOR, SECONDARY_SEPARATOR)
}

fn split_components_with(path: &str, primary: char, secondary: Option<char>) -> Vec<String> {
    let Some(secondary) = secondary else {
        // easy case, only one directory separator, so split on it
        return path.split(primary).map(str::to_string).collect();
    };

    // The file system permits both separators, e.g.
    // `C:\Program Files/Sublime Text 3`. Either may appear at any position,
    // so scan left to right and split at whichever occurs first.
    let mut components = Vec::new();
    let mut rest = path;
    loop {
        match rest.find(|c: char| c == primary || c == secondary) {
            Some(idx) => {
                components.push(rest[..idx].to_string());
                rest = &rest[idx + 1..];
            }
            None => {
                components.push(rest.to_string());
                return components;
            }
        }
    }
}

/// Computes the deepest shared parent of `paths`.
///
/// A single path is returned verbatim. Zero paths are rejected with
/// [`PathError::Empty`]. When the paths agree on nothing — including absolute
/// paths that share only the empty component before the root separator — the
/// result is [`PathError::NoCommonAncestor`]; callers with a sensible default
/// should use [`common_ancestor_or`] instead of propagating that.
pub fn common_ancestor<S: AsRef<str>>(paths: &[S]) -> Result<String, PathError> {
    if paths.is_empty() {
        return Err(PathError::Empty);
    }
    if let [only] = paths {
        return Ok(only.as_ref().to_string());
    }

    let components: Vec<Vec<String>> = paths
        .iter()
        .map(|path| split_path_components(path.as_ref()))
        .collect();
    let depth = components.iter().map(Vec::len).min().unwrap_or(0);

    let mut shared: Vec<&str> = Vec::new();
    'walk: for index in 0..depth {
        let candidate = components[0][index].as_str();
        for path in &components[1..] {
            if path[index] != candidate {
                break 'walk;
            }
        }
        shared.push(candidate);
    }

    if shared.iter().all(|component| component.is_empty()) {
        return Err(PathError::NoCommonAncestor);
    }

    Ok(shared.join(MAIN_SEPARATOR_STR))
}

/// [`common_ancestor`], falling back to `default` when the paths are rejected.
pub fn common_ancestor_or<S: AsRef<str>>(paths: &[S], default: impl Into<String>) -> String {
    match common_ancestor(paths) {
        Ok(ancestor) => ancestor,
        Err(err) => {
            tracing::debug!(error = %err, "cannot compute common ancestor, using default");
            default.into()
        }
    }
}

/// Resolves the binary `name` to a path, probing candidate directories in
/// order until one contains it.
///
/// 1. An absolute `name` is returned as-is, unverified.
/// 2. `working_dir` is probed first (default: the process current directory,
///    as `.`).
/// 3. Each directory in `search_dirs` is probed next (default: the entries of
///    the `PATH` environment variable).
///
/// On Windows every bare candidate is immediately followed by its `.exe`,
/// `.cmd`, and `.bat` variants before the next directory is tried. Returns
/// `None` when every candidate is exhausted.
pub fn resolve_binary(
    name: &str,
    working_dir: Option<&Path>,
    search_dirs: Option<&[PathBuf]>,
) -> Option<PathBuf> {
    if Path::new(name).is_absolute() {
        return Some(PathBuf::from(name));
    }

    let search_dirs = match search_dirs {
        Some(dirs) => dirs.to_vec(),
        None => path_env_dirs(),
    };
    let working_dir = working_dir.unwrap_or_else(|| Path::new("."));
    let suffixes: &[&str] = if cfg!(windows) { WINDOWS_EXE_SUFFIXES } else { &[] };

    resolve_binary_in(name, working_dir, &search_dirs, suffixes)
}

fn resolve_binary_in(
    name: &str,
    working_dir: &Path,
    search_dirs: &[PathBuf],
    suffixes: &[&str],
) -> Option<PathBuf> {
    let dirs = std::iter::once(working_dir).chain(search_dirs.iter().map(PathBuf::as_path));
    for dir in dirs {
        let candidate = dir.join(name);
        if candidate.is_file() {
            tracing::debug!(name, path = %candidate.display(), "resolved binary");
            return Some(candidate);
        }
        for suffix in suffixes {
            let candidate = dir.join(format!("{name}{suffix}"));
            if candidate.is_file() {
                tracing::debug!(name, path = %candidate.display(), "resolved binary");
                return Some(candidate);
            }
        }
    }

    tracing::debug!(name, "binary not found in any candidate directory");
    None
}

fn path_env_dirs() -> Vec<PathBuf> {
    match env::var_os("PATH") {
        Some(raw) => env::split_paths(&raw).collect(),
        None => {
            tracing::warn!(
                "cannot read PATH environment variable, might not be able to \
                 resolve binary paths correctly"
            );
            Vec::new()
        }
    }
}

/// Returns a path to the python executable, preferring `pythonw` on Windows.
///
/// Falls back to the bare command name when nothing resolves, so callers
/// always have something invokable.
pub fn default_python_binary() -> PathBuf {
    if cfg!(windows) {
        if let Some(path) = resolve_binary("pythonw", None, None) {
            return path;
        }
    }

    if let Some(path) = resolve_binary("python", None, None) {
        return path;
    }

    // best effort:
    PathBuf::from("python")
}

/// Resolves `path` to an absolute path. Already-absolute paths are returned
/// as-is; relative ones are joined onto `start` (default: the process current
/// directory).
pub fn resolve_abspath(path: &str, start: Option<&Path>) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let start = match start {
        Some(start) => start.to_path_buf(),
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    start.join(path)
}
