//! Filesystem and path utilities shared by the Glint crates.
//!
//! This crate is intentionally small: pure path-string manipulation, read-only
//! filesystem probes, and a pair of whole-file JSON helpers. Nothing here holds
//! state across calls, so everything is safe to use from concurrent callers.

pub mod fs;
pub mod json;

pub use fs::{
    base_name, common_ancestor, common_ancestor_or, default_python_binary, directory_name,
    is_directory, is_file, resolve_abspath, resolve_binary, split_path_components, PathError,
};
pub use json::{load_json_file, save_json_file, JsonFileError};
