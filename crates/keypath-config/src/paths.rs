//! Platform-specific paths for user graph files.
//!
//! # Directory Structure
//!
//! - **User graphs**: `~/.config/keypath/graphs/` (Linux), `~/Library/Application Support/keypath/graphs/` (macOS), `%APPDATA%\keypath\graphs\` (Windows)
//! - **User config**: the parent of the graphs directory
//!
//! # Example
//!
//! ```rust,no_run
//! use keypath_config::paths;
//!
//! if let Some(path) = paths::find_graph("my_graph") {
//!     println!("Found graph at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "keypath";

/// Subdirectory name for graph files.
const GRAPHS_SUBDIR: &str = "graphs";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific graphs directory.
pub fn user_graphs_dir() -> PathBuf {
    user_config_dir().join(GRAPHS_SUBDIR)
}

/// Find a graph file by path or name.
///
/// An existing file path wins; otherwise `name` (with or without `.toml`) is
/// looked up in the user graphs directory.
pub fn find_graph(name: &str) -> Option<PathBuf> {
    find_graph_in(name, &user_graphs_dir())
}

/// [`find_graph`] against an explicit directory.
pub fn find_graph_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Ensure the user graphs directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_graphs_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_graphs_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// List graph files in the user graphs directory, sorted by path.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_graphs() -> Vec<PathBuf> {
    list_graphs_in_dir(&user_graphs_dir())
}

/// List `.toml` files in a directory, sorted by path.
pub fn list_graphs_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut graphs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    graphs.sort();
    graphs
}

/// Get the graph name from a file path (the file stem).
///
/// ```rust
/// use keypath_config::paths::graph_name_from_path;
/// use std::path::Path;
///
/// let name = graph_name_from_path(Path::new("/path/to/escape_key.toml"));
/// assert_eq!(name, Some("escape_key".to_string()));
/// ```
pub fn graph_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
