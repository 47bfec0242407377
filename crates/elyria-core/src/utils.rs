//! Utility helpers: path resolution and timestamp formatting.

use std::path::PathBuf;

/// Get the Elyria data directory (e.g. `~/.elyria/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".elyria")
}

/// Current local time as `YYYY-MM-DDTHH:MM:SS.ffffff`.
pub fn local_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Default image filename for a render started now.
pub fn fractal_filename() -> String {
    chrono::Local::now()
        .format("fractal_%Y%m%d_%H%M%S.png")
        .to_string()
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
