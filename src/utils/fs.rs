//! File system utilities.

use crate::Result;
use std::path::Path;

/// File name portion of a path using either separator.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Get the file extension in lowercase, with its leading dot.
///
/// Works on Plex paths, which may use either separator.
pub fn get_extension(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) => name[idx..].to_lowercase(),
    }
}

/// Check if a path lies inside a "Plex Versions" folder.
pub fn is_in_plex_versions(path: &str) -> bool {
    path.split(['/', '\\']).any(|c| c == "Plex Versions")
}

/// Remove a file, reporting whether it was there.
///
/// A missing file is not an error.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("Season 01/Show - S01E01.mkv"), "Show - S01E01.mkv");
        assert_eq!(file_name("C:\\Movies\\Heat.mkv"), "Heat.mkv");
        assert_eq!(file_name("Heat.mkv"), "Heat.mkv");
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension("/movies/Heat.MKV"), ".mkv");
        assert_eq!(get_extension("C:\\rec\\show.ts"), ".ts");
        assert_eq!(get_extension("/movies/.hidden"), "");
        assert_eq!(get_extension("/movies/v1.0/noext"), "");
    }

    #[test]
    fn test_is_in_plex_versions() {
        assert!(is_in_plex_versions("/movies/Heat/Plex Versions/Optimized for TV/Heat.mp4"));
        assert!(is_in_plex_versions("D:\\Movies\\Plex Versions\\Heat.mp4"));
        assert!(!is_in_plex_versions("/movies/Plex Versionsx/Heat.mp4"));
    }

    #[test]
    fn test_remove_file_if_exists() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.mkv");
        std::fs::write(&path, "x").unwrap();

        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!remove_file_if_exists(&path).unwrap());
    }
}
