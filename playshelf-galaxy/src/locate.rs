//! Locate the Galaxy client database among well-known install paths.

use std::fs::File;
use std::path::{Path, PathBuf};

/// Relative filename of the Galaxy 2.0 library database.
pub const GALAXY_DB_FILENAME: &str = "galaxy-2.0.db";

/// Fixed OS-specific locations where a Galaxy install keeps its database.
///
/// The returned directories are probed in order; a user-supplied path
/// always wins over these.
pub fn default_install_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        // Windows default install
        PathBuf::from(r"C:\ProgramData\GOG.com\Galaxy\storage"),
        // macOS default install
        PathBuf::from("/Users/Shared/GOG.com/Galaxy/Storage"),
    ];
    if let Some(data_dir) = dirs::data_dir() {
        paths.push(data_dir.join("GOG.com").join("Galaxy").join("storage"));
    }
    paths
}

/// Find the first existing, readable Galaxy database.
///
/// A directory is resolved by appending [`GALAXY_DB_FILENAME`]; a file path
/// is taken as-is. Returns `None` when nothing usable exists; callers
/// decide whether to fall back to the mock catalog.
pub fn locate_database(user_path: Option<&Path>, well_known: &[PathBuf]) -> Option<PathBuf> {
    if let Some(path) = user_path {
        if let Some(found) = probe(path) {
            return Some(found);
        }
        log::debug!("no readable Galaxy database at {}", path.display());
    }
    well_known.iter().find_map(|candidate| probe(candidate))
}

/// Check a single candidate: resolve directories, require a readable file.
fn probe(path: &Path) -> Option<PathBuf> {
    let file = if path.is_dir() {
        path.join(GALAXY_DB_FILENAME)
    } else {
        path.to_path_buf()
    };
    if file.is_file() && File::open(&file).is_ok() {
        Some(file)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_directory_to_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join(GALAXY_DB_FILENAME);
        std::fs::write(&db, b"").unwrap();

        let found = locate_database(Some(dir.path()), &[]);
        assert_eq!(found, Some(db));
    }

    #[test]
    fn accepts_direct_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("renamed.db");
        std::fs::write(&db, b"").unwrap();

        let found = locate_database(Some(&db), &[]);
        assert_eq!(found, Some(db));
    }

    #[test]
    fn user_path_wins_over_well_known() {
        let user_dir = tempfile::tempdir().unwrap();
        let known_dir = tempfile::tempdir().unwrap();
        let user_db = user_dir.path().join(GALAXY_DB_FILENAME);
        let known_db = known_dir.path().join(GALAXY_DB_FILENAME);
        std::fs::write(&user_db, b"").unwrap();
        std::fs::write(&known_db, b"").unwrap();

        let found = locate_database(Some(user_dir.path()), &[known_dir.path().to_path_buf()]);
        assert_eq!(found, Some(user_db));
    }

    #[test]
    fn falls_back_to_well_known_paths() {
        let missing = PathBuf::from("/nonexistent/galaxy");
        let known_dir = tempfile::tempdir().unwrap();
        let known_db = known_dir.path().join(GALAXY_DB_FILENAME);
        std::fs::write(&known_db, b"").unwrap();

        let found = locate_database(Some(&missing), &[known_dir.path().to_path_buf()]);
        assert_eq!(found, Some(known_db));
    }

    #[test]
    fn nothing_found_returns_none() {
        let empty_dir = tempfile::tempdir().unwrap();
        let found = locate_database(None, &[empty_dir.path().to_path_buf()]);
        assert_eq!(found, None);
    }
}
