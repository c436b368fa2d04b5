use dirs::home_dir;
use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".fintrack";
const LOCK_SUFFIX: &str = ".lock";
/// Environment variable overriding the application directory.
pub const HOME_ENV: &str = "FINTRACK_HOME";

/// Returns the application-specific data directory, defaulting to `~/.fintrack`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Single-instance lock guarding `db_path`: the database path with `.lock` appended.
///
/// Relative paths are anchored at the working directory so every process sharing a database
/// agrees on one lock file.
pub fn lock_file_for(db_path: &Path) -> PathBuf {
    let absolute = if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(db_path))
            .unwrap_or_else(|_| db_path.to_path_buf())
    };
    let mut name = OsString::from(absolute.as_os_str());
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_sits_next_to_the_database() {
        let lock = lock_file_for(Path::new("/srv/ledger/finance.db"));
        assert_eq!(lock, PathBuf::from("/srv/ledger/finance.db.lock"));
    }

    #[test]
    fn relative_databases_get_an_absolute_lock() {
        let lock = lock_file_for(Path::new("finance.db"));
        assert!(lock.is_absolute());
        assert!(lock.ends_with("finance.db.lock"));
    }
}
