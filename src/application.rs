use itertools::Itertools;
use log::debug;
use std::env;
use std::path::{Path, PathBuf};

/// An application bundle on disk, addressed by its `.app` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    path: PathBuf,
}

impl Application {
    pub fn new(path: PathBuf) -> Self {
        Application { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bundle name without the `.app` suffix, e.g. `Safari` for
    /// `/Applications/Safari.app`.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Locate applications matching `name` in the standard search
    /// directories.
    ///
    /// A name containing a path separator is treated as a literal path
    /// (resolved against the working directory when relative) and yields
    /// at most one match. Anything else is probed as `<name>` and
    /// `<name>.app` under each search directory, in directory order,
    /// keeping every hit.
    pub fn find(name: &str) -> Vec<Application> {
        Self::find_in(name, &search_directories())
    }

    fn find_in(name: &str, directories: &[PathBuf]) -> Vec<Application> {
        if name.is_empty() {
            return Vec::new();
        }

        if name.contains('/') {
            let path = PathBuf::from(name);
            let path = if path.is_absolute() {
                path
            } else {
                match env::current_dir() {
                    Ok(cwd) => cwd.join(path),
                    Err(err) => {
                        debug!("Cannot resolve working directory: {err}");
                        return Vec::new();
                    }
                }
            };
            if path.exists() {
                return vec![Application::new(path)];
            }
            return Vec::new();
        }

        debug!(
            "Probing for '{name}' in {}",
            directories.iter().map(|d| d.display()).join(", ")
        );
        let mut found = Vec::new();
        for directory in directories {
            for candidate in [directory.join(name), directory.join(format!("{name}.app"))] {
                if candidate.exists() {
                    debug!("Found application at {}", candidate.display());
                    found.push(Application::new(candidate));
                }
            }
        }
        found
    }
}

/// Directories probed by [`Application::find`], in priority order.
fn search_directories() -> Vec<PathBuf> {
    let mut directories = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        directories.push(cwd);
    }
    directories.push(PathBuf::from("/System/Applications"));
    directories.push(PathBuf::from("/Applications"));
    directories
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    struct CwdGuard {
        original: PathBuf,
    }

    impl CwdGuard {
        fn change_to(path: &Path) -> Self {
            let original = env::current_dir().unwrap();
            env::set_current_dir(path).unwrap();
            CwdGuard { original }
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.original);
        }
    }

    #[test]
    fn test_name_strips_app_suffix() {
        let app = Application::new(PathBuf::from("/Applications/Safari.app"));
        assert_eq!(app.name(), "Safari");
    }

    #[test]
    fn test_name_without_suffix_is_unchanged() {
        let app = Application::new(PathBuf::from("/Applications/Safari"));
        assert_eq!(app.name(), "Safari");
    }

    #[test]
    fn test_empty_name_finds_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let found = Application::find_in("", &[temp_dir.path().to_path_buf()]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_find_probes_name_and_app_suffix() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("Demo.app")).unwrap();

        let found = Application::find_in("Demo", &[temp_dir.path().to_path_buf()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "Demo");
        assert_eq!(found[0].path(), temp_dir.path().join("Demo.app"));
    }

    #[test]
    fn test_find_keeps_duplicates_in_directory_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::create_dir(first.path().join("Demo.app")).unwrap();
        fs::create_dir(second.path().join("Demo.app")).unwrap();

        let found = Application::find_in(
            "Demo",
            &[first.path().to_path_buf(), second.path().to_path_buf()],
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].path(), first.path().join("Demo.app"));
        assert_eq!(found[1].path(), second.path().join("Demo.app"));
    }

    #[test]
    fn test_find_missing_name_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let found = Application::find_in("NoSuchApp", &[temp_dir.path().to_path_buf()]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_literal_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let bundle = temp_dir.path().join("Demo.app");
        fs::create_dir(&bundle).unwrap();

        let found = Application::find_in(bundle.to_str().unwrap(), &[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path(), bundle);
        assert_eq!(found[0].name(), "Demo");
    }

    #[test]
    fn test_literal_path_that_does_not_exist() {
        let found = Application::find_in("/no/such/bundle.app", &[]);
        assert!(found.is_empty());
    }

    #[test]
    #[serial]
    fn test_literal_relative_path_resolves_against_cwd() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("nested/Demo.app")).unwrap();
        let _guard = CwdGuard::change_to(temp_dir.path());

        let found = Application::find_in("nested/Demo.app", &[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "Demo");
        assert!(found[0].path().is_absolute());
    }
}
