use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for traversing Go project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all non-test Go
/// source files. It skips hidden directories (those starting with `.`), the configured skip
/// directories (`vendor` and `testdata` by default) and `_test.go` files.
///
/// # Example
///
/// ```no_run
/// use gin_swag_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"), vec!["vendor".to_string()]);
/// let result = scanner.scan().unwrap();
/// println!("Found {} Go files", result.go_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    skip_dirs: Vec<String>,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered Go files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Paths of all discovered `.go` files, in directory-walk order
    pub go_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan for Go files
    /// * `skip_dirs` - Directory names that are never descended into
    pub fn new(root_path: PathBuf, skip_dirs: Vec<String>) -> Self {
        Self {
            root_path,
            skip_dirs,
        }
    }

    /// Scans the directory tree and collects all `.go` files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues. Entries are visited sorted by file name so the
    /// result is stable across platforms.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut go_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path || !e.file_type().is_dir() {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_skipped = self.skip_dirs.iter().any(|dir| *dir == file_name);

                !is_hidden && !is_skipped
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let file_name = entry.file_name().to_string_lossy();

                    if entry.file_type().is_file()
                        && file_name.ends_with(".go")
                        && !file_name.ends_with("_test.go")
                    {
                        go_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} Go files",
            self.root_path.display(),
            go_files.len()
        );

        Ok(ScanResult { go_files, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_skips() -> Vec<String> {
        vec!["vendor".to_string(), "testdata".to_string()]
    }

    fn names(result: &ScanResult) -> Vec<String> {
        result
            .go_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_normal_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("main.go"), "package main").unwrap();
        fs::write(root.join("router.go"), "package main").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();
        fs::write(root.join("go.mod"), "module example.com/app").unwrap();

        let scanner = FileScanner::new(root.to_path_buf(), default_skips());
        let result = scanner.scan().unwrap();

        assert_eq!(names(&result), vec!["main.go", "router.go"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let scanner = FileScanner::new(temp_dir.path().to_path_buf(), default_skips());
        let result = scanner.scan().unwrap();

        assert!(result.go_files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("api/account")).unwrap();
        fs::create_dir_all(root.join("model/request")).unwrap();
        fs::write(root.join("main.go"), "package main").unwrap();
        fs::write(root.join("api/account/account.go"), "package account").unwrap();
        fs::write(root.join("api/account/login.go"), "package account").unwrap();
        fs::write(root.join("model/request/account.go"), "package request").unwrap();

        let scanner = FileScanner::new(root.to_path_buf(), default_skips());
        let result = scanner.scan().unwrap();

        assert_eq!(result.go_files.len(), 4);
        assert_eq!(
            result.go_files[0],
            root.join("api/account/account.go")
        );
    }

    #[test]
    fn test_scan_skips_configured_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("vendor/github.com/gin-gonic/gin")).unwrap();
        fs::write(root.join("vendor/github.com/gin-gonic/gin/gin.go"), "package gin").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/hooks.go"), "package hooks").unwrap();
        fs::create_dir(root.join("testdata")).unwrap();
        fs::write(root.join("testdata/fixture.go"), "package fixture").unwrap();
        fs::write(root.join("main.go"), "package main").unwrap();

        let scanner = FileScanner::new(root.to_path_buf(), default_skips());
        let result = scanner.scan().unwrap();

        assert_eq!(names(&result), vec!["main.go"]);
    }

    #[test]
    fn test_scan_skips_test_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("handler.go"), "package api").unwrap();
        fs::write(root.join("handler_test.go"), "package api").unwrap();

        let scanner = FileScanner::new(root.to_path_buf(), default_skips());
        let result = scanner.scan().unwrap();

        assert_eq!(names(&result), vec!["handler.go"]);
    }
}
