//! Program loading: scan, parse and type check a project in one blocking batch.
//!
//! Any failure aborts the whole load; there are no partial results.

use crate::checker::Checker;
use crate::config::AnalyzerConfig;
use crate::error::Error;
use crate::oracle::TypeInfo;
use crate::parser::GoParser;
use crate::scanner::FileScanner;
use crate::syntax::Program;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// The `go.mod` module enclosing the analyzed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    /// Module path from the `module` directive
    pub path: String,
    /// Directory holding `go.mod`
    pub dir: PathBuf,
}

/// Maps package directories to import paths.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Directory being analyzed, as given
    pub root: PathBuf,
    pub module: Option<GoModule>,
    /// Import path of `root` itself when inside a module
    root_import: Option<String>,
}

impl ProjectLayout {
    /// Finds the `go.mod` in `root` or its closest ancestor.
    pub fn discover(root: &Path) -> Self {
        let absolute = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        let module = absolute.ancestors().find_map(|dir| {
            let go_mod = dir.join("go.mod");
            let content = fs::read_to_string(&go_mod).ok()?;
            match parse_module_path(&content) {
                Some(path) => Some(GoModule {
                    path,
                    dir: dir.to_path_buf(),
                }),
                None => {
                    warn!("{} has no module directive", go_mod.display());
                    None
                }
            }
        });

        let root_import = module.as_ref().map(|module| {
            let relative = absolute.strip_prefix(&module.dir).unwrap_or(Path::new(""));
            join_import(&module.path, relative)
        });

        match &module {
            Some(module) => debug!("Module {} at {}", module.path, module.dir.display()),
            None => debug!("No go.mod found above {}", absolute.display()),
        }

        Self {
            root: root.to_path_buf(),
            module,
            root_import,
        }
    }

    /// Layout whose module (if any) is rooted at `root`.
    pub fn for_module(root: PathBuf, module_path: Option<&str>) -> Self {
        let module = module_path.map(|path| GoModule {
            path: path.to_string(),
            dir: root.clone(),
        });
        let root_import = module_path.map(str::to_string);
        Self {
            root,
            module,
            root_import,
        }
    }

    /// Import path of the package in `dir`.
    ///
    /// Outside a module this is the directory relative to the root, `/`-separated.
    pub fn import_path(&self, dir: &Path) -> String {
        let relative = dir.strip_prefix(&self.root).unwrap_or(dir);
        match &self.root_import {
            Some(base) => join_import(base, relative),
            None => join_import("", relative),
        }
    }

    /// Whether `import` refers to the local package whose import path is `package_path`.
    ///
    /// Without a module, imports are matched by path suffix.
    pub fn matches_import(&self, package_path: &str, import: &str) -> bool {
        if self.module.is_some() {
            return package_path == import;
        }
        !package_path.is_empty()
            && (import == package_path
                || import
                    .strip_suffix(package_path)
                    .is_some_and(|prefix| prefix.ends_with('/')))
    }
}

fn join_import(base: &str, relative: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !base.is_empty() {
        parts.push(base.to_string());
    }
    parts.extend(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string()),
    );
    parts.join("/")
}

fn parse_module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"').trim_matches('`');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// A parsed and type checked project.
pub struct LoadedProgram {
    pub program: Program,
    pub types: TypeInfo,
    pub layout: ProjectLayout,
}

/// Scans, parses and type checks every Go file under `root`.
pub fn load(root: &Path, config: &AnalyzerConfig) -> Result<LoadedProgram> {
    info!("Scanning directory: {}", root.display());
    let scanner = FileScanner::new(root.to_path_buf(), config.skip_dirs.clone());
    let scan_result = scanner
        .scan()
        .with_context(|| format!("Failed to scan directory: {}", root.display()))?;

    info!("Found {} Go files", scan_result.go_files.len());
    if !scan_result.warnings.is_empty() {
        warn!(
            "Encountered {} warnings during scanning",
            scan_result.warnings.len()
        );
    }
    if scan_result.go_files.is_empty() {
        return Err(Error::NoSourceFiles(root.to_path_buf()).into());
    }

    info!("Parsing Go files...");
    let mut parser = GoParser::new()?;
    let files = parser
        .parse_files(&scan_result.go_files)
        .context("Failed to parse Go sources")?;

    let layout = ProjectLayout::discover(root);
    Ok(check(Program { files }, layout))
}

/// Parses in-memory sources attributed to the given paths, then type checks them.
pub fn load_sources(layout: ProjectLayout, sources: &[(PathBuf, &str)]) -> Result<LoadedProgram> {
    if sources.is_empty() {
        return Err(Error::NoSourceFiles(layout.root.clone()).into());
    }

    let mut parser = GoParser::new()?;
    let files = sources
        .iter()
        .map(|(path, content)| parser.parse_source(path, content))
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to parse Go sources")?;

    Ok(check(Program { files }, layout))
}

fn check(program: Program, layout: ProjectLayout) -> LoadedProgram {
    info!("Type checking {} files...", program.files.len());
    let types = Checker::new(&program, &layout).check();
    LoadedProgram {
        program,
        types,
        layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::TypeOracle;
    use tempfile::TempDir;

    #[test]
    fn test_parse_module_path() {
        assert_eq!(
            parse_module_path("// comment\nmodule example.com/shop\n\ngo 1.21\n").as_deref(),
            Some("example.com/shop")
        );
        assert_eq!(
            parse_module_path("module \"example.com/quoted\"\n").as_deref(),
            Some("example.com/quoted")
        );
        assert_eq!(parse_module_path("modules x\n"), None);
        assert_eq!(parse_module_path("go 1.21\n"), None);
    }

    #[test]
    fn test_import_paths_with_module() {
        let layout = ProjectLayout::for_module(PathBuf::from("/src/shop"), Some("example.com/shop"));

        assert_eq!(layout.import_path(Path::new("/src/shop")), "example.com/shop");
        assert_eq!(
            layout.import_path(Path::new("/src/shop/model/request")),
            "example.com/shop/model/request"
        );
        assert!(layout.matches_import("example.com/shop/api", "example.com/shop/api"));
        assert!(!layout.matches_import("example.com/shop/api", "other.com/shop/api"));
    }

    #[test]
    fn test_import_paths_without_module() {
        let layout = ProjectLayout::for_module(PathBuf::from("/src/legacy"), None);

        assert_eq!(layout.import_path(Path::new("/src/legacy/api")), "api");
        assert!(layout.matches_import("model/request", "github.com/acme/x/model/request"));
        assert!(layout.matches_import("api", "api"));
        assert!(!layout.matches_import("request", "github.com/acme/x/model/myrequest"));
        assert!(!layout.matches_import("", "github.com/acme"));
    }

    #[test]
    fn test_discover_module_in_ancestor() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("go.mod"), "module example.com/shop\n").unwrap();
        fs::create_dir_all(root.join("internal/api")).unwrap();

        let layout = ProjectLayout::discover(&root.join("internal"));

        assert_eq!(
            layout.module.as_ref().map(|m| m.path.as_str()),
            Some("example.com/shop")
        );
        assert_eq!(
            layout.import_path(&root.join("internal/api")),
            "example.com/shop/internal/api"
        );
    }

    #[test]
    fn test_load_project_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("go.mod"), "module example.com/shop\n").unwrap();
        fs::create_dir_all(root.join("model")).unwrap();
        fs::write(root.join("model/user.go"), "package model\n\ntype User struct{}\n").unwrap();
        fs::write(
            root.join("main.go"),
            "package main\n\nimport \"example.com/shop/model\"\n\nfunc show(u *model.User) {}\n",
        )
        .unwrap();

        let loaded = load(root, &AnalyzerConfig::default()).unwrap();

        assert_eq!(loaded.program.files.len(), 2);
        let main = loaded
            .program
            .files
            .iter()
            .find(|f| f.package == "main")
            .unwrap();
        let param = &main.functions().next().unwrap().params[0];
        assert_eq!(
            loaded.types.type_of(param.id).map(ToString::to_string).as_deref(),
            Some("*example.com/shop/model.User")
        );
    }

    #[test]
    fn test_load_empty_directory_fails() {
        let temp_dir = TempDir::new().unwrap();

        let result = load(temp_dir.path(), &AnalyzerConfig::default());

        let err = result.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoSourceFiles(_))
        ));
    }

    #[test]
    fn test_load_syntax_error_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.go"), "package bad\nfunc (\n").unwrap();

        let result = load(temp_dir.path(), &AnalyzerConfig::default());

        assert!(result.is_err());
    }
}
